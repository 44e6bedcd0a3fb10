pub mod capture;
pub mod encode;

#[cfg(feature = "mic")]
pub mod mic;

pub use capture::{ActiveRecording, AudioChunk, CaptureSource, Recorder, ScriptedSource};
pub use encode::{AudioArtifact, MIME_TYPE};

#[cfg(feature = "mic")]
pub use mic::MicSource;
