pub mod audio;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod speech;

pub use audio::{
    ActiveRecording, AudioArtifact, AudioChunk, CaptureSource, Recorder, ScriptedSource,
};
pub use config::Config;
pub use error::{Result, SonharioError};
pub use providers::{InterpretationClient, Interpreter, Transcriber, TranscriptionClient};
pub use session::{Gender, SessionController, UserProfile, View};
pub use speech::{clean_for_speech, CommandSynthesizer, NullSynthesizer, SpeechSynthesizer};
