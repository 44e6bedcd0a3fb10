pub mod interpretation;
pub mod transcription;

pub use interpretation::InterpretationClient;
pub use transcription::TranscriptionClient;

use crate::audio::AudioArtifact;
use crate::error::{Result, SonharioError};
use crate::session::UserProfile;

/// Speech-to-text provider seam. One attempt per invocation; no retry.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String>;
}

/// Interpretation provider seam: persona parameters + dream text in,
/// prose out.
#[async_trait::async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(&self, profile: &UserProfile, dream_text: &str) -> Result<String>;
}

/// Build a provider error from a non-success response, surfacing the
/// provider's structured `error.message` when the body carries one rather
/// than a generic string.
pub(crate) fn provider_error(status: u16, body: &str) -> SonharioError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string());

    SonharioError::Provider {
        status: Some(status),
        message,
    }
}
