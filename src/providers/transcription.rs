use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use super::{provider_error, Transcriber};
use crate::audio::AudioArtifact;
use crate::config::ProviderConfig;
use crate::error::{Result, SonharioError};

/// Fixed filename for the multipart upload; the provider contract keys the
/// container format off it.
const UPLOAD_FILENAME: &str = "dream.wav";

/// Hosted speech-to-text client (Whisper-style `audio/transcriptions`
/// endpoint).
pub struct TranscriptionClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl TranscriptionClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for TranscriptionClient {
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.config.base_url);

        let file = Part::bytes(artifact.wav.clone())
            .file_name(UPLOAD_FILENAME)
            .mime_str(artifact.mime_type)
            .map_err(SonharioError::transport)?;

        let form = Form::new()
            .part("file", file)
            .text("model", self.config.transcription_model.clone())
            .text("language", self.config.language.clone());

        debug!(
            "Uploading {} bytes of audio for transcription (model={})",
            artifact.wav.len(),
            self.config.transcription_model
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(SonharioError::transport)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(SonharioError::transport)?;

        let text = parse_transcription(status, &body)?;
        info!("Transcription received: {} characters", text.chars().count());
        Ok(text)
    }
}

/// Success is the provider's `text` field, verbatim. A non-success status
/// surfaces the provider's own error message; a 2xx body without `text` is
/// a malformed response.
pub(crate) fn parse_transcription(status: u16, body: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(provider_error(status, body));
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SonharioError::MalformedResponse(format!("invalid JSON: {e}")))?;

    match value.get("text").and_then(|t| t.as_str()) {
        Some(text) => Ok(text.to_string()),
        None => Err(SonharioError::MalformedResponse(
            "missing `text` field".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_returns_text_verbatim() {
        let text = parse_transcription(200, r#"{"text":"Sonhei que voava"}"#).unwrap();
        assert_eq!(text, "Sonhei que voava");
    }

    #[test]
    fn text_is_not_trimmed_or_altered() {
        let text = parse_transcription(200, r#"{"text":"  dois espaços  "}"#).unwrap();
        assert_eq!(text, "  dois espaços  ");
    }

    #[test]
    fn provider_failure_carries_status_and_message() {
        let err =
            parse_transcription(413, r#"{"error":{"message":"file too large"}}"#).unwrap_err();
        match err {
            SonharioError::Provider { status, message } => {
                assert_eq!(status, Some(413));
                assert_eq!(message, "file too large");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_text_field_is_malformed() {
        let err = parse_transcription(200, r#"{"result":"ok"}"#).unwrap_err();
        assert!(matches!(err, SonharioError::MalformedResponse(_)));
    }
}
