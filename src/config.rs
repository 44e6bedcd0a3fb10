use serde::Deserialize;

use crate::error::{Result, SonharioError};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub audio: AudioConfig,
    pub speech: SpeechConfig,
}

/// Settings for the hosted STT + LLM provider.
///
/// Vendor selection is configuration, not code: base URL and model ids are
/// the only things that change between compatible providers.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Secret API key. Comes from the environment overlay in practice
    /// (`SONHARIO__PROVIDER__API_KEY`); an empty key is a fatal error.
    #[serde(default)]
    pub api_key: String,
    pub base_url: String,
    pub transcription_model: String,
    pub interpretation_model: String,
    pub language: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// BCP-47 locale passed to the on-device synthesizer.
    pub locale: String,
}

impl Config {
    /// Load configuration from a file plus the `SONHARIO__` environment
    /// overlay, then validate that a provider key is present.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SONHARIO").separator("__"))
            .build()
            .map_err(|e| SonharioError::Configuration(e.to_string()))?;

        let cfg: Config = settings
            .try_deserialize()
            .map_err(|e| SonharioError::Configuration(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// The key must exist before any request is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            return Err(SonharioError::Configuration(
                "provider API key is missing (set SONHARIO__PROVIDER__API_KEY)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(api_key: &str) -> Config {
        Config {
            provider: ProviderConfig {
                api_key: api_key.to_string(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                transcription_model: "whisper-large-v3-turbo".to_string(),
                interpretation_model: "llama-3.3-70b-versatile".to_string(),
                language: "pt".to_string(),
                temperature: 0.8,
            },
            audio: AudioConfig {
                sample_rate: 16000,
                channels: 1,
            },
            speech: SpeechConfig {
                locale: "pt-BR".to_string(),
            },
        }
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = sample("").validate().unwrap_err();
        assert!(matches!(err, SonharioError::Configuration(_)));
    }

    #[test]
    fn blank_api_key_is_a_configuration_error() {
        let err = sample("   ").validate().unwrap_err();
        assert!(matches!(err, SonharioError::Configuration(_)));
    }

    #[test]
    fn present_api_key_passes_validation() {
        assert!(sample("gsk_test").validate().is_ok());
    }
}
