use std::io::ErrorKind;
use std::sync::{Arc, Mutex};

use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Prepare prose for speech synthesis: drop markdown emphasis/heading/quote
/// markers, turn paragraph breaks into sentence pauses, flatten the rest
/// into one line. Idempotent.
pub fn clean_for_speech(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '_' | '~' | '`' | '>'))
        .collect();

    stripped
        .replace("\n\n", ". ")
        .replace('\n', " ")
        .trim()
        .to_string()
}

/// On-device text-to-speech seam. Implementations preprocess with
/// `clean_for_speech` and keep at most one utterance active.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send {
    async fn speak(&mut self, text: &str);
}

/// Speaks through the platform TTS command (`say` on macOS, `espeak-ng`
/// elsewhere). Degrades to a permanent no-op once the command turns out to
/// be absent; speech is the one capability allowed to fail silently.
pub struct CommandSynthesizer {
    locale: String,
    current: Option<Child>,
    available: bool,
}

impl CommandSynthesizer {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            current: None,
            available: true,
        }
    }

    #[cfg(target_os = "macos")]
    fn command(&self, text: &str) -> Command {
        let mut cmd = Command::new("say");
        cmd.arg(text);
        cmd
    }

    #[cfg(not(target_os = "macos"))]
    fn command(&self, text: &str) -> Command {
        let mut cmd = Command::new("espeak-ng");
        cmd.arg("-v").arg(self.locale.to_lowercase()).arg(text);
        cmd
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(&mut self, text: &str) {
        if !self.available {
            return;
        }

        let cleaned = clean_for_speech(text);
        if cleaned.is_empty() {
            return;
        }

        // At most one active utterance: cancel whatever is still playing.
        if let Some(mut child) = self.current.take() {
            let _ = child.start_kill();
        }

        debug!(locale = %self.locale, "Speaking {} characters", cleaned.chars().count());

        match self.command(&cleaned).spawn() {
            Ok(child) => self.current = Some(child),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Speech synthesis unavailable on this host, disabling");
                self.available = false;
            }
            Err(e) => warn!("Failed to start speech synthesis: {}", e),
        }
    }
}

/// Synthesizer that records what would have been spoken. Used by tests and
/// as the fallback when no audio output is wanted.
#[derive(Default)]
pub struct NullSynthesizer {
    log: Arc<Mutex<Vec<String>>>,
}

impl NullSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the spoken-text log.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for NullSynthesizer {
    async fn speak(&mut self, text: &str) {
        let cleaned = clean_for_speech(text);
        if let Ok(mut log) = self.log.lock() {
            log.push(cleaned);
        }
    }
}
