use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::profile::{Gender, UserProfile};
use crate::audio::{ActiveRecording, AudioArtifact, Recorder};
use crate::providers::{Interpreter, Transcriber};
use crate::speech::SpeechSynthesizer;

/// The six mutually exclusive screens. Exactly one is active at any time;
/// Result loops back to Onboarding, Review loops back to Recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Onboarding,
    Recording,
    Review,
    Edit,
    Interpreting,
    Result,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Onboarding => write!(f, "Onboarding"),
            View::Recording => write!(f, "Recording"),
            View::Review => write!(f, "Review"),
            View::Edit => write!(f, "Edit"),
            View::Interpreting => write!(f, "Interpreting"),
            View::Result => write!(f, "Result"),
        }
    }
}

/// Fixed user-visible strings, matching the application's Portuguese UI.
pub const MIC_UNAVAILABLE_NOTICE: &str = "Microfone não disponível.";
pub const TRANSCRIPTION_FAILED_NOTICE: &str = "Erro na transcrição.";
pub const INTERPRETATION_FAILED_TEXT: &str = "Erro ao analisar o sonho.";
pub const EMPTY_INTERPRETATION_TEXT: &str = "Sem resposta.";

/// The view-state machine. Owns all session data, drives every transition,
/// invokes the adapters/clients and maps their outcomes back onto state.
///
/// Each method is a UI trigger; triggers that do not apply to the current
/// view are no-ops. The `busy` flag gates triggers while the transcription
/// call is in flight (interpretation has its own dedicated view), and the
/// `&mut self` receivers mean at most one async operation runs per slot.
pub struct SessionController {
    session_id: String,
    started_at: DateTime<Utc>,
    view: View,
    profile: UserProfile,
    recording: Option<ActiveRecording>,
    artifact: Option<AudioArtifact>,
    transcript: String,
    interpretation: String,
    busy: bool,
    notices: VecDeque<String>,
    recorder: Recorder,
    transcriber: Box<dyn Transcriber>,
    interpreter: Box<dyn Interpreter>,
    speech: Box<dyn SpeechSynthesizer>,
}

impl SessionController {
    pub fn new(
        recorder: Recorder,
        transcriber: Box<dyn Transcriber>,
        interpreter: Box<dyn Interpreter>,
        speech: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        let session_id = format!("dream-{}", uuid::Uuid::new_v4());
        info!("Session created: {}", session_id);

        Self {
            session_id,
            started_at: Utc::now(),
            view: View::default(),
            profile: UserProfile::default(),
            recording: None,
            artifact: None,
            transcript: String::new(),
            interpretation: String::new(),
            busy: false,
            notices: VecDeque::new(),
            recorder,
            transcriber,
            interpreter,
            speech,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn interpretation(&self) -> &str {
        &self.interpretation
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_capturing(&self) -> bool {
        self.recording.is_some()
    }

    /// Drain the next user-visible notice, if any. The presentation layer
    /// calls this after every trigger.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notices.pop_front()
    }

    fn notify(&mut self, message: &str) {
        self.notices.push_back(message.to_string());
    }

    /// Onboarding submit. Guard: trimmed name of at least two characters.
    /// Returns whether the transition to Recording happened.
    pub fn submit_profile(&mut self, name: &str, gender: Gender) -> bool {
        if self.view != View::Onboarding || self.busy {
            return false;
        }

        let candidate = UserProfile {
            name: name.trim().to_string(),
            gender,
        };
        if !candidate.is_valid() {
            warn!("Onboarding rejected: name too short");
            return false;
        }

        info!("Onboarding complete for {} ({})", candidate.name, candidate.gender);
        self.profile = candidate;
        self.view = View::Recording;
        true
    }

    /// Start capturing. On `DeviceUnavailable` the user gets a notice and
    /// the view stays where it is.
    pub async fn start_capture(&mut self) {
        if self.view != View::Recording || self.recording.is_some() || self.busy {
            warn!("Ignoring capture start in view {}", self.view);
            return;
        }

        match self.recorder.begin().await {
            Ok(handle) => {
                self.recording = Some(handle);
            }
            Err(e) => {
                error!("Capture start failed: {}", e);
                self.notify(MIC_UNAVAILABLE_NOTICE);
            }
        }
    }

    /// Stop capturing, finalize the artifact, move to Review.
    pub async fn stop_capture(&mut self) {
        let Some(handle) = self.recording.take() else {
            warn!("Ignoring capture stop: no recording active");
            return;
        };

        match self.recorder.end(handle).await {
            Ok(artifact) => {
                self.artifact = Some(artifact);
                self.view = View::Review;
            }
            Err(e) => {
                // The device is already released; the take is lost.
                error!("Capture finalization failed: {}", e);
                self.notify(MIC_UNAVAILABLE_NOTICE);
            }
        }
    }

    /// Discard the current artifact and record again.
    pub fn rerecord(&mut self) {
        if self.view != View::Review || self.busy {
            return;
        }
        self.artifact = None;
        self.view = View::Recording;
        info!("Re-recording, previous artifact discarded");
    }

    /// Send the artifact for transcription. Success moves to Edit with the
    /// provider's text verbatim; failure reverts to Recording with the
    /// transcript left empty.
    pub async fn request_analysis(&mut self) {
        if self.view != View::Review || self.busy {
            return;
        }
        let Some(artifact) = self.artifact.as_ref() else {
            warn!("Ignoring analysis request: no artifact");
            return;
        };

        self.busy = true;
        let result = self.transcriber.transcribe(artifact).await;
        self.busy = false;

        match result {
            Ok(text) => {
                self.transcript = text;
                self.view = View::Edit;
            }
            Err(e) => {
                error!("Transcription failed: {}", e);
                self.transcript.clear();
                self.notify(TRANSCRIPTION_FAILED_NOTICE);
                self.view = View::Recording;
            }
        }
    }

    /// Rewrite the transcript in place during the edit screen.
    pub fn edit_transcript(&mut self, text: impl Into<String>) {
        if self.view != View::Edit {
            return;
        }
        self.transcript = text.into();
    }

    /// Confirm the transcript and request the interpretation. Moves to
    /// Interpreting immediately; on failure the interpretation becomes a
    /// fixed error text and the session still reaches Result.
    pub async fn confirm_analysis(&mut self) {
        if self.view != View::Edit || self.busy {
            return;
        }

        self.view = View::Interpreting;

        let result = self
            .interpreter
            .interpret(&self.profile, &self.transcript)
            .await;

        self.interpretation = match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_INTERPRETATION_TEXT.to_string(),
            Err(e) => {
                error!("Interpretation failed: {}", e);
                INTERPRETATION_FAILED_TEXT.to_string()
            }
        };
        self.view = View::Result;
    }

    /// Read the interpretation aloud. The synthesizer preprocesses the text
    /// and keeps at most one utterance active.
    pub async fn speak_interpretation(&mut self) {
        if self.view != View::Result {
            return;
        }
        self.speech.speak(&self.interpretation).await;
    }

    /// Start over: clear everything, including the profile.
    pub fn new_session(&mut self) {
        if self.view != View::Result {
            return;
        }
        self.profile = UserProfile::default();
        self.transcript.clear();
        self.interpretation.clear();
        self.artifact = None;
        self.view = View::Onboarding;
        info!("New session started");
    }
}
