pub mod controller;
pub mod profile;

pub use controller::{
    SessionController, View, EMPTY_INTERPRETATION_TEXT, INTERPRETATION_FAILED_TEXT,
    MIC_UNAVAILABLE_NOTICE, TRANSCRIPTION_FAILED_NOTICE,
};
pub use profile::{Gender, UserProfile};
