//! Narration: the playback state machine and its session bookkeeping.

mod controller;
mod session;

pub use controller::{ControllerSignal, NarrationOptions, PlaybackController};
pub use session::{PlaybackState, SessionId};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NarrationError {
    #[error("No voice available")]
    NoVoiceAvailable,
    #[error("Speech engine unavailable: {0}")]
    EngineUnavailable(String),
}
