//! Failure taxonomy surfaced by the reader.
//!
//! Nothing here is fatal to the process: every variant ends up as a status
//! message while narration stays `Idle` or `Stopped`.

use crate::narration::NarrationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    /// The file type was not recognised; a plain-text read is attempted instead.
    #[error("Unsupported file type for {path}")]
    UnsupportedFile { path: PathBuf },

    /// The adapter could not extract text (or decode the visual) for a document.
    #[error("Could not decode {path}: {reason}")]
    DecodeFailure { path: PathBuf, reason: String },

    /// The speech engine has no usable voice.
    #[error("No voice available")]
    NoVoiceAvailable,

    /// One unit failed synthesis; narration skips it and continues.
    #[error("Speech engine failed on unit {unit}: {reason}")]
    EngineUnitError { unit: usize, reason: String },

    /// The speech engine cannot synthesize at all.
    #[error("Speech engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A notification from a superseded session. Logged, never shown.
    #[error("Discarded stale engine notification")]
    StaleCallback,

    /// The operation needs a loaded document.
    #[error("No document loaded")]
    NoDocument,
}

impl From<NarrationError> for ReaderError {
    fn from(err: NarrationError) -> Self {
        match err {
            NarrationError::NoVoiceAvailable => ReaderError::NoVoiceAvailable,
            NarrationError::EngineUnavailable(reason) => ReaderError::EngineUnavailable(reason),
        }
    }
}

impl ReaderError {
    /// Whether this failure belongs in the user-visible status line.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ReaderError::StaleCallback)
    }
}
