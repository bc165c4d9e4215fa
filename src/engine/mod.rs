//! Speech engine seam.
//!
//! The engine is process-wide, stateful and asynchronous: `speak` only
//! enqueues, and `Started`/`Finished`/`Failed` arrive later through the
//! [`EventSink`] the engine was built with. Every event echoes the
//! [`UtteranceId`] of the request it belongs to so the controller can discard
//! notifications from superseded sessions.

pub mod espeak;
#[cfg(test)]
pub(crate) mod testing;

use crate::narration::SessionId;
use crate::voice::VoiceProfile;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use espeak::EspeakEngine;

/// Tag carried by a speech request and echoed by every event about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId {
    pub session: SessionId,
    /// Per-controller request counter; re-issuing the same units gets a new one.
    pub seq: u64,
    pub first_unit: usize,
    pub unit_count: usize,
}

impl UtteranceId {
    pub fn end_unit(&self) -> usize {
        self.first_unit + self.unit_count
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub utterance: UtteranceId,
    pub text: String,
    pub voice: Option<VoiceProfile>,
    /// Multiplier on the engine's natural speaking rate.
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Silence the engine may hold before reporting `Finished`.
    pub trailing_pause: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    Started,
    Finished,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub utterance: UtteranceId,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn started(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: EngineEventKind::Started,
        }
    }

    pub fn finished(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: EngineEventKind::Finished,
        }
    }

    pub fn failed(utterance: UtteranceId, reason: impl Into<String>) -> Self {
        Self {
            utterance,
            kind: EngineEventKind::Failed(reason.into()),
        }
    }
}

/// Callback an engine uses to report events back to the event loop.
pub type EventSink = Arc<dyn Fn(EngineEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCapabilities {
    /// `resume` continues the paused utterance instead of dropping it.
    pub supports_resume: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeakError {
    /// This request cannot be spoken; later ones may still work.
    #[error("speech request rejected: {0}")]
    Rejected(String),
    /// The engine cannot speak at all.
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
}

pub trait SpeechEngine {
    /// Current voice catalog. May be empty while the platform is still loading it.
    fn voices(&self) -> Vec<VoiceProfile>;

    fn capabilities(&self) -> EngineCapabilities;

    /// Enqueue one request; completion is reported through the event sink.
    fn speak(&mut self, request: SpeechRequest) -> Result<(), SpeakError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Drop the current and any queued requests immediately.
    fn cancel_all(&mut self);
}
