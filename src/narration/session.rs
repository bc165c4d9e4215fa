use crate::engine::UtteranceId;
use crate::voice::VoiceProfile;
use serde::Serialize;
use std::ops::Range;

/// Identifier of one playback attempt. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub fn first() -> Self {
        SessionId(1)
    }

    pub(crate) fn next(self) -> Self {
        SessionId(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally visible playback state; the index is the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "unit", rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Speaking(usize),
    Paused(usize),
    Stopped,
}

impl PlaybackState {
    pub fn is_live(self) -> bool {
        matches!(self, PlaybackState::Speaking(_) | PlaybackState::Paused(_))
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Speaking(unit) => write!(f, "speaking unit {unit}"),
            PlaybackState::Paused(unit) => write!(f, "paused at unit {unit}"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Who asked for a stop, which decides what happens to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Explicit stop button, new file, seek: cursor back to 0.
    User,
    /// Cleanup before a new `start`: cursor kept.
    Restart,
}

/// The live session. At most one exists per controller.
#[derive(Debug, Clone)]
pub struct NarrationSession {
    pub(super) id: SessionId,
    pub(super) paused: bool,
    pub(super) active: Option<Range<usize>>,
    pub(super) outstanding: Option<UtteranceId>,
    pub(super) audio_started: bool,
    pub(super) voice: VoiceProfile,
}

impl NarrationSession {
    pub(super) fn new(id: SessionId, voice: VoiceProfile) -> Self {
        Self {
            id,
            paused: false,
            active: None,
            outstanding: None,
            audio_started: false,
            voice,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn active(&self) -> Option<Range<usize>> {
        self.active.clone()
    }

    pub fn audio_started(&self) -> bool {
        self.audio_started
    }

    /// An event is current only if it names this session and the request in flight.
    pub(super) fn accepts(&self, utterance: &UtteranceId) -> bool {
        utterance.session == self.id && self.outstanding.as_ref() == Some(utterance)
    }
}
