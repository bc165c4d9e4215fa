//! Playback controller: turns a unit sequence into one narration session.
//!
//! States are `Idle`, `Speaking(i)`, `Paused(i)` and `Stopped`. Exactly one
//! speech request is outstanding while speaking, and the next one is issued
//! only after the engine reports the current one finished (or failed, which
//! skips it). Every request is tagged with the session id and a request
//! sequence number; events that do not match the live tag are dropped.

use super::NarrationError;
use super::session::{NarrationSession, PlaybackState, SessionId, StopKind};
use crate::config::{AppConfig, MAX_CHUNK_SIZE, MAX_PAUSE_AFTER_UNIT_SECS};
use crate::engine::{
    EngineEvent, EngineEventKind, SpeakError, SpeechEngine, SpeechRequest, UtteranceId,
};
use crate::highlight::HighlightPresenter;
use crate::segmenter::{NarrationUnit, join_units};
use crate::voice::{VoicePreferences, VoiceProfile, select_voice};
use std::ops::Range;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct NarrationOptions {
    /// Units grouped into one speech request; 1 speaks unit by unit.
    pub chunk_size: usize,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub trailing_pause: Duration,
    pub voice_preferences: VoicePreferences,
}

impl Default for NarrationOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl NarrationOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            chunk_size: config.effective_chunk_size().clamp(1, MAX_CHUNK_SIZE),
            rate: config.tts_rate,
            pitch: config.tts_pitch,
            volume: config.tts_volume,
            trailing_pause: Duration::from_secs_f32(
                config
                    .pause_after_unit_secs
                    .clamp(0.0, MAX_PAUSE_AFTER_UNIT_SECS),
            ),
            voice_preferences: VoicePreferences::from_config(config),
        }
    }
}

/// What an engine event or resume did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerSignal {
    /// Not for the live session (or nothing to do); state untouched.
    Stale,
    /// Audio for the outstanding request began.
    AudioStarted,
    /// The next request was issued; highlight moved to this range.
    Advanced(Range<usize>),
    /// Request finished while paused; cursor moved, nothing issued.
    Held,
    /// Paused utterance continues.
    Resumed(Range<usize>),
    /// Sequence consumed; the session is over.
    Exhausted,
    /// The engine became unusable; the session is over.
    Halted(String),
}

enum IssueOutcome {
    Issued(Range<usize>),
    Exhausted,
    Halted(String),
}

pub struct PlaybackController<E, P> {
    engine: E,
    presenter: P,
    options: NarrationOptions,
    units: Vec<NarrationUnit>,
    session: Option<NarrationSession>,
    resting: PlaybackState,
    cursor: usize,
    last_session: SessionId,
    next_seq: u64,
    last_voice: Option<VoiceProfile>,
}

impl<E: SpeechEngine, P: HighlightPresenter> PlaybackController<E, P> {
    pub fn new(engine: E, presenter: P, options: NarrationOptions) -> Self {
        Self {
            engine,
            presenter,
            options,
            units: Vec::new(),
            session: None,
            resting: PlaybackState::Idle,
            cursor: 0,
            last_session: SessionId::first(),
            next_seq: 0,
            last_voice: None,
        }
    }

    /// Replace the unit sequence. Any narration is stopped first.
    pub fn set_units(&mut self, units: Vec<NarrationUnit>) {
        self.stop();
        self.units = units;
        self.resting = PlaybackState::Idle;
        self.presenter.on_document_changed(&self.units);
        debug!(count = self.units.len(), "Loaded narration units");
    }

    pub fn units(&self) -> &[NarrationUnit] {
        &self.units
    }

    pub fn state(&self) -> PlaybackState {
        match &self.session {
            Some(session) if session.paused => PlaybackState::Paused(self.cursor),
            Some(_) => PlaybackState::Speaking(self.cursor),
            None => self.resting,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn session(&self) -> Option<&NarrationSession> {
        self.session.as_ref()
    }

    pub fn active_range(&self) -> Option<Range<usize>> {
        self.session.as_ref().and_then(NarrationSession::active)
    }

    /// Voice chosen by the most recent successful start.
    pub fn voice(&self) -> Option<&VoiceProfile> {
        self.last_voice.as_ref()
    }

    pub fn options(&self) -> &NarrationOptions {
        &self.options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Begin a new session at `from`. Out of range or empty: `Ok(None)`.
    ///
    /// If the engine rejects every remaining unit the session is already over
    /// when this returns `Ok(Some(_))`; `session()` is then `None` and the
    /// state is `Stopped`.
    pub fn start(&mut self, from: usize) -> Result<Option<SessionId>, NarrationError> {
        if from >= self.units.len() {
            debug!(
                from,
                count = self.units.len(),
                "Ignoring start outside the unit sequence"
            );
            return Ok(None);
        }

        self.stop_with(StopKind::Restart);

        let catalog = self.engine.voices();
        let Some(voice) = select_voice(&catalog, &self.options.voice_preferences) else {
            warn!(
                catalog = catalog.len(),
                "No voice available; narration not started"
            );
            self.resting = PlaybackState::Idle;
            return Err(NarrationError::NoVoiceAvailable);
        };

        let id = self.last_session.next();
        self.last_session = id;
        self.cursor = from;
        self.last_voice = Some(voice.clone());
        info!(
            session = %id,
            from,
            voice = %voice.name,
            chunk_size = self.options.chunk_size,
            "Starting narration"
        );
        self.session = Some(NarrationSession::new(id, voice));

        match self.issue_current() {
            IssueOutcome::Issued(_) | IssueOutcome::Exhausted => Ok(Some(id)),
            IssueOutcome::Halted(reason) => {
                self.resting = PlaybackState::Idle;
                Err(NarrationError::EngineUnavailable(reason))
            }
        }
    }

    /// User stop: cancel the engine, clear the highlight, rewind to 0.
    pub fn stop(&mut self) {
        self.stop_with(StopKind::User);
    }

    pub fn stop_with(&mut self, kind: StopKind) {
        self.engine.cancel_all();
        if let Some(session) = self.session.take() {
            info!(session = %session.id, cursor = self.cursor, ?kind, "Stopping narration");
            self.presenter.on_cleared();
            self.resting = PlaybackState::Stopped;
        } else if kind == StopKind::User {
            self.resting = PlaybackState::Stopped;
        }
        if kind == StopKind::User {
            self.cursor = 0;
        }
    }

    /// Jump to `target`: user stop, then start there. Out of range: no-op.
    pub fn seek(&mut self, target: usize) -> Result<Option<SessionId>, NarrationError> {
        if target >= self.units.len() {
            debug!(target, count = self.units.len(), "Ignoring seek out of range");
            return Ok(None);
        }
        info!(target, "Seeking narration");
        self.stop();
        self.start(target)
    }

    /// Pause the live session. Returns false when there is nothing to pause.
    pub fn pause(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.paused {
            return false;
        }
        session.paused = true;
        self.engine.pause();
        info!(session = %session.id, cursor = self.cursor, "Paused narration");
        true
    }

    /// Continue a paused session at the same unit.
    ///
    /// Engines that can resume continue the same utterance. Others drop it and
    /// the unit is spoken again from its beginning under a fresh request tag,
    /// so a late completion for the dropped utterance is treated as stale.
    pub fn resume(&mut self) -> ControllerSignal {
        let supports_resume = self.engine.capabilities().supports_resume;
        let Some(session) = self.session.as_mut() else {
            return ControllerSignal::Stale;
        };
        if !session.paused {
            return ControllerSignal::Stale;
        }
        session.paused = false;
        info!(session = %session.id, cursor = self.cursor, "Resuming narration");

        match (session.outstanding, session.active.clone()) {
            (Some(_), Some(active)) if supports_resume => {
                self.engine.resume();
                ControllerSignal::Resumed(active)
            }
            (Some(outstanding), _) => {
                debug!(
                    seq = outstanding.seq,
                    unit = outstanding.first_unit,
                    "Engine cannot resume; restarting unit"
                );
                session.outstanding = None;
                session.audio_started = false;
                self.engine.cancel_all();
                self.engine.resume();
                self.cursor = outstanding.first_unit;
                self.issue_signal()
            }
            (None, _) => {
                self.engine.resume();
                self.issue_signal()
            }
        }
    }

    /// Apply an asynchronous engine notification.
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> ControllerSignal {
        let utterance = event.utterance;
        let Some(session) = self.session.as_mut() else {
            debug!(
                session = %utterance.session,
                seq = utterance.seq,
                "Discarding engine event with no live session"
            );
            return ControllerSignal::Stale;
        };
        if !session.accepts(&utterance) {
            debug!(
                session = %utterance.session,
                live = %session.id,
                seq = utterance.seq,
                "Discarding stale engine event"
            );
            return ControllerSignal::Stale;
        }

        match event.kind {
            EngineEventKind::Started => {
                session.audio_started = true;
                ControllerSignal::AudioStarted
            }
            EngineEventKind::Finished | EngineEventKind::Failed(_) => {
                if let EngineEventKind::Failed(reason) = &event.kind {
                    warn!(
                        unit = utterance.first_unit,
                        %reason,
                        "Speech engine failed on unit; skipping"
                    );
                }
                session.outstanding = None;
                session.audio_started = false;
                self.cursor = utterance.end_unit();
                if session.paused {
                    debug!(cursor = self.cursor, "Request finished while paused");
                    return ControllerSignal::Held;
                }
                self.issue_signal()
            }
        }
    }

    fn issue_signal(&mut self) -> ControllerSignal {
        match self.issue_current() {
            IssueOutcome::Issued(range) => ControllerSignal::Advanced(range),
            IssueOutcome::Exhausted => ControllerSignal::Exhausted,
            IssueOutcome::Halted(reason) => ControllerSignal::Halted(reason),
        }
    }

    /// Issue the request starting at the cursor, skipping units the engine rejects.
    fn issue_current(&mut self) -> IssueOutcome {
        loop {
            if self.cursor >= self.units.len() {
                self.finish_exhausted();
                return IssueOutcome::Exhausted;
            }
            let Some(session) = self.session.as_mut() else {
                return IssueOutcome::Exhausted;
            };

            let end = (self.cursor + self.options.chunk_size.max(1)).min(self.units.len());
            let range = self.cursor..end;
            self.next_seq = self.next_seq.wrapping_add(1);
            let utterance = UtteranceId {
                session: session.id,
                seq: self.next_seq,
                first_unit: range.start,
                unit_count: range.len(),
            };
            let text = join_units(&self.units[range.clone()]);
            let request = SpeechRequest {
                utterance,
                text,
                voice: Some(session.voice.clone()),
                rate: self.options.rate,
                pitch: self.options.pitch,
                volume: self.options.volume,
                trailing_pause: self.options.trailing_pause,
            };

            match self.engine.speak(request) {
                Ok(()) => {
                    debug!(
                        session = %utterance.session,
                        seq = utterance.seq,
                        start = range.start,
                        end = range.end,
                        "Issued speech request"
                    );
                    session.outstanding = Some(utterance);
                    session.active = Some(range.clone());
                    self.presenter.on_active_unit_changed(range.clone());
                    return IssueOutcome::Issued(range);
                }
                Err(SpeakError::Rejected(reason)) => {
                    warn!(
                        start = range.start,
                        end = range.end,
                        %reason,
                        "Speech request rejected; skipping"
                    );
                    self.cursor = range.end;
                }
                Err(SpeakError::Unavailable(reason)) => {
                    warn!(%reason, "Speech engine unavailable; ending narration");
                    self.stop_with(StopKind::Restart);
                    return IssueOutcome::Halted(reason);
                }
            }
        }
    }

    fn finish_exhausted(&mut self) {
        if let Some(session) = self.session.take() {
            info!(session = %session.id, "Narration reached end of sequence");
            self.presenter.on_cleared();
        }
        self.resting = PlaybackState::Stopped;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::ScriptedEngine;
    use crate::highlight::testing::{PresenterCall, RecordingPresenter};
    use crate::segmenter::segment;

    type TestController = PlaybackController<ScriptedEngine, RecordingPresenter>;

    fn controller_with(text: &str, engine: ScriptedEngine, chunk_size: usize) -> TestController {
        let options = NarrationOptions {
            chunk_size,
            trailing_pause: Duration::ZERO,
            ..NarrationOptions::default()
        };
        let mut controller = PlaybackController::new(engine, RecordingPresenter::default(), options);
        controller.set_units(segment(text));
        controller
    }

    fn five_units() -> TestController {
        controller_with(
            "Zero. One. Two. Three. Four.",
            ScriptedEngine::with_voices(&["Samantha"]),
            1,
        )
    }

    fn outstanding(controller: &TestController) -> UtteranceId {
        controller.engine().last_request().utterance
    }

    fn finish_current(controller: &mut TestController) -> ControllerSignal {
        let utterance = outstanding(controller);
        controller.handle_engine_event(EngineEvent::finished(utterance))
    }

    fn highlight_starts(calls: &[PresenterCall]) -> Vec<usize> {
        calls
            .iter()
            .filter_map(|call| match call {
                PresenterCall::Active(range) => Some(range.start),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sequences_every_unit_once_then_clears() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");

        let mut signals = Vec::new();
        for _ in 0..5 {
            signals.push(finish_current(&mut controller));
        }

        let calls = &controller.presenter().calls;
        assert_eq!(highlight_starts(calls), vec![0, 1, 2, 3, 4]);
        assert_eq!(calls.last(), Some(&PresenterCall::Cleared));
        assert_eq!(
            calls
                .iter()
                .filter(|call| **call == PresenterCall::Cleared)
                .count(),
            1
        );
        assert_eq!(signals.last(), Some(&ControllerSignal::Exhausted));
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(controller.engine().requests.len(), 5);
    }

    #[test]
    fn requests_carry_unit_text_and_options() {
        let mut controller = five_units();
        controller.start(1).expect("voice available");
        let request = controller.engine().last_request();
        assert_eq!(request.text, "One.");
        assert_eq!(request.voice.as_ref().map(|v| v.name.as_str()), Some("Samantha"));
        assert!((request.rate - 0.85).abs() < f32::EPSILON);
        assert_eq!(controller.state(), PlaybackState::Speaking(1));
    }

    #[test]
    fn stale_completion_from_superseded_session_is_ignored() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        let stale = outstanding(&controller);

        controller.start(3).expect("voice available");
        let signal = controller.handle_engine_event(EngineEvent::finished(stale));

        assert_eq!(signal, ControllerSignal::Stale);
        assert_eq!(controller.cursor(), 3);
        assert_eq!(controller.state(), PlaybackState::Speaking(3));
        assert_eq!(
            controller
                .presenter()
                .calls
                .iter()
                .filter(|call| matches!(call, PresenterCall::Active(_)))
                .count(),
            2
        );
    }

    #[test]
    fn start_preserves_nothing_from_the_previous_session() {
        let mut controller = five_units();
        let first = controller.start(0).expect("voice").expect("started");
        let second = controller.start(2).expect("voice").expect("started");
        assert!(second > first);
        assert!(controller.engine().cancel_calls >= 2);
        assert_eq!(controller.session().map(|s| s.id()), Some(second));
    }

    #[test]
    fn seek_cancels_pending_request_and_starts_target() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        finish_current(&mut controller);
        finish_current(&mut controller);
        assert_eq!(controller.state(), PlaybackState::Speaking(2));
        let pending = outstanding(&controller);
        let cancels_before = controller.engine().cancel_calls;
        let calls_before = controller.presenter().calls.len();

        controller.seek(4).expect("voice available");
        let late = controller.handle_engine_event(EngineEvent::finished(pending));

        assert_eq!(late, ControllerSignal::Stale);
        assert!(controller.engine().cancel_calls > cancels_before);
        assert_eq!(controller.state(), PlaybackState::Speaking(4));
        let after_seek = &controller.presenter().calls[calls_before..];
        assert_eq!(
            after_seek,
            &[PresenterCall::Cleared, PresenterCall::Active(4..5)]
        );
    }

    #[test]
    fn out_of_range_start_and_seek_are_no_ops() {
        let mut controller = five_units();
        assert_eq!(controller.start(5), Ok(None));
        assert_eq!(controller.state(), PlaybackState::Idle);

        controller.start(1).expect("voice available");
        assert_eq!(controller.seek(99), Ok(None));
        assert_eq!(controller.state(), PlaybackState::Speaking(1));

        let mut empty = controller_with("   ", ScriptedEngine::with_voices(&["Samantha"]), 1);
        assert_eq!(empty.start(0), Ok(None));
        assert_eq!(empty.state(), PlaybackState::Idle);
        assert!(empty.engine().requests.is_empty());
    }

    #[test]
    fn pause_and_resume_keep_position() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        finish_current(&mut controller);
        finish_current(&mut controller);

        assert!(controller.pause());
        assert_eq!(controller.state(), PlaybackState::Paused(2));
        assert!(!controller.pause());
        let requests_before = controller.engine().requests.len();

        let signal = controller.resume();

        assert_eq!(signal, ControllerSignal::Resumed(2..3));
        assert_eq!(controller.state(), PlaybackState::Speaking(2));
        assert_eq!(controller.engine().resume_calls, 1);
        assert_eq!(controller.engine().requests.len(), requests_before);
    }

    #[test]
    fn resume_without_engine_support_restarts_the_same_unit() {
        let mut engine = ScriptedEngine::with_voices(&["Samantha"]);
        engine.supports_resume = false;
        let mut controller = controller_with("Zero. One. Two. Three.", engine, 1);
        controller.start(0).expect("voice available");
        finish_current(&mut controller);
        finish_current(&mut controller);
        let dropped = outstanding(&controller);

        controller.pause();
        let signal = controller.resume();

        assert_eq!(signal, ControllerSignal::Advanced(2..3));
        let reissued = outstanding(&controller);
        assert_eq!(reissued.first_unit, 2);
        assert_ne!(reissued.seq, dropped.seq);
        assert_eq!(controller.engine().last_request().text, "Two.");
        assert_eq!(
            controller.handle_engine_event(EngineEvent::finished(dropped)),
            ControllerSignal::Stale
        );
        assert_eq!(controller.state(), PlaybackState::Speaking(2));
    }

    #[test]
    fn completion_while_paused_holds_until_resume() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        finish_current(&mut controller);
        finish_current(&mut controller);
        controller.pause();
        let requests_before = controller.engine().requests.len();

        let signal = finish_current(&mut controller);

        assert_eq!(signal, ControllerSignal::Held);
        assert_eq!(controller.state(), PlaybackState::Paused(3));
        assert_eq!(controller.engine().requests.len(), requests_before);

        assert_eq!(controller.resume(), ControllerSignal::Advanced(3..4));
        assert_eq!(controller.engine().last_request().text, "Three.");
    }

    #[test]
    fn failed_unit_is_skipped_not_fatal() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        let utterance = outstanding(&controller);

        let signal =
            controller.handle_engine_event(EngineEvent::failed(utterance, "unsupported text"));

        assert_eq!(signal, ControllerSignal::Advanced(1..2));
        assert_eq!(controller.state(), PlaybackState::Speaking(1));
    }

    #[test]
    fn rejected_request_is_skipped_synchronously() {
        let mut engine = ScriptedEngine::with_voices(&["Samantha"]);
        engine.reject_texts = vec!["One.".to_string()];
        let mut controller = controller_with("Zero. One. Two.", engine, 1);
        controller.start(0).expect("voice available");

        assert_eq!(finish_current(&mut controller), ControllerSignal::Advanced(2..3));
        assert_eq!(highlight_starts(&controller.presenter().calls), vec![0, 2]);
    }

    #[test]
    fn start_with_every_unit_rejected_is_already_over() {
        let mut engine = ScriptedEngine::with_voices(&["Samantha"]);
        engine.reject_texts = vec!["One.".to_string(), "Two.".to_string()];
        let mut controller = controller_with("One. Two.", engine, 1);

        let started = controller.start(0).expect("voice available");

        assert!(started.is_some());
        assert!(controller.session().is_none());
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(controller.cursor(), 0);
        assert!(controller.engine().requests.is_empty());
    }

    #[test]
    fn engine_lost_mid_session_halts() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        let first = outstanding(&controller);
        controller.engine_mut().unavailable = true;

        let signal = finish_current(&mut controller);

        assert_eq!(
            signal,
            ControllerSignal::Halted("synthesis unsupported".to_string())
        );
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert!(controller.session().is_none());
        assert_eq!(controller.engine().requests.len(), 1);
        assert_eq!(controller.presenter().calls.last(), Some(&PresenterCall::Cleared));
        assert_eq!(
            controller.handle_engine_event(EngineEvent::finished(first)),
            ControllerSignal::Stale
        );
    }

    #[test]
    fn started_event_only_marks_audio() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        let utterance = outstanding(&controller);

        assert_eq!(
            controller.handle_engine_event(EngineEvent::started(utterance)),
            ControllerSignal::AudioStarted
        );
        assert!(controller.session().is_some_and(|s| s.audio_started()));
        assert_eq!(controller.state(), PlaybackState::Speaking(0));
        assert_eq!(
            controller.presenter().calls,
            vec![PresenterCall::Document(5), PresenterCall::Active(0..1)]
        );
    }

    #[test]
    fn chunking_groups_units_per_request() {
        let mut controller = controller_with(
            "A. B. C. D. E.",
            ScriptedEngine::with_voices(&["Samantha"]),
            2,
        );
        controller.start(0).expect("voice available");
        assert_eq!(controller.engine().last_request().text, "A. B.");

        assert_eq!(finish_current(&mut controller), ControllerSignal::Advanced(2..4));
        assert_eq!(finish_current(&mut controller), ControllerSignal::Advanced(4..5));
        assert_eq!(controller.engine().last_request().text, "E.");
        assert_eq!(finish_current(&mut controller), ControllerSignal::Exhausted);
        assert_eq!(
            controller.presenter().calls,
            vec![
                PresenterCall::Document(5),
                PresenterCall::Active(0..2),
                PresenterCall::Active(2..4),
                PresenterCall::Active(4..5),
                PresenterCall::Cleared,
            ]
        );
    }

    #[test]
    fn no_voice_leaves_controller_idle() {
        let mut controller = controller_with("One. Two.", ScriptedEngine::default(), 1);
        assert_eq!(controller.start(0), Err(NarrationError::NoVoiceAvailable));
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.engine().requests.is_empty());
        assert!(controller.voice().is_none());
    }

    #[test]
    fn unavailable_engine_fails_start_and_stays_idle() {
        let mut engine = ScriptedEngine::with_voices(&["Samantha"]);
        engine.unavailable = true;
        let mut controller = controller_with("One. Two.", engine, 1);

        let result = controller.start(0);

        assert!(matches!(result, Err(NarrationError::EngineUnavailable(_))));
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.session().is_none());
    }

    #[test]
    fn user_stop_rewinds_and_restart_stop_keeps_cursor() {
        let mut controller = five_units();
        controller.start(3).expect("voice available");
        controller.stop_with(StopKind::Restart);
        assert_eq!(controller.cursor(), 3);
        assert_eq!(controller.state(), PlaybackState::Stopped);

        controller.start(2).expect("voice available");
        controller.stop();
        assert_eq!(controller.cursor(), 0);
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(controller.presenter().calls.last(), Some(&PresenterCall::Cleared));
    }

    #[test]
    fn stop_when_idle_does_not_touch_presenter() {
        let mut controller = five_units();
        controller.stop();
        assert_eq!(controller.presenter().calls, vec![PresenterCall::Document(5)]);
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(controller.resume(), ControllerSignal::Stale);
    }

    #[test]
    fn voice_is_reselected_at_every_start() {
        let mut controller = controller_with("One. Two.", ScriptedEngine::default(), 1);
        assert!(controller.start(0).is_err());

        controller.engine_mut().catalog = vec![VoiceProfile::new("Daniel", "en-GB")];
        controller.start(0).expect("catalog populated");
        assert_eq!(controller.voice().map(|v| v.name.as_str()), Some("Daniel"));
    }

    #[test]
    fn events_after_stop_are_stale() {
        let mut controller = five_units();
        controller.start(0).expect("voice available");
        let utterance = outstanding(&controller);
        controller.stop();

        assert_eq!(
            controller.handle_engine_event(EngineEvent::finished(utterance)),
            ControllerSignal::Stale
        );
        assert_eq!(controller.cursor(), 0);
        assert_eq!(controller.state(), PlaybackState::Stopped);
    }
}
