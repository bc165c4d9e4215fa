//! The reader: one loaded document plus the narration controller driving it.
//!
//! This is the surface the front end talks to. Operations never fail hard;
//! anything that goes wrong lands in [`Reader::status_message`] and narration
//! is left `Idle` or `Stopped`. Pagination lives here, not in the controller:
//! when a page's units run out the reader decides whether to turn the page
//! and start again at unit 0.

use crate::cancellation::CancellationToken;
use crate::config::AppConfig;
use crate::document::{Document, SourceKind, VisualInfo};
use crate::engine::{EngineEvent, EngineEventKind, SpeechEngine};
use crate::error::ReaderError;
use crate::highlight::HighlightPresenter;
use crate::loader;
use crate::narration::{
    ControllerSignal, NarrationOptions, PlaybackController, PlaybackState, SessionId,
};
use crate::normalizer::TextNormalizer;
use crate::segmenter::join_units;
use crate::voice::{VoiceProfile, select_voice};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCommand {
    GetSnapshot,
    LoadFile { path: PathBuf },
    Play,
    Pause,
    Resume,
    TogglePlayPause,
    Stop,
    SeekToUnit { index: usize },
    NextUnit,
    PrevUnit,
    NextPage,
    PrevPage,
}

impl ReaderCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::LoadFile { .. } => "reader_load_file",
            Self::Play => "reader_play",
            Self::Pause => "reader_pause",
            Self::Resume => "reader_resume",
            Self::TogglePlayPause => "reader_toggle_play_pause",
            Self::Stop => "reader_stop",
            Self::SeekToUnit { .. } => "reader_seek_to_unit",
            Self::NextUnit => "reader_next_unit",
            Self::PrevUnit => "reader_prev_unit",
            Self::NextPage => "reader_next_page",
            Self::PrevPage => "reader_prev_page",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaderSnapshot {
    pub source_path: Option<String>,
    pub source_kind: Option<SourceKind>,
    pub page_info: String,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_text: String,
    pub unit_count: usize,
    pub playback: PlaybackState,
    pub session_id: Option<SessionId>,
    pub audio_started: bool,
    pub cursor: usize,
    pub active_range: Option<(usize, usize)>,
    pub active_text: Option<String>,
    pub voice_label: String,
    pub status_message: Option<String>,
    pub auto_continue: bool,
    pub visual: Option<VisualInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaderEvent {
    pub action: &'static str,
    pub snapshot: ReaderSnapshot,
}

pub struct Reader<E, P> {
    config: AppConfig,
    normalizer: TextNormalizer,
    controller: PlaybackController<E, P>,
    document: Option<Document>,
    status: Option<String>,
    cancel: CancellationToken,
    voice_preview: Option<VoiceProfile>,
}

impl<E: SpeechEngine, P: HighlightPresenter> Reader<E, P> {
    pub fn new(engine: E, presenter: P, config: AppConfig) -> Self {
        let options = NarrationOptions::from_config(&config);
        let mut reader = Self {
            normalizer: TextNormalizer::from_config(&config),
            controller: PlaybackController::new(engine, presenter, options),
            config,
            document: None,
            status: None,
            cancel: CancellationToken::new(),
            voice_preview: None,
        };
        reader.voices();
        reader
    }

    /// Token whose cancellation aborts in-flight document loads.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[cfg(test)]
    pub fn controller(&self) -> &PlaybackController<E, P> {
        &self.controller
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Query the engine's catalog and refresh the voice shown before a start.
    pub fn voices(&mut self) -> Vec<VoiceProfile> {
        let catalog = self.controller.engine().voices();
        self.voice_preview = select_voice(&catalog, &self.controller.options().voice_preferences);
        catalog
    }

    /// Stop narration and replace the document with the one at `path`.
    pub fn load_file(&mut self, path: &Path) {
        info!(path = %path.display(), "Opening file");
        self.controller.stop();
        let loaded =
            loader::load_document(path, None, &self.normalizer, &self.cancel.child());
        let message = match &loaded.warning {
            Some(err) => err.to_string(),
            None => format!("Loaded {}", path.display()),
        };
        self.set_document(loaded.document);
        self.status = Some(message);
    }

    /// Install an already extracted document. Narration is stopped and rewound.
    pub fn set_document(&mut self, document: Document) {
        let units = document.units(self.config.segment_mode);
        debug!(
            kind = ?document.kind(),
            pages = document.page_count(),
            units = units.len(),
            "Installing document"
        );
        self.document = Some(document);
        self.controller.set_units(units);
    }

    /// Start at the cursor, or continue if paused. Already speaking: no-op.
    pub fn play(&mut self) -> Result<(), ReaderError> {
        if self.document.is_none() {
            return Err(self.fail(ReaderError::NoDocument));
        }
        match self.controller.state() {
            PlaybackState::Speaking(_) => Ok(()),
            PlaybackState::Paused(_) => {
                self.resume();
                Ok(())
            }
            PlaybackState::Idle | PlaybackState::Stopped => {
                let from = self.controller.cursor();
                self.start_at(from)
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.controller.pause();
        if paused {
            self.status = Some("Paused".to_string());
        }
        paused
    }

    pub fn resume(&mut self) -> ControllerSignal {
        let signal = self.controller.resume();
        if signal != ControllerSignal::Stale {
            self.status = None;
        }
        self.after_signal(signal)
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), ReaderError> {
        match self.controller.state() {
            PlaybackState::Speaking(_) => {
                self.pause();
                Ok(())
            }
            PlaybackState::Paused(_) => {
                self.resume();
                Ok(())
            }
            PlaybackState::Idle | PlaybackState::Stopped => self.play(),
        }
    }

    pub fn stop(&mut self) {
        info!("Stop requested");
        self.controller.stop();
        self.status = Some("Stopped".to_string());
    }

    /// Jump to unit `index` of the current page and speak from there.
    pub fn seek_to_unit(&mut self, index: usize) -> Result<(), ReaderError> {
        if self.document.is_none() {
            return Err(self.fail(ReaderError::NoDocument));
        }
        match self.controller.seek(index) {
            Ok(Some(_)) if self.controller.session().is_none() => {
                self.status = None;
                self.on_exhausted();
                Ok(())
            }
            Ok(Some(_)) => {
                self.status = None;
                Ok(())
            }
            Ok(None) => {
                self.status = Some(format!(
                    "Unit {index} is out of range (0..{})",
                    self.controller.units().len()
                ));
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    pub fn next_unit(&mut self) -> Result<(), ReaderError> {
        let target = self.controller.cursor() + 1;
        self.seek_to_unit(target)
    }

    pub fn prev_unit(&mut self) -> Result<(), ReaderError> {
        let target = self.controller.cursor().saturating_sub(1);
        self.seek_to_unit(target)
    }

    pub fn next_page(&mut self) -> Result<(), ReaderError> {
        let Some(page) = self
            .document
            .as_ref()
            .filter(|doc| doc.kind().is_paginated() && doc.has_next_page())
            .map(|doc| doc.current_page() + 1)
        else {
            return Ok(());
        };
        let autoplay = matches!(self.controller.state(), PlaybackState::Speaking(_));
        self.turn_page(page, autoplay)
    }

    pub fn prev_page(&mut self) -> Result<(), ReaderError> {
        let Some(page) = self
            .document
            .as_ref()
            .filter(|doc| doc.kind().is_paginated() && doc.has_prev_page())
            .map(|doc| doc.current_page() - 1)
        else {
            return Ok(());
        };
        let autoplay = matches!(self.controller.state(), PlaybackState::Speaking(_));
        self.turn_page(page, autoplay)
    }

    /// Feed an engine notification through; continues onto the next page if enabled.
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> ControllerSignal {
        let failed = match &event.kind {
            EngineEventKind::Failed(reason) => Some((event.utterance.first_unit, reason.clone())),
            _ => None,
        };
        let signal = self.controller.handle_engine_event(event);
        if signal == ControllerSignal::Stale {
            debug!("{}", ReaderError::StaleCallback);
            return signal;
        }
        if let Some((unit, reason)) = failed {
            self.status = Some(ReaderError::EngineUnitError { unit, reason }.to_string());
        }
        self.after_signal(signal)
    }

    pub fn current_page_info(&self) -> String {
        self.document
            .as_ref()
            .map(Document::page_label)
            .unwrap_or_else(|| "No file".to_string())
    }

    /// Voice of the last start, else the one picked at the last catalog query.
    pub fn current_voice_label(&self) -> String {
        match self.controller.voice().or(self.voice_preview.as_ref()) {
            Some(voice) => format!("Using voice: {}", voice.name),
            None => "No voice found".to_string(),
        }
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        let active = self.controller.active_range();
        let active_text = active
            .as_ref()
            .map(|range| join_units(&self.controller.units()[range.clone()]));
        let session = self.controller.session();
        ReaderSnapshot {
            source_path: self
                .document
                .as_ref()
                .map(|doc| doc.source_path().display().to_string()),
            source_kind: self.document.as_ref().map(Document::kind),
            page_info: self.current_page_info(),
            current_page: self.document.as_ref().map_or(0, Document::current_page),
            total_pages: self.document.as_ref().map_or(0, Document::page_count),
            page_text: self
                .document
                .as_ref()
                .and_then(|doc| loader::extract_page_text(doc, doc.current_page()))
                .unwrap_or_default()
                .to_string(),
            unit_count: self.controller.units().len(),
            playback: self.controller.state(),
            session_id: session.map(|session| session.id()),
            audio_started: session.is_some_and(|session| session.audio_started()),
            cursor: self.controller.cursor(),
            active_range: active.map(|range| (range.start, range.end)),
            active_text,
            voice_label: self.current_voice_label(),
            status_message: self.status.clone(),
            auto_continue: self.config.auto_continue,
            visual: self.document.as_ref().and_then(|doc| doc.visual().cloned()),
        }
    }

    pub fn apply_command(&mut self, command: ReaderCommand) -> ReaderEvent {
        let action = command.action();
        debug!(action, "Applying reader command");
        let result = match command {
            ReaderCommand::GetSnapshot => Ok(()),
            ReaderCommand::LoadFile { path } => {
                self.load_file(&path);
                Ok(())
            }
            ReaderCommand::Play => self.play(),
            ReaderCommand::Pause => {
                self.pause();
                Ok(())
            }
            ReaderCommand::Resume => {
                self.resume();
                Ok(())
            }
            ReaderCommand::TogglePlayPause => self.toggle_play_pause(),
            ReaderCommand::Stop => {
                self.stop();
                Ok(())
            }
            ReaderCommand::SeekToUnit { index } => self.seek_to_unit(index),
            ReaderCommand::NextUnit => self.next_unit(),
            ReaderCommand::PrevUnit => self.prev_unit(),
            ReaderCommand::NextPage => self.next_page(),
            ReaderCommand::PrevPage => self.prev_page(),
        };
        if let Err(err) = result {
            debug!(action, "Reader command failed: {err}");
        }
        ReaderEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    fn start_at(&mut self, from: usize) -> Result<(), ReaderError> {
        match self.controller.start(from) {
            Ok(Some(_)) if self.controller.session().is_none() => {
                debug!(from, "Every remaining unit was rejected");
                self.status = None;
                self.on_exhausted();
                Ok(())
            }
            Ok(Some(_)) => {
                self.status = None;
                Ok(())
            }
            Ok(None) => {
                self.status = Some("Nothing to read on this page".to_string());
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Show the page `page` and, if asked, narrate it from the first unit.
    fn turn_page(&mut self, page: usize, autoplay: bool) -> Result<(), ReaderError> {
        let Some(doc) = self.document.as_mut() else {
            return Ok(());
        };
        if !doc.set_page(page) {
            return Ok(());
        }
        let units = doc.units(self.config.segment_mode);
        info!(page = page + 1, units = units.len(), autoplay, "Turned page");
        self.controller.set_units(units);
        if autoplay {
            self.start_at(0)
        } else {
            Ok(())
        }
    }

    fn after_signal(&mut self, signal: ControllerSignal) -> ControllerSignal {
        match &signal {
            ControllerSignal::Exhausted => self.on_exhausted(),
            ControllerSignal::Halted(reason) => {
                self.status =
                    Some(ReaderError::EngineUnavailable(reason.clone()).to_string());
            }
            _ => {}
        }
        signal
    }

    fn on_exhausted(&mut self) {
        let next = self
            .document
            .as_ref()
            .filter(|doc| self.config.auto_continue && doc.kind().is_paginated())
            .and_then(|doc| {
                doc.next_narratable_page(doc.current_page() + 1, self.config.segment_mode)
            });
        match next {
            Some(page) => {
                info!(page = page + 1, "Continuing narration on next page");
                // A nested exhaustion on the new page has already set the status.
                if self.turn_page(page, true).is_ok() && self.controller.session().is_some() {
                    self.status = Some(format!("Continuing on page {}", page + 1));
                }
            }
            None => {
                self.status = Some("Finished reading".to_string());
            }
        }
    }

    fn fail(&mut self, err: ReaderError) -> ReaderError {
        if err.is_user_visible() {
            warn!("{err}");
            self.status = Some(err.to_string());
        }
        err
    }
}
