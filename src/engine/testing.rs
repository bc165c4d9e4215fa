use super::{EngineCapabilities, SpeakError, SpeechEngine, SpeechRequest};
use crate::voice::VoiceProfile;
use std::cell::Cell;

/// In-memory engine for tests: records calls, never emits events by itself.
#[derive(Debug, Default)]
pub(crate) struct ScriptedEngine {
    pub(crate) catalog: Vec<VoiceProfile>,
    pub(crate) supports_resume: bool,
    pub(crate) requests: Vec<SpeechRequest>,
    pub(crate) reject_texts: Vec<String>,
    pub(crate) unavailable: bool,
    pub(crate) pause_calls: usize,
    pub(crate) resume_calls: usize,
    pub(crate) cancel_calls: usize,
    pub(crate) voice_queries: Cell<usize>,
}

impl ScriptedEngine {
    pub(crate) fn with_voices(names: &[&str]) -> Self {
        Self {
            catalog: names
                .iter()
                .map(|name| VoiceProfile::new(*name, "en-US"))
                .collect(),
            supports_resume: true,
            ..Self::default()
        }
    }

    pub(crate) fn last_request(&self) -> &SpeechRequest {
        self.requests.last().expect("at least one speech request")
    }
}

impl SpeechEngine for ScriptedEngine {
    fn voices(&self) -> Vec<VoiceProfile> {
        self.voice_queries.set(self.voice_queries.get() + 1);
        self.catalog.clone()
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            supports_resume: self.supports_resume,
        }
    }

    fn speak(&mut self, request: SpeechRequest) -> Result<(), SpeakError> {
        if self.unavailable {
            return Err(SpeakError::Unavailable("synthesis unsupported".to_string()));
        }
        if self.reject_texts.iter().any(|text| *text == request.text) {
            return Err(SpeakError::Rejected(format!("cannot speak {:?}", request.text)));
        }
        self.requests.push(request);
        Ok(())
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
    }

    fn resume(&mut self) {
        self.resume_calls += 1;
    }

    fn cancel_all(&mut self) {
        self.cancel_calls += 1;
    }
}
