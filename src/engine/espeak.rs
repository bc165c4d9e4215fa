//! Speech backend that drives an `espeak-ng` compatible program.
//!
//! One child process per request. A watcher thread waits on the child and
//! reports through the event sink; cancelling the request's token kills the
//! child and suppresses its events. The program cannot suspend mid-utterance,
//! so `pause` drops the current child and the controller re-issues the unit on
//! resume.

use super::{
    EngineCapabilities, EngineEvent, EventSink, SpeakError, SpeechEngine, SpeechRequest,
    UtteranceId,
};
use crate::cancellation::CancellationToken;
use crate::voice::VoiceProfile;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const BASE_WPM: f32 = 175.0;
const MIN_WPM: f32 = 80.0;
const MAX_WPM: f32 = 450.0;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct ActiveUtterance {
    utterance: UtteranceId,
    token: CancellationToken,
}

pub struct EspeakEngine {
    program: String,
    sink: EventSink,
    epoch: CancellationToken,
    current: Option<ActiveUtterance>,
}

impl EspeakEngine {
    pub fn new(program: impl Into<String>, sink: EventSink) -> Self {
        let program = program.into();
        info!(%program, "Initializing speech engine");
        Self {
            program,
            sink,
            epoch: CancellationToken::new(),
            current: None,
        }
    }

    fn spawn_child(&self, request: &SpeechRequest) -> Result<Child, SpeakError> {
        let mut command = Command::new(&self.program);
        if let Some(voice) = &request.voice {
            command.arg("-v").arg(&voice.language);
        }
        command
            .arg("-s")
            .arg(rate_to_wpm(request.rate).to_string())
            .arg("-p")
            .arg(pitch_to_espeak(request.pitch).to_string())
            .arg("-a")
            .arg(volume_to_amplitude(request.volume).to_string())
            .arg("--")
            .arg(&request.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command.spawn().map_err(|err| match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                SpeakError::Unavailable(format!("{}: {err}", self.program))
            }
            _ => SpeakError::Rejected(err.to_string()),
        })
    }
}

impl SpeechEngine for EspeakEngine {
    fn voices(&self) -> Vec<VoiceProfile> {
        match Command::new(&self.program).arg("--voices").output() {
            Ok(output) if output.status.success() => {
                let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
                debug!(count = voices.len(), "Queried voice catalog");
                voices
            }
            Ok(output) => {
                warn!(
                    program = %self.program,
                    status = %output.status,
                    "Voice listing failed"
                );
                Vec::new()
            }
            Err(err) => {
                warn!(program = %self.program, "Could not run speech program: {err}");
                Vec::new()
            }
        }
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            supports_resume: false,
        }
    }

    fn speak(&mut self, request: SpeechRequest) -> Result<(), SpeakError> {
        if let Some(previous) = self.current.take() {
            previous.token.cancel();
        }
        let token = self.epoch.child();
        let utterance = request.utterance;

        // The watcher exists before the process so a spawned child is never unsupervised.
        let (child_tx, child_rx) = mpsc::channel::<Child>();
        let sink = self.sink.clone();
        let watcher_token = token.clone();
        let trailing_pause = request.trailing_pause;
        thread::Builder::new()
            .name(format!("speech-{}", utterance.seq))
            .spawn(move || {
                if let Ok(child) = child_rx.recv() {
                    watch_child(child, utterance, watcher_token, trailing_pause, sink);
                }
            })
            .map_err(|err| SpeakError::Rejected(format!("spawning watcher thread: {err}")))?;

        let child = self.spawn_child(&request)?;
        if let Err(mpsc::SendError(mut child)) = child_tx.send(child) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SpeakError::Rejected(
                "speech watcher exited before the process started".to_string(),
            ));
        }
        debug!(
            session = %utterance.session,
            seq = utterance.seq,
            first_unit = utterance.first_unit,
            chars = request.text.len(),
            "Spawned speech process"
        );

        self.current = Some(ActiveUtterance { utterance, token });
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(current) = self.current.take() {
            debug!(seq = current.utterance.seq, "Dropping utterance for pause");
            current.token.cancel();
        }
    }

    fn resume(&mut self) {}

    fn cancel_all(&mut self) {
        self.epoch.cancel();
        self.epoch = CancellationToken::new();
        self.current = None;
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        self.epoch.cancel();
    }
}

fn watch_child(
    mut child: Child,
    utterance: UtteranceId,
    token: CancellationToken,
    trailing_pause: Duration,
    sink: EventSink,
) {
    sink(EngineEvent::started(utterance));
    let status = loop {
        if token.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            debug!(seq = utterance.seq, "Speech process cancelled");
            return;
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                sink(EngineEvent::failed(utterance, err.to_string()));
                return;
            }
        }
    };

    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        let reason = if stderr.trim().is_empty() {
            format!("speech process exited with {status}")
        } else {
            stderr.trim().to_string()
        };
        if !token.is_cancelled() {
            sink(EngineEvent::failed(utterance, reason));
        }
        return;
    }

    let deadline = Instant::now() + trailing_pause;
    while Instant::now() < deadline {
        if token.is_cancelled() {
            return;
        }
        thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
    }
    if !token.is_cancelled() {
        sink(EngineEvent::finished(utterance));
    }
}

/// Parse `espeak-ng --voices` output.
///
/// Columns are `Pty Language Age/Gender VoiceName File [Other Languages]`;
/// voice names use `_` for spaces.
pub fn parse_voice_list(output: &str) -> Vec<VoiceProfile> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 4 {
                return None;
            }
            Some(VoiceProfile::new(columns[3].replace('_', " "), columns[1]))
        })
        .collect()
}

fn rate_to_wpm(rate: f32) -> u32 {
    (BASE_WPM * rate).round().clamp(MIN_WPM, MAX_WPM) as u32
}

fn pitch_to_espeak(pitch: f32) -> u32 {
    ((pitch / 2.0) * 99.0).round().clamp(0.0, 99.0) as u32
}

fn volume_to_amplitude(volume: f32) -> u32 {
    (volume * 100.0).round().clamp(0.0, 200.0) as u32
}
