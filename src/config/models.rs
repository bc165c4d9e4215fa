use serde::Deserialize;

/// Lower bound for the speech rate multiplier.
pub const MIN_TTS_RATE: f32 = 0.1;
/// Upper bound for the speech rate multiplier.
pub const MAX_TTS_RATE: f32 = 4.0;
/// Upper bound for pitch (1.0 is the engine's natural pitch).
pub const MAX_TTS_PITCH: f32 = 2.0;
/// Upper bound for volume (1.0 is the engine's natural volume).
pub const MAX_TTS_VOLUME: f32 = 2.0;
/// Cap on the artificial gap between consecutive speech requests.
pub const MAX_PAUSE_AFTER_UNIT_SECS: f32 = 2.0;
/// Largest number of units grouped into one speech request.
pub const MAX_CHUNK_SIZE: usize = 64;

/// High-level app configuration, flattened from the sectioned TOML layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub segment_mode: SegmentMode,
    pub chunk_size: usize,
    pub word_chunk_size: usize,
    pub auto_continue: bool,
    pub pause_after_unit_secs: f32,
    pub tts_rate: f32,
    pub tts_pitch: f32,
    pub tts_volume: f32,
    pub preferred_voices: Vec<String>,
    pub language_prefix: String,
    pub engine_program: String,
    pub normalize_unicode: bool,
    pub join_hyphenated_words: bool,
    pub collapse_whitespace: bool,
    pub remove_space_before_punctuation: bool,
    pub highlight_color: HighlightColor,
    pub context_units: usize,
    pub use_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: crate::config::defaults::default_log_level(),
            segment_mode: crate::config::defaults::default_segment_mode(),
            chunk_size: crate::config::defaults::default_chunk_size(),
            word_chunk_size: crate::config::defaults::default_word_chunk_size(),
            auto_continue: crate::config::defaults::default_auto_continue(),
            pause_after_unit_secs: crate::config::defaults::default_pause_after_unit_secs(),
            tts_rate: crate::config::defaults::default_tts_rate(),
            tts_pitch: crate::config::defaults::default_tts_pitch(),
            tts_volume: crate::config::defaults::default_tts_volume(),
            preferred_voices: crate::config::defaults::default_preferred_voices(),
            language_prefix: crate::config::defaults::default_language_prefix(),
            engine_program: crate::config::defaults::default_engine_program(),
            normalize_unicode: true,
            join_hyphenated_words: true,
            collapse_whitespace: true,
            remove_space_before_punctuation: true,
            highlight_color: crate::config::defaults::default_highlight_color(),
            context_units: crate::config::defaults::default_context_units(),
            use_color: true,
        }
    }
}

impl AppConfig {
    /// Keep runtime values in bounds regardless of where they came from.
    pub fn clamped(mut self) -> Self {
        self.chunk_size = self.chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self.word_chunk_size = self.word_chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self.pause_after_unit_secs = self
            .pause_after_unit_secs
            .clamp(0.0, MAX_PAUSE_AFTER_UNIT_SECS);
        self.tts_rate = self.tts_rate.clamp(MIN_TTS_RATE, MAX_TTS_RATE);
        self.tts_pitch = self.tts_pitch.clamp(0.0, MAX_TTS_PITCH);
        self.tts_volume = self.tts_volume.clamp(0.0, MAX_TTS_VOLUME);
        self.highlight_color = HighlightColor {
            r: self.highlight_color.r.clamp(0.0, 1.0),
            g: self.highlight_color.g.clamp(0.0, 1.0),
            b: self.highlight_color.b.clamp(0.0, 1.0),
            a: self.highlight_color.a.clamp(0.0, 1.0),
        };
        self
    }

    /// Number of units grouped into one speech request for the active mode.
    pub fn effective_chunk_size(&self) -> usize {
        match self.segment_mode {
            SegmentMode::Sentence => self.chunk_size,
            SegmentMode::Word => self.word_chunk_size,
        }
    }
}

/// How extracted text is cut into narration units.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentMode {
    #[default]
    Sentence,
    Word,
}

impl std::fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SegmentMode::Sentence => "sentence",
            SegmentMode::Word => "word",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl HighlightColor {
    /// 8-bit RGB triple, with alpha blended over a black background.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let blend = |channel: f32| {
            let alpha = self.a.clamp(0.0, 1.0).max(0.35);
            (channel.clamp(0.0, 1.0) * alpha * 255.0).round() as u8
        };
        (blend(self.r), blend(self.g), blend(self.b))
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
