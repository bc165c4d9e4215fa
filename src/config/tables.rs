use super::defaults;
use super::models::{AppConfig, HighlightColor, LogLevel, SegmentMode};
use serde::Deserialize;

/// On-disk layout of `config.toml`; one table per concern.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    narration: NarrationConfig,
    #[serde(default)]
    voice: VoiceConfig,
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    normalizer: NormalizerConfig,
    #[serde(default)]
    presenter: PresenterConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            log_level: tables.logging.log_level,
            segment_mode: tables.narration.segment_mode,
            chunk_size: tables.narration.chunk_size,
            word_chunk_size: tables.narration.word_chunk_size,
            auto_continue: tables.narration.auto_continue,
            pause_after_unit_secs: tables.narration.pause_after_unit_secs,
            tts_rate: tables.voice.rate,
            tts_pitch: tables.voice.pitch,
            tts_volume: tables.voice.volume,
            preferred_voices: tables.voice.preferred,
            language_prefix: tables.voice.language_prefix,
            engine_program: tables.engine.program,
            normalize_unicode: tables.normalizer.unicode_nfkc,
            join_hyphenated_words: tables.normalizer.join_hyphenated_words,
            collapse_whitespace: tables.normalizer.collapse_whitespace,
            remove_space_before_punctuation: tables.normalizer.remove_space_before_punctuation,
            highlight_color: tables.presenter.highlight_color,
            context_units: tables.presenter.context_units,
            use_color: tables.presenter.use_color,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            narration: NarrationConfig {
                segment_mode: config.segment_mode,
                chunk_size: config.chunk_size,
                word_chunk_size: config.word_chunk_size,
                auto_continue: config.auto_continue,
                pause_after_unit_secs: config.pause_after_unit_secs,
            },
            voice: VoiceConfig {
                preferred: config.preferred_voices.clone(),
                language_prefix: config.language_prefix.clone(),
                rate: config.tts_rate,
                pitch: config.tts_pitch,
                volume: config.tts_volume,
            },
            engine: EngineConfig {
                program: config.engine_program.clone(),
            },
            normalizer: NormalizerConfig {
                unicode_nfkc: config.normalize_unicode,
                join_hyphenated_words: config.join_hyphenated_words,
                collapse_whitespace: config.collapse_whitespace,
                remove_space_before_punctuation: config.remove_space_before_punctuation,
            },
            presenter: PresenterConfig {
                highlight_color: config.highlight_color,
                context_units: config.context_units,
                use_color: config.use_color,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct NarrationConfig {
    #[serde(default = "defaults::default_segment_mode")]
    segment_mode: SegmentMode,
    #[serde(default = "defaults::default_chunk_size")]
    chunk_size: usize,
    #[serde(default = "defaults::default_word_chunk_size")]
    word_chunk_size: usize,
    #[serde(default = "defaults::default_auto_continue")]
    auto_continue: bool,
    #[serde(default = "defaults::default_pause_after_unit_secs")]
    pause_after_unit_secs: f32,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        NarrationConfig {
            segment_mode: defaults::default_segment_mode(),
            chunk_size: defaults::default_chunk_size(),
            word_chunk_size: defaults::default_word_chunk_size(),
            auto_continue: defaults::default_auto_continue(),
            pause_after_unit_secs: defaults::default_pause_after_unit_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct VoiceConfig {
    #[serde(default = "defaults::default_preferred_voices")]
    preferred: Vec<String>,
    #[serde(default = "defaults::default_language_prefix")]
    language_prefix: String,
    #[serde(default = "defaults::default_tts_rate")]
    rate: f32,
    #[serde(default = "defaults::default_tts_pitch")]
    pitch: f32,
    #[serde(default = "defaults::default_tts_volume")]
    volume: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        VoiceConfig {
            preferred: defaults::default_preferred_voices(),
            language_prefix: defaults::default_language_prefix(),
            rate: defaults::default_tts_rate(),
            pitch: defaults::default_tts_pitch(),
            volume: defaults::default_tts_volume(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct EngineConfig {
    #[serde(default = "defaults::default_engine_program")]
    program: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            program: defaults::default_engine_program(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct NormalizerConfig {
    #[serde(default = "defaults::default_true")]
    unicode_nfkc: bool,
    #[serde(default = "defaults::default_true")]
    join_hyphenated_words: bool,
    #[serde(default = "defaults::default_true")]
    collapse_whitespace: bool,
    #[serde(default = "defaults::default_true")]
    remove_space_before_punctuation: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            unicode_nfkc: true,
            join_hyphenated_words: true,
            collapse_whitespace: true,
            remove_space_before_punctuation: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PresenterConfig {
    #[serde(default = "defaults::default_highlight_color")]
    highlight_color: HighlightColor,
    #[serde(default = "defaults::default_context_units")]
    context_units: usize,
    #[serde(default = "defaults::default_true")]
    use_color: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        PresenterConfig {
            highlight_color: defaults::default_highlight_color(),
            context_units: defaults::default_context_units(),
            use_color: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
