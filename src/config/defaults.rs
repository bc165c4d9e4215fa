pub(crate) fn default_log_level() -> super::models::LogLevel {
    super::models::LogLevel::Debug
}

pub(crate) fn default_segment_mode() -> super::models::SegmentMode {
    super::models::SegmentMode::Sentence
}

pub(crate) fn default_chunk_size() -> usize {
    1
}

pub(crate) fn default_word_chunk_size() -> usize {
    6
}

pub(crate) fn default_auto_continue() -> bool {
    true
}

pub(crate) fn default_pause_after_unit_secs() -> f32 {
    0.2
}

pub(crate) fn default_tts_rate() -> f32 {
    0.85
}

pub(crate) fn default_tts_pitch() -> f32 {
    1.0
}

pub(crate) fn default_tts_volume() -> f32 {
    1.0
}

pub(crate) fn default_preferred_voices() -> Vec<String> {
    vec![
        "Samantha".to_string(),
        "Daniel".to_string(),
        "Karen".to_string(),
    ]
}

pub(crate) fn default_language_prefix() -> String {
    "en".to_string()
}

pub(crate) fn default_engine_program() -> String {
    "espeak-ng".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_highlight_color() -> super::models::HighlightColor {
    super::models::HighlightColor {
        r: 0.8,
        g: 0.8,
        b: 0.5,
        a: 0.2,
    }
}

pub(crate) fn default_context_units() -> usize {
    1
}
