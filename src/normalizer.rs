//! Cleanup pass applied to extracted text before segmentation.
//!
//! PDF text in particular arrives with hard line breaks, hyphenated words and
//! compatibility glyphs (ligatures, full-width forms). Every step is pure, so a
//! page normalizes identically on every re-render.

use crate::config::AppConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static RE_HYPHENATED_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-[ \t]*\r?\n[ \t]*(\p{Ll})").unwrap());
static RE_ANY_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([,.;:!?])").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNormalizer {
    unicode_nfkc: bool,
    join_hyphenated_words: bool,
    collapse_whitespace: bool,
    remove_space_before_punctuation: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            unicode_nfkc: true,
            join_hyphenated_words: true,
            collapse_whitespace: true,
            remove_space_before_punctuation: true,
        }
    }
}

impl TextNormalizer {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            unicode_nfkc: config.normalize_unicode,
            join_hyphenated_words: config.join_hyphenated_words,
            collapse_whitespace: config.collapse_whitespace,
            remove_space_before_punctuation: config.remove_space_before_punctuation,
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            unicode_nfkc: false,
            join_hyphenated_words: false,
            collapse_whitespace: false,
            remove_space_before_punctuation: false,
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut out = if self.unicode_nfkc {
            text.nfkc().collect::<String>()
        } else {
            text.to_string()
        };
        if self.join_hyphenated_words {
            out = RE_HYPHENATED_BREAK.replace_all(&out, "$1$2").into_owned();
        }
        if self.collapse_whitespace {
            out = RE_ANY_WS.replace_all(&out, " ").into_owned();
        }
        if self.remove_space_before_punctuation {
            out = RE_SPACE_BEFORE_PUNCT.replace_all(&out, "$1").into_owned();
        }
        out.trim().to_string()
    }
}
