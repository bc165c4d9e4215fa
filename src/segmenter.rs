//! Text splitting into narration units.
//!
//! Both splitters are pure: the same input always yields the same sequence, so
//! re-segmenting a page never shifts indices a live highlight refers to.

use serde::Serialize;

/// Granularity of a [`NarrationUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Sentence,
    Word,
}

/// One speakable segment with a stable, gap-free index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrationUnit {
    pub index: usize,
    pub text: String,
    pub kind: UnitKind,
}

/// Split text into sentences, keeping each terminator run with the text before it.
///
/// A run of `.`, `!` or `?` (plus any closing quotes or brackets right after
/// it) ends a sentence when it is followed by whitespace or the end of input,
/// so `"3.14"` and `"?!"` never produce a break inside the token.
pub fn segment(raw: &str) -> Vec<NarrationUnit> {
    let mut units = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if !is_terminator(ch) {
            continue;
        }
        while let Some(&next) = chars.peek() {
            if is_terminator(next) || is_closing(next) {
                current.push(next);
                chars.next();
            } else {
                break;
            }
        }
        let at_boundary = chars.peek().is_none_or(|next| next.is_whitespace());
        if at_boundary {
            push_unit(&mut units, &current, UnitKind::Sentence);
            current.clear();
        }
    }
    push_unit(&mut units, &current, UnitKind::Sentence);
    units
}

/// Split text on whitespace into single-word units.
pub fn segment_words(raw: &str) -> Vec<NarrationUnit> {
    let mut units = Vec::new();
    for word in raw.split_whitespace() {
        push_unit(&mut units, word, UnitKind::Word);
    }
    units
}

/// Rejoin units with single spaces, the segmenter's view of the source text.
pub fn join_units(units: &[NarrationUnit]) -> String {
    units
        .iter()
        .map(|unit| unit.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_unit(units: &mut Vec<NarrationUnit>, candidate: &str, kind: UnitKind) {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return;
    }
    units.push(NarrationUnit {
        index: units.len(),
        text: trimmed.to_string(),
        kind,
    });
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn is_closing(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}
