//! Highlight presentation: shows which unit is being spoken.
//!
//! The controller is the only source of truth for the active unit; a
//! presenter just mirrors the last notification it received.

use crate::config::AppConfig;
use crate::segmenter::NarrationUnit;
use std::io::{self, Write};
use std::ops::Range;
use tracing::warn;

pub trait HighlightPresenter {
    /// A new unit sequence replaced the previous one.
    fn on_document_changed(&mut self, _units: &[NarrationUnit]) {}

    /// The range of units now being spoken. Repeats must be harmless.
    fn on_active_unit_changed(&mut self, range: Range<usize>);

    /// No unit is active any more. Repeats must be harmless.
    fn on_cleared(&mut self);
}

/// Prints the active unit, with a little surrounding context, to a terminal.
pub struct TerminalPresenter<W: Write> {
    out: W,
    units: Vec<String>,
    shown: Option<Range<usize>>,
    context_units: usize,
    color: Option<(u8, u8, u8)>,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout(config: &AppConfig) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, config: &AppConfig) -> Self {
        Self {
            out,
            units: Vec::new(),
            shown: None,
            context_units: config.context_units,
            color: config.use_color.then(|| config.highlight_color.to_rgb8()),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, range: &Range<usize>) -> String {
        let start = range.start.min(self.units.len());
        let end = range.end.clamp(start, self.units.len().max(start));
        let before_start = start.saturating_sub(self.context_units);
        let after_end = (end + self.context_units).min(self.units.len());

        let mut parts = Vec::new();
        let before = self.units[before_start..start].join(" ");
        if !before.is_empty() {
            parts.push(before);
        }
        let active = self.units[start..end].join(" ");
        parts.push(match self.color {
            Some((r, g, b)) => format!("\x1b[48;2;{r};{g};{b}m\x1b[1m{active}\x1b[0m"),
            None => format!("[{active}]"),
        });
        let after = self.units[end..after_end].join(" ");
        if !after.is_empty() {
            parts.push(after);
        }

        format!("[{}/{}] {}", start + 1, self.units.len(), parts.join(" "))
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            warn!("Failed to write highlight: {err}");
        }
    }
}

impl<W: Write> HighlightPresenter for TerminalPresenter<W> {
    fn on_document_changed(&mut self, units: &[NarrationUnit]) {
        self.units = units.iter().map(|unit| unit.text.clone()).collect();
        self.shown = None;
    }

    fn on_active_unit_changed(&mut self, range: Range<usize>) {
        if self.shown.as_ref() == Some(&range) {
            return;
        }
        let line = self.render(&range);
        self.write_line(&line);
        self.shown = Some(range);
    }

    fn on_cleared(&mut self) {
        if self.shown.take().is_some() {
            self.write_line("--");
        }
    }
}
