//! The loaded source: its kind, per-page text and optional visual.

use crate::config::SegmentMode;
use crate::segmenter::{NarrationUnit, segment, segment_words};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Text,
    Docx,
    Image,
}

const MIME_PDF: &str = "application/pdf";
const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

impl SourceKind {
    /// Classify by MIME type when one is known, then by extension.
    pub fn detect(path: &Path, mime: Option<&str>) -> Option<SourceKind> {
        if let Some(mime) = mime.map(|m| m.trim().to_ascii_lowercase()) {
            match mime.as_str() {
                MIME_PDF => return Some(SourceKind::Pdf),
                MIME_DOCX => return Some(SourceKind::Docx),
                m if m.starts_with("text/") => return Some(SourceKind::Text),
                m if m.starts_with("image/") => return Some(SourceKind::Image),
                _ => {}
            }
        }

        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())?;
        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "docx" => Some(SourceKind::Docx),
            "txt" | "text" | "md" => Some(SourceKind::Text),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" => Some(SourceKind::Image),
            _ => None,
        }
    }

    pub fn is_paginated(self) -> bool {
        matches!(self, SourceKind::Pdf)
    }
}

/// What the visual pane would show for an image source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

#[derive(Debug, Clone)]
pub struct Document {
    source_path: PathBuf,
    kind: SourceKind,
    pages: Vec<String>,
    current_page: usize,
    visual: Option<VisualInfo>,
}

impl Document {
    /// `pages` holds normalized text; an unpaginated source has exactly one.
    pub fn new(source_path: PathBuf, kind: SourceKind, pages: Vec<String>) -> Self {
        let pages = if pages.is_empty() {
            vec![String::new()]
        } else {
            pages
        };
        Self {
            source_path,
            kind,
            pages,
            current_page: 0,
            visual: None,
        }
    }

    /// A document that loaded but has nothing to narrate.
    pub fn empty(source_path: PathBuf, kind: SourceKind) -> Self {
        Self::new(source_path, kind, Vec::new())
    }

    pub fn with_visual(mut self, visual: VisualInfo) -> Self {
        self.visual = Some(visual);
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn visual(&self) -> Option<&VisualInfo> {
        self.visual.as_ref()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Zero-based index of the page on screen.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page + 1 < self.pages.len()
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 0
    }

    /// Move to `page`. Returns false (and stays put) when out of range.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page >= self.pages.len() {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn page_text(&self, page: usize) -> Option<&str> {
        self.pages.get(page).map(String::as_str)
    }

    pub fn current_text(&self) -> &str {
        self.page_text(self.current_page).unwrap_or_default()
    }

    /// Units of the current page. Re-segmenting the same page yields the same indices.
    pub fn units(&self, mode: SegmentMode) -> Vec<NarrationUnit> {
        units_for(self.current_text(), mode)
    }

    /// First page at or after `from` whose text yields any unit.
    pub fn next_narratable_page(&self, from: usize, mode: SegmentMode) -> Option<usize> {
        (from..self.pages.len()).find(|&page| !units_for(&self.pages[page], mode).is_empty())
    }

    pub fn page_label(&self) -> String {
        match self.kind {
            SourceKind::Pdf => format!("Page {} / {}", self.current_page + 1, self.pages.len()),
            SourceKind::Text => "Text File".to_string(),
            SourceKind::Docx => "DOCX File".to_string(),
            SourceKind::Image => "Image".to_string(),
        }
    }
}

fn units_for(text: &str, mode: SegmentMode) -> Vec<NarrationUnit> {
    match mode {
        SegmentMode::Sentence => segment(text),
        SegmentMode::Word => segment_words(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_wins_over_extension() {
        assert_eq!(
            SourceKind::detect(Path::new("scan.bin"), Some("application/pdf")),
            Some(SourceKind::Pdf)
        );
        assert_eq!(
            SourceKind::detect(Path::new("notes.pdf"), Some("text/plain")),
            Some(SourceKind::Text)
        );
        assert_eq!(
            SourceKind::detect(Path::new("photo"), Some("image/png")),
            Some(SourceKind::Image)
        );
    }

    #[test]
    fn extension_fallback_is_case_insensitive() {
        assert_eq!(SourceKind::detect(Path::new("a.PDF"), None), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::detect(Path::new("a.docx"), None), Some(SourceKind::Docx));
        assert_eq!(SourceKind::detect(Path::new("a.md"), None), Some(SourceKind::Text));
        assert_eq!(SourceKind::detect(Path::new("a.JPEG"), None), Some(SourceKind::Image));
        assert_eq!(
            SourceKind::detect(Path::new("a.xyz"), Some("application/octet-stream")),
            None
        );
        assert_eq!(SourceKind::detect(Path::new("README"), None), None);
    }

    #[test]
    fn page_navigation_stays_in_bounds() {
        let mut doc = Document::new(
            PathBuf::from("book.pdf"),
            SourceKind::Pdf,
            vec!["One.".into(), "Two. Three.".into()],
        );
        assert_eq!(doc.page_label(), "Page 1 / 2");
        assert!(doc.has_next_page());
        assert!(!doc.set_page(2));
        assert!(doc.set_page(1));
        assert_eq!(doc.page_label(), "Page 2 / 2");
        assert_eq!(doc.units(SegmentMode::Sentence).len(), 2);
        assert!(!doc.has_next_page());
        assert!(doc.has_prev_page());
    }

    #[test]
    fn empty_document_has_one_blank_page() {
        let doc = Document::empty(PathBuf::from("broken.docx"), SourceKind::Docx);
        assert_eq!(doc.page_count(), 1);
        assert!(doc.units(SegmentMode::Sentence).is_empty());
        assert_eq!(doc.page_label(), "DOCX File");
    }

    #[test]
    fn next_narratable_page_skips_blank_pages() {
        let doc = Document::new(
            PathBuf::from("book.pdf"),
            SourceKind::Pdf,
            vec!["One.".into(), "   ".into(), "Three.".into()],
        );
        assert_eq!(doc.next_narratable_page(1, SegmentMode::Sentence), Some(2));
        assert_eq!(doc.next_narratable_page(3, SegmentMode::Sentence), None);
    }
}
