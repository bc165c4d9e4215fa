//! Document ingestion adapters.
//!
//! Each format gets a small extraction function that returns plain text (one
//! entry per page for PDF). Failures never escape as errors: the reader gets
//! back an empty document plus the [`ReaderError`] to show, so a broken file
//! simply leaves nothing to narrate.

use crate::cancellation::CancellationToken;
use crate::document::{Document, SourceKind, VisualInfo};
use crate::error::ReaderError;
use crate::normalizer::TextNormalizer;
use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Largest `word/document.xml` we are willing to inflate.
const MAX_XML_ENTRY_BYTES: u64 = 32 * 1024 * 1024;
const DOCX_BODY: &str = "word/document.xml";

/// Result of a load: always a document, plus anything worth telling the user.
#[derive(Debug)]
pub struct LoadedDocument {
    pub document: Document,
    pub warning: Option<ReaderError>,
}

/// Read and extract `path`. Unknown types are read as plain text.
pub fn load_document(
    path: &Path,
    mime: Option<&str>,
    normalizer: &TextNormalizer,
    cancel: &CancellationToken,
) -> LoadedDocument {
    let (kind, mut warning) = match SourceKind::detect(path, mime) {
        Some(kind) => (kind, None),
        None => {
            warn!(
                path = %path.display(),
                "Unrecognised file type; attempting plain-text read"
            );
            (
                SourceKind::Text,
                Some(ReaderError::UnsupportedFile {
                    path: path.to_path_buf(),
                }),
            )
        }
    };

    info!(path = %path.display(), ?kind, "Loading document");
    match read_document(path, kind, normalizer, cancel) {
        Ok(document) => {
            info!(
                path = %path.display(),
                pages = document.page_count(),
                "Finished loading document"
            );
            LoadedDocument { document, warning }
        }
        Err(err) => {
            warn!(path = %path.display(), "Document decode failed: {err:#}");
            if warning.is_none() {
                warning = Some(ReaderError::DecodeFailure {
                    path: path.to_path_buf(),
                    reason: format!("{err:#}"),
                });
            }
            LoadedDocument {
                document: Document::empty(path.to_path_buf(), kind),
                warning,
            }
        }
    }
}

fn read_document(
    path: &Path,
    kind: SourceKind,
    normalizer: &TextNormalizer,
    cancel: &CancellationToken,
) -> Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    cancel.check_cancelled("read")?;

    let document = match kind {
        SourceKind::Image => {
            let visual = render_page_visual(&bytes)?;
            debug!(width = visual.width, height = visual.height, "Decoded image header");
            Document::empty(path.to_path_buf(), kind).with_visual(visual)
        }
        SourceKind::Pdf => {
            let raw_pages = extract_pdf_pages(&bytes)?;
            let mut pages = Vec::with_capacity(raw_pages.len());
            for (idx, raw) in raw_pages.iter().enumerate() {
                cancel.check_cancelled("pdf-page")?;
                pages.push(normalizer.normalize(raw));
                debug!(page = idx + 1, chars = raw.len(), "Extracted PDF page");
            }
            Document::new(path.to_path_buf(), kind, pages)
        }
        SourceKind::Text | SourceKind::Docx => {
            let text = extract_whole_document_text(kind, &bytes)?;
            Document::new(path.to_path_buf(), kind, vec![normalizer.normalize(&text)])
        }
    };
    Ok(document)
}

/// Text of one page of a loaded document (zero-based).
pub fn extract_page_text(document: &Document, page: usize) -> Option<&str> {
    document.page_text(page)
}

/// Whole-file text for any source kind; pages are separated by blank lines.
pub fn extract_whole_document_text(kind: SourceKind, bytes: &[u8]) -> Result<String> {
    match kind {
        SourceKind::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
        SourceKind::Pdf => Ok(extract_pdf_pages(bytes)?.join("\n\n")),
        SourceKind::Docx => extract_docx(bytes),
        SourceKind::Image => Ok(String::new()),
    }
}

/// Dimensions and format of an image, from its header only.
pub fn render_page_visual(bytes: &[u8]) -> Result<VisualInfo> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to sniff image format")?;
    let format = reader
        .format()
        .map(|format| format!("{format:?}").to_ascii_lowercase())
        .ok_or_else(|| anyhow!("Unrecognised image format"))?;
    let (width, height) = reader
        .into_dimensions()
        .context("Failed to decode image header")?;
    Ok(VisualInfo {
        width,
        height,
        format,
    })
}

fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|err| anyhow!("PDF extraction failed: {err}"))
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("DOCX is not a zip archive")?;
    let entry = archive
        .by_name(DOCX_BODY)
        .with_context(|| format!("{DOCX_BODY} not found"))?;
    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .with_context(|| format!("Failed to inflate {DOCX_BODY}"))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        bail!("{DOCX_BODY} exceeds size limit ({MAX_XML_ENTRY_BYTES} bytes)");
    }
    extract_w_t_runs(&xml)
}

/// Concatenate `<w:t>` runs; each `</w:p>` ends a paragraph.
fn extract_w_t_runs(xml: &[u8]) -> Result<String> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().context("Invalid text run in document.xml")?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => out.push(' '),
            Ok(Event::Eof) => break,
            Err(err) => bail!("Malformed document.xml at {}: {err}", reader.buffer_position()),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}
