//! PDF backends: load a document from bytes and read text inside rectangles.
//!
//! The page processor only ever talks to the three traits here, so the
//! text engine can be swapped (PDFium today; OCR or a layout model later)
//! without touching the per-page loop. [`PdfiumBackend`] is the production
//! implementation.
//!
//! ## Why one blocking call per request?
//!
//! pdfium is a C++ library with internal global state. Loading the document
//! and walking its pages happen together inside `spawn_blocking` (see
//! [`crate::extract`]), which is why these traits are synchronous and the
//! loaded document borrows the request's byte buffer.

use crate::error::NominaError;
use crate::pipeline::region::PdfSpaceRect;
use pdfium_render::prelude::{PdfDocument, PdfPage, PdfRect, Pdfium};
use std::path::Path;
use tracing::{debug, info};

/// Width and height of a page in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Something that can turn raw bytes into a paged document.
pub trait PdfBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Parse `bytes` into a document. Fails with
    /// [`NominaError::DocumentLoadFailed`] when the bytes are not a PDF.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn LoadedDocument + 'a>, NominaError>;
}

/// A parsed document, valid for the duration of one request.
pub trait LoadedDocument {
    fn page_count(&self) -> usize;

    /// Open the page at 0-based `index`. The error is a backend message.
    fn page(&self, index: usize) -> Result<Box<dyn PageText + '_>, String>;
}

/// One page of a [`LoadedDocument`].
pub trait PageText {
    fn size(&self) -> PageSize;

    /// Text inside `rect` (PDF space), or `None` when the area is empty.
    fn text_in_rect(&self, rect: &PdfSpaceRect) -> Result<Option<String>, String>;
}

/// Reject payloads that carry no `%PDF` header near the start.
///
/// The PDF format tolerates leading junk, so the marker is searched for in
/// the first KiB rather than required at offset zero.
pub fn check_pdf_header(bytes: &[u8]) -> Result<(), NominaError> {
    let window = &bytes[..bytes.len().min(1024)];
    if window.windows(4).any(|w| w == b"%PDF") {
        return Ok(());
    }

    let magic: Vec<u8> = bytes.iter().take(4).copied().collect();
    Err(NominaError::DocumentLoadFailed {
        detail: format!("not a PDF (first bytes: {magic:?})"),
    })
}

// ── PDFium ───────────────────────────────────────────────────────────────

/// Text extraction through pdfium's text layer.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Bind to libpdfium. Blocking: call before the server starts accepting
    /// requests.
    ///
    /// `lib_path` may name the library file itself or the directory holding
    /// it. Without it: `./`, then the system library path.
    pub fn bind(lib_path: Option<&Path>) -> Result<Self, NominaError> {
        let bindings = match lib_path {
            Some(path) if path.is_file() => Pdfium::bind_to_library(path),
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| NominaError::PdfiumBindingFailed(format!("{:?}", e)))?;

        info!("PDFium bound");
        Ok(Self::new(Pdfium::new(bindings)))
    }
}

impl PdfBackend for PdfiumBackend {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn LoadedDocument + 'a>, NominaError> {
        check_pdf_header(bytes)?;

        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| NominaError::DocumentLoadFailed {
                detail: format!("{:?}", e),
            })?;

        info!("PDF loaded: {} pages", document.pages().len());
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl LoadedDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, index: usize) -> Result<Box<dyn PageText + '_>, String> {
        let idx = u16::try_from(index).map_err(|_| format!("page index {index} out of range"))?;
        let page = self
            .document
            .pages()
            .get(idx)
            .map_err(|e| format!("{:?}", e))?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

struct PdfiumPage<'a> {
    page: PdfPage<'a>,
}

impl PageText for PdfiumPage<'_> {
    fn size(&self) -> PageSize {
        PageSize {
            width: self.page.width().value,
            height: self.page.height().value,
        }
    }

    fn text_in_rect(&self, rect: &PdfSpaceRect) -> Result<Option<String>, String> {
        let text = self.page.text().map_err(|e| format!("{:?}", e))?;
        let found = text.inside_rect(PdfRect::new_from_values(
            rect.bottom,
            rect.left,
            rect.top,
            rect.right,
        ));
        debug!("pdfium returned {} chars", found.len());

        if found.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(found))
        }
    }
}
