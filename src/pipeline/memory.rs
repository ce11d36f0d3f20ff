//! In-memory backend: a fixed document whose text runs are placed by hand.
//!
//! Useful for exercising the page processor and the HTTP layer without a
//! pdfium library on the machine. Text is positioned with the same
//! top-left [`Region`] convention callers use, and found again through the
//! normal coordinate flip, so lookups go through the real geometry rather
//! than matching on labels.
//!
//! ```rust
//! use nomina_extract::pipeline::memory::{MemoryBackend, MemoryPage};
//! use nomina_extract::pipeline::region::RegionSet;
//!
//! let regions = RegionSet::default();
//! let backend = MemoryBackend::new(vec![
//!     MemoryPage::a4()
//!         .with_text(regions.trabajador, "Sanchez Caballero, Antonio")
//!         .with_text(regions.periodo, "Del 01 al 30 de abril de 2025"),
//!     MemoryPage::unavailable("damaged page tree"),
//! ]);
//! # let _ = backend;
//! ```

use crate::error::NominaError;
use crate::pipeline::backend::{check_pdf_header, LoadedDocument, PageSize, PageText, PdfBackend};
use crate::pipeline::region::{PdfSpaceRect, Region};

#[derive(Debug, Clone)]
struct TextRun {
    rect: PdfSpaceRect,
    text: String,
}

/// One scripted page.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    size: PageSize,
    runs: Vec<TextRun>,
    open_error: Option<String>,
    text_error: Option<String>,
    panic_message: Option<String>,
}

impl MemoryPage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: PageSize { width, height },
            runs: Vec::new(),
            open_error: None,
            text_error: None,
            panic_message: None,
        }
    }

    /// An empty A4 portrait page (595 × 842 pt).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// A page that fails to open.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            open_error: Some(detail.into()),
            ..Self::a4()
        }
    }

    /// Place `text` inside `region` (top-left-relative coordinates).
    pub fn with_text(mut self, region: Region, text: impl Into<String>) -> Self {
        self.runs.push(TextRun {
            rect: region.to_pdf_space(self.size.height),
            text: text.into(),
        });
        self
    }

    /// Make every text lookup on this page fail.
    pub fn failing_text(mut self, detail: impl Into<String>) -> Self {
        self.text_error = Some(detail.into());
        self
    }

    /// Make every text lookup on this page panic, like a buggy backend.
    pub fn panicking(mut self, message: impl Into<String>) -> Self {
        self.panic_message = Some(message.into());
        self
    }
}

impl PageText for MemoryPage {
    fn size(&self) -> PageSize {
        self.size
    }

    fn text_in_rect(&self, rect: &PdfSpaceRect) -> Result<Option<String>, String> {
        if let Some(ref msg) = self.panic_message {
            panic!("{msg}");
        }
        if let Some(ref e) = self.text_error {
            return Err(e.clone());
        }

        let hits: Vec<&str> = self
            .runs
            .iter()
            .filter(|run| centre_inside(&run.rect, rect))
            .map(|run| run.text.as_str())
            .collect();

        if hits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(hits.join(" ")))
        }
    }
}

fn centre_inside(run: &PdfSpaceRect, query: &PdfSpaceRect) -> bool {
    let cx = (run.left + run.right) / 2.0;
    let cy = (run.bottom + run.top) / 2.0;
    cx >= query.left && cx <= query.right && cy >= query.bottom && cy <= query.top
}

/// Serves the same scripted document for any payload with a PDF header.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pages: Vec<MemoryPage>,
}

impl MemoryBackend {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }
}

impl PdfBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn LoadedDocument + 'a>, NominaError> {
        check_pdf_header(bytes)?;
        Ok(Box::new(MemoryDocument { pages: &self.pages }))
    }
}

struct MemoryDocument<'a> {
    pages: &'a [MemoryPage],
}

impl LoadedDocument for MemoryDocument<'_> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Box<dyn PageText + '_>, String> {
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| format!("page index {index} out of range"))?;
        if let Some(ref e) = page.open_error {
            return Err(e.clone());
        }
        Ok(Box::new(page.clone()))
    }
}
