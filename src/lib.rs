//! # nomina-extract
//!
//! Pull the worker name (`TRABAJADOR`) and pay period (`PERIODO`) out of
//! every page of a payroll ("nómina") PDF, served over a single HTTP
//! endpoint.
//!
//! Each page of a batch PDF is one payslip generated from the same
//! template, so both fields always sit at the same place on the page. The
//! crate reads the PDF text layer inside two fixed rectangles, cleans the
//! strings up, and returns one record per page. A page that fails is
//! recorded as an error entry; the rest of the batch still goes through.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Input      pdfUrl download or pdfData base64 decode (size-capped)
//!  ├─ 2. Load       parse the document (pdfium, spawn_blocking)
//!  ├─ 3. Regions    flip top-left rectangles into PDF space, read text
//!  ├─ 4. Normalize  trim, collapse, strip symbols, uppercase
//!  ├─ 5. Pages      one PageResult per page, failures contained
//!  └─ 6. Report     success envelope with counts
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nomina_extract::{extract_nominas, ExtractRequest, ExtractorConfig, PdfiumBackend};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(PdfiumBackend::bind(None)?);
//!     let request = ExtractRequest::from_url("https://example.com/nominas-abril.pdf");
//!
//!     let report = extract_nominas(&request, backend, &ExtractorConfig::default()).await?;
//!     for page in &report.datos {
//!         println!("{}: {:?} / {:?}", page.pagina, page.trabajador, page.periodo);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Serving
//!
//! ```rust,no_run
//! use nomina_extract::{server, AppState, ExtractorConfig, PdfiumBackend};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(Arc::new(PdfiumBackend::bind(None)?), ExtractorConfig::default());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     server::serve(listener, state).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `nomina-server` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! nomina-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractorConfig, ExtractorConfigBuilder, DEFAULT_MAX_BODY_BYTES};
pub use error::{NominaError, PageError};
pub use extract::{extract_file, extract_from_bytes, extract_nominas, extract_sync};
pub use output::{ExtractionReport, PageResult, REPORT_MESSAGE};
pub use pipeline::backend::{LoadedDocument, PageSize, PageText, PdfBackend, PdfiumBackend};
pub use pipeline::input::{ExtractRequest, MISSING_INPUT};
pub use pipeline::memory::{MemoryBackend, MemoryPage};
pub use pipeline::normalize::normalize;
pub use pipeline::region::{Region, RegionSet};
pub use server::{router, AppState, ROUTE};
