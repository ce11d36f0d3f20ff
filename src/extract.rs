//! Extraction entry points.
//!
//! [`extract_nominas`] is the request path: resolve the input, load the
//! document, walk the pages, build the report. The fetch is the only async
//! I/O; loading and the page loop run together in one `spawn_blocking`
//! task because the PDF backend is synchronous and may be backed by a C
//! library.
//!
//! `Err(NominaError)` means the request as a whole failed. Page-level
//! failures never surface here; they are inside the returned report.

use crate::config::ExtractorConfig;
use crate::error::NominaError;
use crate::output::ExtractionReport;
use crate::pipeline::backend::PdfBackend;
use crate::pipeline::input::{self, ExtractRequest};
use crate::pipeline::region::RegionSet;
use crate::pipeline::{pages, report};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Run the full pipeline for one request body.
///
/// # Errors
/// - [`NominaError::InvalidInput`] when neither `pdfData` nor `pdfUrl` is set
/// - download, decode and size errors from the input stage
/// - [`NominaError::DocumentLoadFailed`] when the bytes are not a PDF
pub async fn extract_nominas(
    request: &ExtractRequest,
    backend: Arc<dyn PdfBackend>,
    config: &ExtractorConfig,
) -> Result<ExtractionReport, NominaError> {
    let start = Instant::now();

    let bytes = input::resolve_input(request, config).await?;
    debug!("Resolved {} bytes of PDF input", bytes.len());

    let report = extract_from_bytes(bytes, backend, config).await?;

    info!(
        "Request complete: {} pages in {}ms",
        report.total_paginas,
        start.elapsed().as_millis()
    );
    Ok(report)
}

/// Run the pipeline on PDF bytes already in memory.
pub async fn extract_from_bytes(
    bytes: Vec<u8>,
    backend: Arc<dyn PdfBackend>,
    config: &ExtractorConfig,
) -> Result<ExtractionReport, NominaError> {
    let regions = config.regions;

    tokio::task::spawn_blocking(move || extract_blocking(&bytes, backend.as_ref(), &regions))
        .await
        .map_err(|e| NominaError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Run the pipeline on a local PDF file.
pub async fn extract_file(
    path: impl AsRef<Path>,
    backend: Arc<dyn PdfBackend>,
    config: &ExtractorConfig,
) -> Result<ExtractionReport, NominaError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        NominaError::invalid_input(format!("No se pudo leer '{}': {}", path.display(), e))
    })?;

    if bytes.len() > config.max_body_bytes {
        return Err(NominaError::PdfTooLarge {
            size: bytes.len(),
            limit: config.max_body_bytes,
        });
    }

    extract_from_bytes(bytes, backend, config).await
}

/// Synchronous wrapper around [`extract_nominas`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    request: &ExtractRequest,
    backend: Arc<dyn PdfBackend>,
    config: &ExtractorConfig,
) -> Result<ExtractionReport, NominaError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| NominaError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_nominas(request, backend, config))
}

fn extract_blocking(
    bytes: &[u8],
    backend: &dyn PdfBackend,
    regions: &RegionSet,
) -> Result<ExtractionReport, NominaError> {
    let document = backend.open(bytes)?;
    let total_pages = document.page_count();
    info!("{} backend loaded {} pages", backend.name(), total_pages);

    let results = pages::process_pages(document.as_ref(), regions);
    Ok(report::build_report(total_pages, results))
}
