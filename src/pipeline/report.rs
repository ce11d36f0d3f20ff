//! Response building: fold page results into the success envelope.
//!
//! Page failures are already embedded in their [`PageResult`]s, so the
//! report is always a success. Request-level failures never reach this
//! module; they are rendered by [`crate::server`].

use crate::output::{ExtractionReport, PageResult, REPORT_MESSAGE};
use tracing::info;

/// Assemble the report for a document of `total_pages` pages.
pub fn build_report(total_pages: usize, pages: Vec<PageResult>) -> ExtractionReport {
    let failed = pages.iter().filter(|p| p.is_error()).count();
    info!(
        "Extraction complete: {}/{} pages ok, {} failed",
        pages.len() - failed,
        total_pages,
        failed
    );

    ExtractionReport {
        success: true,
        total_paginas: total_pages,
        nominas_procesadas: pages.len(),
        datos: pages,
        mensaje: REPORT_MESSAGE.to_string(),
    }
}
