//! Error types for the nomina-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`NominaError`] — **Fatal**: the request cannot proceed at all (no
//!   input, unreachable `pdfUrl`, undecodable payload, unparseable PDF).
//!   Returned as `Err(NominaError)` from the top-level `extract*` functions
//!   and mapped to a 400 or 500 response by [`crate::server`].
//!
//! * [`PageError`] — **Non-fatal**: a single page could not be read but all
//!   other pages are fine. It is rendered into the page's
//!   [`crate::output::PageResult`] and never escalates to the request.

use axum::http::StatusCode;
use thiserror::Error;

/// All fatal errors returned by the nomina-extract library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum NominaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Neither `pdfData` nor `pdfUrl` was supplied, or the body is not the
    /// expected JSON shape.
    #[error("{reason}")]
    InvalidInput { reason: String },

    /// `pdfUrl` answered with a non-2xx status.
    #[error("Error al descargar PDF: {status}")]
    FetchFailed { url: String, status: u16 },

    /// `pdfUrl` could not be reached at all.
    #[error("Error al descargar PDF '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Tiempo de descarga agotado tras {secs}s para '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// `pdfData` is not valid base64.
    #[error("pdfData no es base64 válido: {detail}")]
    DecodeFailed { detail: String },

    /// The resolved PDF is larger than the configured ceiling.
    #[error("El PDF ocupa {size} bytes y supera el límite de {limit} bytes")]
    PdfTooLarge { size: usize, limit: usize },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The bytes are not a loadable PDF document.
    #[error("No se pudo cargar el PDF: {detail}")]
    DocumentLoadFailed { detail: String },

    /// Could not bind to a pdfium library.
    #[error("Failed to bind to pdfium library: {0}")]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NominaError {
    /// Shorthand for [`NominaError::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        NominaError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// HTTP status this error surfaces as.
    ///
    /// Only malformed input is the caller's fault; everything else that
    /// aborts the request is reported as a server-side failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            NominaError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A non-fatal error for a single page.
///
/// Rendered into the failing page's [`crate::output::PageResult`]; sibling
/// pages keep processing.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    /// The page could not be opened by the backend.
    #[error("Page {page}: could not be opened: {detail}")]
    PageUnavailable { page: usize, detail: String },

    /// Extraction of a specific region failed.
    #[error("Page {page}: region {region} failed: {detail}")]
    RegionFailed {
        page: usize,
        region: String,
        detail: String,
    },

    /// The backend panicked while reading the page.
    #[error("Page {page}: backend panicked: {detail}")]
    Panicked { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::PageUnavailable { page, .. }
            | PageError::RegionFailed { page, .. }
            | PageError::Panicked { page, .. } => *page,
        }
    }
}
