//! Pipeline stages for payslip field extraction.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and the text engine can be replaced without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ backend ──▶ pages ──────────────────────▶ report
//! (URL/b64)  (load)     (region → normalize, per page)  (envelope)
//! ```
//!
//! 1. [`input`]     — `pdfUrl` download or `pdfData` decode, size-capped
//! 2. [`backend`]   — load the document; PDFium in production, runs inside
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`region`]    — flip top-left regions into PDF space and read text
//! 4. [`normalize`] — canonicalise extracted strings
//! 5. [`pages`]     — per-page loop with contained failures
//! 6. [`report`]    — success envelope
//!
//! [`memory`] is an in-memory backend for tests and demos.

pub mod backend;
pub mod input;
pub mod memory;
pub mod normalize;
pub mod pages;
pub mod region;
pub mod report;
