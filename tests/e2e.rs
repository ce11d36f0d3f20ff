//! End-to-end tests against the real PDFium backend.
//!
//! The PDFs are generated in-process with text placed inside the default
//! regions, so no fixture files are needed. They do need a PDFium shared
//! library, hence the `E2E_ENABLED` gate.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use base64::{engine::general_purpose::STANDARD, Engine as _};
use nomina_extract::{
    extract_from_bytes, extract_nominas, ExtractRequest, ExtractorConfig, NominaError,
    PdfBackend, PdfiumBackend, RegionSet,
};
use std::path::PathBuf;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

const PAGE_HEIGHT: f32 = 842.0;

/// Skip this test if E2E_ENABLED is not set, otherwise bind PDFium.
macro_rules! e2e_backend_or_skip {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let lib = std::env::var("PDFIUM_LIB_PATH").ok().map(PathBuf::from);
        let backend: Arc<dyn PdfBackend> =
            Arc::new(PdfiumBackend::bind(lib.as_deref()).expect("PDFium should bind"));
        backend
    }};
}

/// One text run: baseline position in PDF space, font size, content.
struct Run<'a> {
    x: f32,
    y: f32,
    size: f32,
    text: &'a str,
}

/// Runs that land inside the default TRABAJADOR / PERIODO regions.
fn payslip_runs<'a>(worker: &'a str, period: &'a str) -> Vec<Run<'a>> {
    let r = RegionSet::default();
    vec![
        Run {
            x: r.trabajador.x1 + 4.0,
            y: PAGE_HEIGHT - r.trabajador.y2 + 2.0,
            size: 5.0,
            text: worker,
        },
        Run {
            x: r.periodo.x1 + 10.0,
            y: PAGE_HEIGHT - r.periodo.y2 + 4.0,
            size: 8.0,
            text: period,
        },
    ]
}

/// Build a minimal A4 PDF, one page per entry, Helvetica text.
fn build_pdf(pages: &[Vec<Run<'_>>]) -> Vec<u8> {
    let n = pages.len();
    // 1: catalog, 2: pages, 3: font, then (page, content) pairs.
    let page_id = |i: usize| 4 + 2 * i;
    let content_id = |i: usize| 5 + 2 * i;

    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".into());
    let kids: Vec<String> = (0..n).map(|i| format!("{} 0 R", page_id(i))).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        n
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".into());

    for (i, runs) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            content_id(i)
        ));
        let stream: String = runs
            .iter()
            .map(|r| format!("BT /F1 {} Tf {} {} Td ({}) Tj ET\n", r.size, r.x, r.y, r.text))
            .collect();
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_two_payslips_extracted_in_order() {
    let backend = e2e_backend_or_skip!();

    let pdf = build_pdf(&[
        payslip_runs("perez, ana", "abril 2024"),
        payslip_runs("lopez  ruiz, juan", "mayo 2024"),
    ]);

    let report = extract_from_bytes(pdf, backend, &ExtractorConfig::default())
        .await
        .expect("extraction should succeed");

    println!("{}", serde_json::to_string_pretty(&report).unwrap());

    assert!(report.success);
    assert_eq!(report.total_paginas, 2);
    assert_eq!(report.failed_pages(), 0);

    assert_eq!(report.datos[0].pagina, 1);
    assert_eq!(report.datos[0].trabajador.as_deref(), Some("PEREZ, ANA"));
    assert_eq!(report.datos[0].periodo.as_deref(), Some("ABRIL 2024"));

    assert_eq!(report.datos[1].pagina, 2);
    assert_eq!(report.datos[1].trabajador.as_deref(), Some("LOPEZ RUIZ, JUAN"));
    assert_eq!(report.datos[1].periodo.as_deref(), Some("MAYO 2024"));
}

#[tokio::test]
async fn test_text_outside_regions_is_ignored() {
    let backend = e2e_backend_or_skip!();

    let pdf = build_pdf(&[vec![Run {
        x: 300.0,
        y: 400.0,
        size: 12.0,
        text: "EMPRESA DEMO SL",
    }]]);

    let report = extract_from_bytes(pdf, backend, &ExtractorConfig::default())
        .await
        .unwrap();

    assert_eq!(report.total_paginas, 1);
    assert_eq!(report.datos[0].trabajador, None);
    assert_eq!(report.datos[0].periodo, None);
    assert!(report.datos[0].error.is_none());
}

#[tokio::test]
async fn test_inline_base64_request() {
    let backend = e2e_backend_or_skip!();

    let pdf = build_pdf(&[payslip_runs("sanchez, eva", "junio 2024")]);
    let request = ExtractRequest::from_base64(format!(
        "data:application/pdf;base64,{}",
        STANDARD.encode(&pdf)
    ));

    let report = extract_nominas(&request, backend, &ExtractorConfig::default())
        .await
        .unwrap();
    assert_eq!(report.datos[0].trabajador.as_deref(), Some("SANCHEZ, EVA"));
}

#[tokio::test]
async fn test_truncated_pdf_fails_to_load() {
    let backend = e2e_backend_or_skip!();

    let err = extract_from_bytes(
        b"%PDF-1.4\n1 0 obj\n<< /Type".to_vec(),
        backend,
        &ExtractorConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, NominaError::DocumentLoadFailed { .. }));
}
