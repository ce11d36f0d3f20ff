//! Page processing: walk every page, read both regions, normalise, record.
//!
//! Each page ends in exactly one of two terminal states, success or failed,
//! and no page is retried. A failed page is logged and turned into a
//! [`PageResult`] carrying the error; the loop then moves on to the next
//! page, so one unreadable page never costs the caller the rest of the
//! batch.
//!
//! A panic inside the backend is caught at the page boundary and recorded
//! like any other page failure.
//!
//! Pages are processed strictly in document order on the calling thread:
//! `results[i].pagina == i + 1` always holds.

use crate::error::PageError;
use crate::output::PageResult;
use crate::pipeline::backend::LoadedDocument;
use crate::pipeline::normalize::normalize;
use crate::pipeline::region::{extract_region, RegionSet, PERIODO, TRABAJADOR};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Process every page of `document` with the given regions.
///
/// Always returns one result per page. Never fails: page errors are
/// contained in the returned results.
pub fn process_pages(document: &dyn LoadedDocument, regions: &RegionSet) -> Vec<PageResult> {
    let total = document.page_count();
    let mut results = Vec::with_capacity(total);

    for idx in 0..total {
        let page_num = idx + 1;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            read_fields(document, page_num, regions)
        }))
        .unwrap_or_else(|payload| {
            Err(PageError::Panicked {
                page: page_num,
                detail: panic_message(payload.as_ref()),
            })
        });

        let result = match outcome {
            Ok((trabajador, periodo)) => {
                debug!(
                    "Page {}/{}: trabajador={:?} periodo={:?}",
                    page_num, total, trabajador, periodo
                );
                PageResult::success(page_num, trabajador, periodo, *regions)
            }
            Err(e) => {
                warn!("Error procesando página {}/{}: {}", e.page(), total, e);
                PageResult::failed(page_num, &e, *regions)
            }
        };

        results.push(result);
    }

    results
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Read and normalise both fields of the 1-indexed page `page_num`.
fn read_fields(
    document: &dyn LoadedDocument,
    page_num: usize,
    regions: &RegionSet,
) -> Result<(Option<String>, Option<String>), PageError> {
    let page = document
        .page(page_num - 1)
        .map_err(|detail| PageError::PageUnavailable {
            page: page_num,
            detail,
        })?;
    let height = page.size().height;

    let trabajador = extract_region(
        page.as_ref(),
        page_num,
        TRABAJADOR,
        &regions.trabajador,
        height,
    )?;
    let periodo = extract_region(page.as_ref(), page_num, PERIODO, &regions.periodo, height)?;

    Ok((normalize(trabajador.as_deref()), normalize(periodo.as_deref())))
}
