//! Named extraction regions and the top-left → PDF-space coordinate flip.
//!
//! Regions are written the way a person reads a page: `y` grows downwards
//! from the top edge. PDF user space grows upwards from the bottom-left
//! corner, so the vertical bounds must be mirrored against the page height
//! before the backend is asked for text.

use crate::error::PageError;
use crate::pipeline::backend::PageText;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Label of the worker-name region.
pub const TRABAJADOR: &str = "TRABAJADOR";
/// Label of the pay-period region.
pub const PERIODO: &str = "PERIODO";

/// A rectangle in page points, top-left-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Region {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Mirror the vertical bounds into PDF space (origin bottom-left).
    ///
    /// `pdf_y1 = page_height - y2` and `pdf_y2 = page_height - y1`; the
    /// horizontal bounds are unchanged.
    pub fn to_pdf_space(&self, page_height: f32) -> PdfSpaceRect {
        PdfSpaceRect {
            left: self.x1,
            bottom: page_height - self.y2,
            right: self.x2,
            top: page_height - self.y1,
        }
    }

    /// `true` when both spans are non-empty and every bound is finite.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x1 < self.x2
            && self.y1 < self.y2
    }
}

/// A rectangle in PDF user space, ready to hand to a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfSpaceRect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

/// The two regions read from every page.
///
/// Serialises as `{"TRABAJADOR": {...}, "PERIODO": {...}}` so it can be
/// echoed back verbatim in each page result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSet {
    #[serde(rename = "TRABAJADOR")]
    pub trabajador: Region,
    #[serde(rename = "PERIODO")]
    pub periodo: Region,
}

impl Default for RegionSet {
    /// Placeholder coordinates; calibrate against a real payslip layout.
    fn default() -> Self {
        Self {
            trabajador: Region::new(29.0, 650.0, 154.0, 658.0),
            periodo: Region::new(50.0, 100.0, 400.0, 115.0),
        }
    }
}

/// Read the text inside `region` on `page`.
///
/// Returns `Ok(None)` when the area holds no recoverable text, so an empty
/// region never fails the page. Backend errors are tagged with the region
/// label before being returned.
pub fn extract_region(
    page: &dyn PageText,
    page_num: usize,
    label: &str,
    region: &Region,
    page_height: f32,
) -> Result<Option<String>, PageError> {
    let rect = region.to_pdf_space(page_height);
    debug!(
        "Page {}: reading {} at l={} b={} r={} t={}",
        page_num, label, rect.left, rect.bottom, rect.right, rect.top
    );

    let text = page
        .text_in_rect(&rect)
        .map_err(|detail| PageError::RegionFailed {
            page: page_num,
            region: label.to_string(),
            detail,
        })?;

    Ok(text.filter(|t| !t.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::backend::PageSize;
    use std::cell::RefCell;

    struct RecordingPage {
        seen: RefCell<Vec<PdfSpaceRect>>,
        reply: Result<Option<String>, String>,
    }

    impl PageText for RecordingPage {
        fn size(&self) -> PageSize {
            PageSize {
                width: 595.0,
                height: 842.0,
            }
        }

        fn text_in_rect(&self, rect: &PdfSpaceRect) -> Result<Option<String>, String> {
            self.seen.borrow_mut().push(*rect);
            self.reply.clone()
        }
    }

    #[test]
    fn flip_mirrors_vertical_bounds() {
        let rect = Region::new(29.0, 650.0, 154.0, 658.0).to_pdf_space(842.0);
        assert_eq!(
            rect,
            PdfSpaceRect {
                left: 29.0,
                bottom: 184.0,
                right: 154.0,
                top: 192.0,
            }
        );
    }

    #[test]
    fn flip_keeps_bottom_below_top() {
        let r = Region::new(50.0, 100.0, 400.0, 115.0);
        let rect = r.to_pdf_space(792.0);
        assert!(rect.bottom < rect.top);
        assert_eq!(rect.top - rect.bottom, r.y2 - r.y1);
    }

    #[test]
    fn well_formed_checks() {
        assert!(Region::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Region::new(5.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Region::new(0.0, 3.0, 1.0, 3.0).is_well_formed());
        assert!(!Region::new(0.0, f32::NAN, 1.0, 3.0).is_well_formed());
        assert!(RegionSet::default().trabajador.is_well_formed());
        assert!(RegionSet::default().periodo.is_well_formed());
    }

    #[test]
    fn region_set_serialises_with_upper_case_labels() {
        let json = serde_json::to_value(RegionSet::default()).unwrap();
        assert_eq!(json["TRABAJADOR"]["x1"], 29.0);
        assert_eq!(json["PERIODO"]["y2"], 115.0);
    }

    #[test]
    fn extract_region_passes_flipped_rect() {
        let page = RecordingPage {
            seen: RefCell::new(Vec::new()),
            reply: Ok(Some("ANTONIO".into())),
        };
        let region = Region::new(29.0, 650.0, 154.0, 658.0);
        let text = extract_region(&page, 1, TRABAJADOR, &region, 842.0).unwrap();
        assert_eq!(text.as_deref(), Some("ANTONIO"));
        assert_eq!(page.seen.borrow()[0].bottom, 184.0);
    }

    #[test]
    fn blank_text_is_not_found() {
        let page = RecordingPage {
            seen: RefCell::new(Vec::new()),
            reply: Ok(Some("   \n".into())),
        };
        let text = extract_region(&page, 1, PERIODO, &RegionSet::default().periodo, 842.0);
        assert_eq!(text.unwrap(), None);
    }

    #[test]
    fn backend_failure_is_tagged_with_region() {
        let page = RecordingPage {
            seen: RefCell::new(Vec::new()),
            reply: Err("font decode".into()),
        };
        let err = extract_region(&page, 4, PERIODO, &RegionSet::default().periodo, 842.0)
            .unwrap_err();
        match err {
            PageError::RegionFailed {
                page,
                region,
                detail,
            } => {
                assert_eq!(page, 4);
                assert_eq!(region, PERIODO);
                assert_eq!(detail, "font decode");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
