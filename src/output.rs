//! Output types: one [`PageResult`] per page and the [`ExtractionReport`]
//! envelope returned to the caller.
//!
//! Field names are the wire names the endpoint's consumers already rely on,
//! so they are kept in Spanish.

use crate::error::PageError;
use crate::pipeline::region::RegionSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message attached to every successful report.
pub const REPORT_MESSAGE: &str = "Extracción completada exitosamente";

/// Outcome of one page: extracted fields, or a contained error.
///
/// Build through [`PageResult::success`] or [`PageResult::failed`]; the
/// latter guarantees both fields are `None` whenever `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub pagina: usize,
    pub trabajador: Option<String>,
    pub periodo: Option<String>,
    pub coordenadas_usadas: RegionSet,
    pub fecha_extraccion: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn success(
        pagina: usize,
        trabajador: Option<String>,
        periodo: Option<String>,
        regions: RegionSet,
    ) -> Self {
        Self {
            pagina,
            trabajador,
            periodo,
            coordenadas_usadas: regions,
            fecha_extraccion: Utc::now(),
            error: None,
        }
    }

    pub fn failed(pagina: usize, error: &PageError, regions: RegionSet) -> Self {
        Self {
            pagina,
            trabajador: None,
            periodo: None,
            coordenadas_usadas: regions,
            fecha_extraccion: Utc::now(),
            error: Some(format!("Error en página: {error}")),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Success envelope for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub success: bool,
    /// Pages in the document.
    pub total_paginas: usize,
    /// Page results emitted, failed pages included.
    pub nominas_procesadas: usize,
    /// Per-page results in document order.
    pub datos: Vec<PageResult>,
    pub mensaje: String,
}

impl ExtractionReport {
    /// Pages whose result carries an error.
    pub fn failed_pages(&self) -> usize {
        self.datos.iter().filter(|p| p.is_error()).count()
    }
}
