//! Configuration for the extraction pipeline.
//!
//! All knobs live in [`ExtractorConfig`], built via its
//! [`ExtractorConfigBuilder`]. The region set is part of the config and is
//! handed to the page processor explicitly, so a caller can run a second
//! template side by side without touching any global.

use crate::error::NominaError;
use crate::pipeline::region::{Region, RegionSet};

/// Default ceiling for request bodies and downloaded PDFs: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for one extraction pipeline.
///
/// # Example
/// ```rust
/// use nomina_extract::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .download_timeout_secs(15)
///     .max_body_bytes(5 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.download_timeout_secs, 15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Regions read from every page. Default: [`RegionSet::default()`].
    pub regions: RegionSet,

    /// Timeout for `pdfUrl` downloads in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Maximum request body and PDF size in bytes. Default: 10 MiB.
    ///
    /// Applies to the JSON body at the HTTP layer and again to the decoded
    /// or downloaded PDF, since a URL can point at anything.
    pub max_body_bytes: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            regions: RegionSet::default(),
            download_timeout_secs: 30,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ExtractorConfig {
    /// Create a new builder for `ExtractorConfig`.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    pub fn trabajador_region(mut self, region: Region) -> Self {
        self.config.regions.trabajador = region;
        self
    }

    pub fn periodo_region(mut self, region: Region) -> Self {
        self.config.regions.periodo = region;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractorConfig, NominaError> {
        let c = &self.config;
        if !c.regions.trabajador.is_well_formed() {
            return Err(NominaError::InvalidConfig(format!(
                "TRABAJADOR region is empty or inverted: {:?}",
                c.regions.trabajador
            )));
        }
        if !c.regions.periodo.is_well_formed() {
            return Err(NominaError::InvalidConfig(format!(
                "PERIODO region is empty or inverted: {:?}",
                c.regions.periodo
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(NominaError::InvalidConfig(
                "Download timeout must be ≥ 1s".into(),
            ));
        }
        if c.max_body_bytes == 0 {
            return Err(NominaError::InvalidConfig(
                "Body limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}
