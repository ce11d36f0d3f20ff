//! Input resolution: turn the request body into raw PDF bytes.
//!
//! A request names its document one of two ways: `pdfUrl`, fetched over
//! HTTP, or `pdfData`, base64 with an optional
//! `data:application/pdf;base64,` prefix. Exactly one path runs. When both
//! are present `pdfUrl` wins, and empty strings count as absent.
//!
//! Both paths enforce the configured size ceiling before the bytes reach a
//! PDF parser.

use crate::config::ExtractorConfig;
use crate::error::NominaError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Message returned when neither input field is supplied.
pub const MISSING_INPUT: &str = "Se requiere pdfData (base64) o pdfUrl";

const DATA_URI_PREFIX: &str = "data:application/pdf;base64,";

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

/// Standard alphabet, padding optional, trailing bits tolerated.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// `-`/`_` alphabet, tried when the standard one rejects the payload.
const LENIENT_BASE64_URL: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// JSON body accepted by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl ExtractRequest {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            pdf_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn from_base64(data: impl Into<String>) -> Self {
        Self {
            pdf_data: Some(data.into()),
            ..Self::default()
        }
    }
}

/// Where the PDF comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfSource<'a> {
    Url(&'a str),
    Inline(&'a str),
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Pick the source for `request`; `pdfUrl` is checked first.
pub fn select_source(request: &ExtractRequest) -> Result<PdfSource<'_>, NominaError> {
    if let Some(url) = present(&request.pdf_url) {
        Ok(PdfSource::Url(url))
    } else if let Some(data) = present(&request.pdf_data) {
        Ok(PdfSource::Inline(data))
    } else {
        Err(NominaError::invalid_input(MISSING_INPUT))
    }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Resolve the request to raw PDF bytes.
pub async fn resolve_input(
    request: &ExtractRequest,
    config: &ExtractorConfig,
) -> Result<Vec<u8>, NominaError> {
    match select_source(request)? {
        PdfSource::Url(url) => {
            download_url(url, config.download_timeout_secs, config.max_body_bytes).await
        }
        PdfSource::Inline(data) => decode_inline(data, config.max_body_bytes),
    }
}

/// Decode a base64 payload, with or without the data-URI prefix.
///
/// Embedded whitespace (line-wrapped base64) is ignored.
pub fn decode_inline(data: &str, limit: usize) -> Result<Vec<u8>, NominaError> {
    let payload = data.strip_prefix(DATA_URI_PREFIX).unwrap_or(data);
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let estimated = compact.len() / 4 * 3;
    if estimated > limit {
        return Err(NominaError::PdfTooLarge {
            size: estimated,
            limit,
        });
    }

    let bytes = LENIENT_BASE64
        .decode(compact.as_bytes())
        .or_else(|_| LENIENT_BASE64_URL.decode(compact.as_bytes()))
        .map_err(|e| NominaError::DecodeFailed {
            detail: e.to_string(),
        })?;

    ensure_within_limit(bytes.len(), limit)?;
    debug!("Decoded inline PDF: {} bytes", bytes.len());
    Ok(bytes)
}

/// Download `url` into memory.
async fn download_url(url: &str, timeout_secs: u64, limit: usize) -> Result<Vec<u8>, NominaError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| NominaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(url, timeout_secs, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(NominaError::FetchFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(len) = response.content_length() {
        ensure_within_limit(len as usize, limit)?;
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, timeout_secs, e))?;
    ensure_within_limit(bytes.len(), limit)?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

fn transport_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> NominaError {
    if e.is_timeout() {
        NominaError::DownloadTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        NominaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

fn ensure_within_limit(size: usize, limit: usize) -> Result<(), NominaError> {
    if size > limit {
        Err(NominaError::PdfTooLarge { size, limit })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    const LIMIT: usize = 1024;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn missing_both_is_invalid_input() {
        let err = select_source(&ExtractRequest::default()).unwrap_err();
        assert!(matches!(err, NominaError::InvalidInput { .. }));
        assert_eq!(err.to_string(), MISSING_INPUT);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let req = ExtractRequest {
            pdf_data: Some(String::new()),
            pdf_url: Some(String::new()),
        };
        assert!(select_source(&req).is_err());
    }

    #[test]
    fn url_takes_precedence() {
        let req = ExtractRequest {
            pdf_data: Some("JVBERi0=".into()),
            pdf_url: Some("https://example.com/a.pdf".into()),
        };
        assert_eq!(
            select_source(&req).unwrap(),
            PdfSource::Url("https://example.com/a.pdf")
        );
    }

    #[test]
    fn empty_url_falls_back_to_data() {
        let req = ExtractRequest {
            pdf_data: Some("JVBERi0=".into()),
            pdf_url: Some(String::new()),
        };
        assert_eq!(select_source(&req).unwrap(), PdfSource::Inline("JVBERi0="));
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let req: ExtractRequest =
            serde_json::from_str(r#"{"pdfData":"abc","pdfUrl":"https://x"}"#).unwrap();
        assert_eq!(req.pdf_data.as_deref(), Some("abc"));
        assert_eq!(req.pdf_url.as_deref(), Some("https://x"));

        let empty: ExtractRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ExtractRequest::default());
    }

    #[test]
    fn decode_plain_and_prefixed() {
        let encoded = STANDARD.encode(b"%PDF-1.7 body");
        assert_eq!(decode_inline(&encoded, LIMIT).unwrap(), b"%PDF-1.7 body");

        let prefixed = format!("{DATA_URI_PREFIX}{encoded}");
        assert_eq!(decode_inline(&prefixed, LIMIT).unwrap(), b"%PDF-1.7 body");
    }

    #[test]
    fn decode_tolerates_wrapping_and_missing_padding() {
        let encoded = STANDARD.encode(b"%PDF-1.4");
        let unpadded = encoded.trim_end_matches('=');
        let wrapped = format!("{}\n{}", &unpadded[..4], &unpadded[4..]);
        assert_eq!(decode_inline(&wrapped, LIMIT).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn decode_accepts_url_safe_alphabet() {
        let raw = b"%PDF-1.7 \xfb\xff\xfe";
        let url_safe = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw);
        assert!(url_safe.contains('-') || url_safe.contains('_'));
        assert_eq!(decode_inline(&url_safe, LIMIT).unwrap(), raw);
    }

    #[test]
    fn malformed_base64_is_decode_failure() {
        let err = decode_inline("not*base64!", LIMIT).unwrap_err();
        assert!(matches!(err, NominaError::DecodeFailed { .. }));
    }

    #[test]
    fn oversized_payload_rejected_before_decoding() {
        let encoded = STANDARD.encode(vec![0u8; 2048]);
        let err = decode_inline(&encoded, LIMIT).unwrap_err();
        assert!(matches!(err, NominaError::PdfTooLarge { limit: LIMIT, .. }));
    }

    #[tokio::test]
    async fn resolve_inline_request() {
        let req = ExtractRequest::from_base64(STANDARD.encode(b"%PDF-1.7"));
        let bytes = resolve_input(&req, &ExtractorConfig::default())
            .await
            .unwrap();
        assert_eq!(bytes, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn resolve_missing_input() {
        let err = resolve_input(&ExtractRequest::default(), &ExtractorConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NominaError::InvalidInput { .. }));
    }
}
