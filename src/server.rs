//! HTTP surface: one route, `POST /api/extract-nomina`.
//!
//! - `POST`    → run the pipeline, `200` with the report
//! - `OPTIONS` → `200`, empty body (CORS pre-flight)
//! - anything else → `405`
//!
//! Every response, errors and pre-flight included, carries the three
//! `Access-Control-*` headers. Request bodies are capped at
//! [`ExtractorConfig::max_body_bytes`].
//!
//! Error envelopes:
//!
//! | Status | Body |
//! |--------|------|
//! | 400 / 405 / 413 | `{"error": "..."}` |
//! | 500 | `{"success": false, "error": "...", "detalles": "...", "timestamp": "..."}` |

use crate::config::ExtractorConfig;
use crate::error::NominaError;
use crate::extract::extract_nominas;
use crate::output::ExtractionReport;
use crate::pipeline::backend::PdfBackend;
use crate::pipeline::input::ExtractRequest;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Path of the extraction endpoint.
pub const ROUTE: &str = "/api/extract-nomina";

const METHOD_NOT_ALLOWED: &str = "Método no permitido. Usa POST.";
const PROCESSING_FAILED: &str = "Error procesando el PDF";

// ============================================================================
// AppState
// ============================================================================

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn PdfBackend>,
    config: Arc<ExtractorConfig>,
}

impl AppState {
    pub fn new(backend: Arc<dyn PdfBackend>, config: ExtractorConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Response bodies
// ============================================================================

/// Body for 400, 405 and 413 responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientErrorBody {
    pub error: String,
}

/// Body for 500 responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    pub success: bool,
    pub error: String,
    pub detalles: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Error type
// ============================================================================

enum AppError {
    /// Rejected before the pipeline ran (bad body, oversized body).
    Client(StatusCode, String),
    Pipeline(NominaError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Client(status, msg) => {
                warn!("Rejected request ({}): {}", status, msg);
                (status, Json(ClientErrorBody { error: msg })).into_response()
            }
            AppError::Pipeline(err) => {
                let status = err.status_code();
                if status == StatusCode::BAD_REQUEST {
                    warn!("Invalid input: {}", err);
                    return (status, Json(ClientErrorBody {
                        error: err.to_string(),
                    }))
                    .into_response();
                }

                error!("Request failed: {}", err);
                let body = ServerErrorBody {
                    success: false,
                    error: PROCESSING_FAILED.to_string(),
                    detalles: err.to_string(),
                    timestamp: Utc::now(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl From<NominaError> for AppError {
    fn from(err: NominaError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::Client(status, rejection.body_text())
        } else {
            AppError::Client(
                StatusCode::BAD_REQUEST,
                format!("Cuerpo JSON inválido: {}", rejection.body_text()),
            )
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

// POST /api/extract-nomina
async fn extract_handler(
    State(state): State<AppState>,
    body: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionReport>, AppError> {
    let Json(request) = body?;
    let report = extract_nominas(&request, Arc::clone(&state.backend), &state.config).await?;
    Ok(Json(report))
}

// OPTIONS /api/extract-nomina
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

// Any other method on /api/extract-nomina
async fn method_not_allowed_handler() -> (StatusCode, Json<ClientErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ClientErrorBody {
            error: METHOD_NOT_ALLOWED.to_string(),
        }),
    )
}

// ============================================================================
// Router
// ============================================================================

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route(
            ROUTE,
            post(extract_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Serve `state` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}{}", addr, ROUTE);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
