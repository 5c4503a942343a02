//! HTTP endpoints for document parsing, URL fetching, and PDF upload.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use event_types::{ParsedEvent, ParserStrategy};

use crate::config::Settings;
use crate::fetch::{self, FetchError};
use crate::pdf;
use crate::processor::{EventProcessor, LocalProcessor};

pub struct AppState {
    processor: LocalProcessor,
    settings: Settings,
}

/// Bind and serve the API until the process is stopped.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&settings.bind_http).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    let state = Arc::new(AppState {
        processor: LocalProcessor::new(),
        settings,
    });
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/parse", post(parse_document))
        .route("/api/fetch-content", get(fetch_content))
        .route("/api/parse-pdf", post(parse_pdf))
        .with_state(state)
}

// ── Errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    GatewayTimeout(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Timeout(_) => ApiError::GatewayTimeout(e.to_string()),
            FetchError::Upstream(_) => ApiError::BadGateway(e.to_string()),
        }
    }
}

// ── Health ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

// ── POST /api/parse ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ParseRequest {
    text: Option<String>,
    strategy: Option<String>,
}

#[derive(Serialize)]
struct ParseResponse {
    success: bool,
    events: Vec<ParsedEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Synchronous parse for documents under the size ceiling. Errors keep
/// the `{success, events, error}` envelope so clients branch on one shape.
async fn parse_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ParseRequest>,
) -> Response {
    let text = match body.text {
        Some(t) if !t.is_empty() => t,
        _ => return parse_failure(StatusCode::BAD_REQUEST, "Text is required"),
    };

    let strategy = match body.strategy.as_deref().map(str::parse::<ParserStrategy>) {
        Some(Ok(s)) => s,
        _ => return parse_failure(StatusCode::BAD_REQUEST, "Invalid parser strategy"),
    };

    if text.len() > state.settings.max_document_bytes {
        let message = format!(
            "Text exceeds {}KB limit. Consider splitting the document.",
            state.settings.max_document_kb()
        );
        return parse_failure(StatusCode::PAYLOAD_TOO_LARGE, &message);
    }

    let events = state.processor.parse_sync(&text, strategy);
    tracing::info!(strategy = %strategy, events = events.len(), "parsed document");
    (
        StatusCode::OK,
        Json(ParseResponse {
            success: true,
            events,
            error: None,
        }),
    )
        .into_response()
}

fn parse_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ParseResponse {
            success: false,
            events: Vec::new(),
            error: Some(message.to_string()),
        }),
    )
        .into_response()
}

// ── GET /api/fetch-content ─────────────────────────────────────────────

#[derive(Deserialize)]
struct FetchParams {
    url: Option<String>,
}

#[derive(Serialize)]
struct FetchResponse {
    text: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// Development-only document import from a URL.
async fn fetch_content(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FetchParams>,
) -> Result<Json<FetchResponse>, ApiError> {
    if state.settings.production {
        return Err(ApiError::Forbidden(
            "URL fetching is disabled in production".to_string(),
        ));
    }

    let raw = params
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("URL parameter is required".to_string()))?;

    let parsed = url::Url::parse(&raw)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid URL format. Must be a valid HTTP(S) URL.".to_string())
        })?;

    let text = fetch::fetch_text(&parsed, state.settings.fetch_timeout).await?;

    let warning = (text.len() > state.settings.max_document_bytes).then(|| {
        format!(
            "Content is {}KB. Large documents may affect parsing performance.",
            kb(text.len())
        )
    });

    Ok(Json(FetchResponse {
        text,
        url: parsed.to_string(),
        warning,
    }))
}

// ── POST /api/parse-pdf ────────────────────────────────────────────────

#[derive(Serialize)]
struct PdfResponse {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// Multipart PDF upload; extraction compresses the document, so the
/// accepted upload ceiling is 10x the text ceiling.
async fn parse_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PdfResponse>, ApiError> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            file = Some((content_type, data.to_vec()));
            break;
        }
    }

    let (content_type, data) =
        file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    if content_type.as_deref() != Some("application/pdf") {
        return Err(ApiError::BadRequest("File must be a PDF".to_string()));
    }

    let max_upload = state.settings.max_document_bytes * 10;
    if data.len() > max_upload {
        return Err(ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size is {}KB.",
            max_upload / 1024
        )));
    }

    let text = pdf::extract_pdf_text(&data).map_err(|e| ApiError::Internal(e.to_string()))?;

    let warning = (text.len() > state.settings.max_document_bytes).then(|| {
        format!(
            "Extracted text is {}KB. Consider splitting for better processing.",
            kb(text.len())
        )
    });

    Ok(Json(PdfResponse { text, warning }))
}

fn kb(len: usize) -> usize {
    (len as f64 / 1024.0).round() as usize
}
