//! HTTP endpoint that forwards an uploaded frame to Gemini.
//!
//! `POST /analyze_frame` with `{"image_data": "<base64 JPEG>"}` answers
//! `{"analysis_result": "..."}`. Only malformed requests get a 400; Gemini
//! failures come back as descriptive text in a 200.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::client::GeminiClient;
use crate::types::{AnalyzeOptions, ServerConfig};

/// Shared state backing HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: GeminiClient,
    pub options: AnalyzeOptions,
}

impl AppState {
    pub fn new(client: GeminiClient, options: AnalyzeOptions) -> Self {
        Self { client, options }
    }
}

/// `200` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResponse {
    pub analysis_result: String,
}

/// `400` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze_frame", post(analyze_frame))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `config.addr()` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
}

async fn analyze_frame(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        return bad_request("Request must be JSON");
    }

    let data: Value = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(_) => return bad_request("Request body is not valid JSON"),
    };

    let image_b64 = match data.get("image_data").and_then(|v| v.as_str()) {
        Some(s) if !s.is_empty() => s,
        _ => return bad_request("Missing 'image_data' in request body"),
    };

    info!("Received frame for analysis.");
    let result = state
        .client
        .analyze_or_fallback(image_b64, &state.options)
        .await;
    info!("Sending response: {}...", preview_text(&result, 50));

    Json(AnalysisResponse {
        analysis_result: result,
    })
    .into_response()
}

fn bad_request(message: &str) -> Response {
    let body = ErrorResponse {
        error: message.to_string(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// `application/json` or any `application/*+json`, parameters ignored.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// First `max_chars` characters, on char boundaries.
fn preview_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
