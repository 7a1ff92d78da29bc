use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use http_body_util::LengthLimitError;
use serde_json::{json, Value};
use std::error::Error as _;

use crate::services::sanitizer::sanitize_collecting;
use crate::AppState;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .map(|mime| {
            mime.type_() == mime::APPLICATION
                && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
        })
        .unwrap_or(false)
}

/// True if buffering failed because the body went over the size limit
fn exceeded_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = error.source();
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Strips operator keys from JSON request bodies before any handler sees them.
///
/// Bodies that are not JSON, or fail to parse, are forwarded untouched so the
/// handler's extractor reports the problem.
pub async fn sanitize_json_body(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !is_json(request.headers()) {
        return next.run(request).await;
    }

    let (mut parts, incoming) = request.into_parts();
    let bytes = match body::to_bytes(incoming, app_state.config.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) if exceeded_limit(&e) => {
            tracing::warn!("Rejected oversized request body for {}", parts.uri.path());
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({
                    "error": "Request body too large",
                    "message": format!("Request bodies are limited to {} bytes", app_state.config.max_body_size)
                })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::warn!("Failed to read request body for {}: {}", parts.uri.path(), e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Failed to read request body",
                    "message": "The request body could not be read"
                })),
            )
                .into_response();
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            let mut dropped = Vec::new();
            let clean = sanitize_collecting(value, &mut dropped);
            if dropped.is_empty() {
                Body::from(bytes)
            } else {
                tracing::warn!(
                    path = %parts.uri.path(),
                    dropped = ?dropped,
                    "Removed operator keys from request body"
                );
                match serde_json::to_vec(&clean) {
                    Ok(rewritten) => {
                        parts.headers.remove(header::CONTENT_LENGTH);
                        Body::from(rewritten)
                    }
                    Err(e) => {
                        tracing::error!("Failed to re-encode sanitized body: {}", e);
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                }
            }
        }
        Err(_) => Body::from(bytes),
    };

    next.run(Request::from_parts(parts, body)).await
}
