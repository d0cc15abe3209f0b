//! JSON response envelopes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{LegacyError, Result};

/// `{success: true, message, data}`
#[derive(Debug, Serialize)]
struct Envelope<'a, T> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn envelope<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    let body = Envelope {
        success: true,
        message,
        data,
    };
    (status, Json(body)).into_response()
}

pub fn ok<T: Serialize>(message: &str, data: T) -> Result<Response> {
    Ok(envelope(StatusCode::OK, message, Some(data)))
}

pub fn created<T: Serialize>(message: &str, data: T) -> Result<Response> {
    Ok(envelope(StatusCode::CREATED, message, Some(data)))
}

/// Success with no payload.
pub fn done(message: &str) -> Result<Response> {
    Ok(envelope::<()>(StatusCode::OK, message, None))
}

/// 404 with a specific message.
pub fn missing(message: &str) -> Result<Response> {
    let body = serde_json::json!({ "success": false, "message": message });
    Ok((StatusCode::NOT_FOUND, Json(body)).into_response())
}

/// Result of the handlers that keep the `status` envelope.
pub type LegacyResult = std::result::Result<Response, LegacyError>;

pub fn legacy(status: StatusCode, body: serde_json::Value) -> LegacyResult {
    Ok((status, Json(body)).into_response())
}
