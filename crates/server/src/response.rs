//! Uniform JSON envelope and the error taxonomy handlers map into.

use hyper::{Body, Response, StatusCode, header};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failures, each mapped to a status and a client-safe
/// message. Server-side detail is logged where the error is raised, never
/// echoed to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("a scan is already in progress")]
    ScanBusy,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ScanBusy => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap a service failure: detail goes to the log, the client sees only
    /// the given context message.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{context}: {err}");
        ApiError::Internal(context.to_string())
    }
}

fn json_body(status: StatusCode, value: &serde_json::Value) -> Response<Body> {
    let payload = value.to_string();
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap_or_else(|_| Response::new(Body::from("response build failed")))
}

/// A bare JSON document, for the few endpoints without the envelope.
pub fn plain(value: &serde_json::Value) -> Response<Body> {
    json_body(StatusCode::OK, value)
}

/// `{"success": true, "data": …}`
pub fn data<T: Serialize>(value: &T) -> Response<Body> {
    json_body(StatusCode::OK, &json!({ "success": true, "data": value }))
}

/// `{"success": true, …extra}` for endpoints with bespoke envelopes.
pub fn success(extra: serde_json::Value) -> Response<Body> {
    let mut envelope = json!({ "success": true });
    if let (Some(envelope), Some(extra)) = (envelope.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            envelope.insert(key.clone(), value.clone());
        }
    }
    json_body(StatusCode::OK, &envelope)
}

/// `{"success": true, "message": …}`
pub fn message(text: &str) -> Response<Body> {
    json_body(StatusCode::OK, &json!({ "success": true, "message": text }))
}

pub fn error_response(err: &ApiError) -> Response<Body> {
    json_body(
        err.status(),
        &json!({ "success": false, "error": err.to_string() }),
    )
}

/// Plain body with an explicit content type (markdown, streamed files).
pub fn typed(content_type: &str, body: Body) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .unwrap_or_else(|_| Response::new(Body::from("response build failed")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::ScanBusy.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
