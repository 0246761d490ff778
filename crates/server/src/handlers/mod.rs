pub mod bookmarks;
pub mod content;
pub mod courses;
pub mod progress;

use chrono::Utc;
use hyper::{Body, Request, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use lms_core::model::UserId;

use crate::response::{ApiError, plain, success};
use crate::state::{SERVICE_NAME, SERVICE_VERSION};

/// `GET /`: service name, version and the endpoint index.
pub fn service_index() -> Response<Body> {
    plain(&json!({
        "name": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "description": "Learning Management System for markdown course trees",
        "endpoints": {
            "health": "/api/health",
            "courses": "/api/courses",
            "content": "/api/content/{topicId}",
            "audio": "/api/audio/{topicId}",
            "progress": "/api/progress/{courseId}"
        }
    }))
}

/// `GET /api/health`
pub fn health() -> Response<Body> {
    success(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": SERVICE_VERSION,
    }))
}

/// The acting user, from the `X-User-Id` header the external token issuer's
/// gateway sets. Absent or malformed values fall back to the guest user.
pub(crate) fn acting_user<T>(req: &Request<T>) -> UserId {
    req.headers()
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .map_or_else(UserId::guest, UserId::new)
}

/// Reads and deserializes a JSON request body.
pub(crate) async fn read_json<T: DeserializeOwned>(req: Request<Body>) -> Result<T, ApiError> {
    let bytes = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|err| ApiError::internal("Failed to read request body", err))?;
    serde_json::from_slice(&bytes).map_err(|_| ApiError::Validation("Invalid JSON body".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_bad_user_header_falls_back_to_guest() {
        let req = Request::builder().body(()).unwrap();
        assert_eq!(acting_user(&req), UserId::guest());

        let req = Request::builder()
            .header("x-user-id", "not-a-number")
            .body(())
            .unwrap();
        assert_eq!(acting_user(&req), UserId::guest());

        let req = Request::builder()
            .header("x-user-id", "42")
            .body(())
            .unwrap();
        assert_eq!(acting_user(&req), UserId::new(42));
    }
}
