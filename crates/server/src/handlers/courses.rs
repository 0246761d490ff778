use std::sync::Arc;

use hyper::{Body, Response};
use serde_json::json;
use tracing::info;

use lms_core::model::CourseId;

use crate::response::{ApiError, data, success};
use crate::state::AppState;

/// `GET /api/courses`
pub async fn list(state: &Arc<AppState>) -> Result<Response<Body>, ApiError> {
    let courses = state
        .courses
        .list_courses()
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve courses", err))?;

    Ok(success(json!({
        "count": courses.len(),
        "data": courses,
    })))
}

/// `GET /api/courses/{courseId}` and `GET /api/courses/{courseId}/structure`
pub async fn structure(
    state: &Arc<AppState>,
    course_id: &str,
) -> Result<Response<Body>, ApiError> {
    let structure = state
        .courses
        .course_structure(&CourseId::new(course_id))
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve course", err))?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    Ok(data(&structure))
}

/// `POST /api/courses/scan`: manual rescan, guarded so only one scan runs
/// at a time.
pub async fn scan(state: &Arc<AppState>) -> Result<Response<Body>, ApiError> {
    let Some(_guard) = state.try_begin_scan() else {
        return Err(ApiError::ScanBusy);
    };

    info!("manual course scan triggered");
    let courses = state
        .scanner
        .scan_courses()
        .await
        .map_err(|err| ApiError::internal("Failed to scan courses", err))?;

    Ok(success(json!({
        "message": format!("Scanned and updated {} courses", courses.len()),
        "data": courses,
    })))
}
