use std::sync::Arc;

use hyper::{Body, Request, Response};
use serde::Deserialize;

use lms_core::model::TopicId;

use crate::handlers::{acting_user, read_json};
use crate::response::{ApiError, data, message};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBookmarkBody {
    topic_id: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

/// `GET /api/bookmarks`
pub async fn list(state: &Arc<AppState>, req: &Request<Body>) -> Result<Response<Body>, ApiError> {
    let user = acting_user(req);
    let bookmarks = state
        .bookmarks
        .list(user)
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve bookmarks", err))?;

    Ok(data(&bookmarks))
}

/// `POST /api/bookmarks`
pub async fn add(state: &Arc<AppState>, req: Request<Body>) -> Result<Response<Body>, ApiError> {
    let user = acting_user(&req);
    let body: AddBookmarkBody = read_json(req).await?;

    let Some(topic_id) = body.topic_id else {
        return Err(ApiError::Validation("Missing required field: topicId".into()));
    };

    state
        .bookmarks
        .add(user, TopicId::new(topic_id), body.note)
        .await
        .map_err(|err| ApiError::internal("Failed to add bookmark", err))?;

    Ok(message("Bookmark added"))
}

/// `DELETE /api/bookmarks/{topicId}`
pub async fn remove(
    state: &Arc<AppState>,
    req: &Request<Body>,
    topic_id: &str,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(req);
    let removed = state
        .bookmarks
        .remove(user, &TopicId::new(topic_id))
        .await
        .map_err(|err| ApiError::internal("Failed to remove bookmark", err))?;

    if !removed {
        return Err(ApiError::NotFound("Bookmark not found".into()));
    }

    Ok(message("Bookmark removed"))
}
