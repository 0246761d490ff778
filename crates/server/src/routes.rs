//! Method/path dispatch over the decoded request path.
//!
//! Topic identifiers contain slashes (`course/module/stem`), so the content,
//! audio and progress routes capture the remaining segments and rejoin them
//! instead of taking a single path parameter.

use std::sync::Arc;

use hyper::{Body, Method, Request, Response};
use tracing::debug;

use crate::handlers;
use crate::response::{ApiError, error_response};
use crate::state::AppState;

pub async fn handle_request(
    state: Arc<AppState>,
    req: Request<Body>,
) -> Result<Response<Body>, hyper::Error> {
    debug!("{} {}", req.method(), req.uri());
    let response = match route(state, req).await {
        Ok(response) => response,
        Err(err) => error_response(&err),
    };
    Ok(response)
}

async fn route(state: Arc<AppState>, req: Request<Body>) -> Result<Response<Body>, ApiError> {
    let decoded = urlencoding::decode(req.uri().path())
        .map_err(|_| ApiError::Validation("invalid path encoding".into()))?
        .into_owned();
    let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();
    let method = req.method().clone();

    match (&method, segments.as_slice()) {
        (&Method::GET, []) => Ok(handlers::service_index()),
        (&Method::GET, ["api", "health"]) => Ok(handlers::health()),

        (&Method::GET, ["api", "courses"]) => handlers::courses::list(&state).await,
        (&Method::POST, ["api", "courses", "scan"]) => handlers::courses::scan(&state).await,
        (&Method::GET, ["api", "courses", course_id])
        | (&Method::GET, ["api", "courses", course_id, "structure"]) => {
            handlers::courses::structure(&state, course_id).await
        }

        (&Method::GET, ["api", "content", rest @ ..]) if !rest.is_empty() => match rest {
            [head @ .., "raw"] if !head.is_empty() => {
                handlers::content::raw(&state, &head.join("/")).await
            }
            [head @ .., "evaluation"] if !head.is_empty() => {
                handlers::content::evaluation(&state, &head.join("/")).await
            }
            _ => handlers::content::topic_content(&state, &rest.join("/")).await,
        },
        (&Method::GET, ["api", "audio", rest @ ..]) if !rest.is_empty() => {
            handlers::content::audio(&state, &rest.join("/"), &req).await
        }

        (&Method::GET, ["api", "progress", "topic", rest @ ..]) if !rest.is_empty() => {
            handlers::progress::topic(&state, &req, &rest.join("/")).await
        }
        (&Method::GET, ["api", "progress", "evaluations", rest @ ..]) if !rest.is_empty() => {
            handlers::progress::evaluation_results(&state, &req, &rest.join("/")).await
        }
        (&Method::GET, ["api", "progress", course_id, "stats"]) => {
            handlers::progress::stats(&state, &req, course_id).await
        }
        (&Method::GET, ["api", "progress", course_id]) => {
            handlers::progress::course(&state, &req, course_id).await
        }
        (&Method::POST, ["api", "progress", "mark-complete"]) => {
            handlers::progress::mark_complete(&state, req).await
        }
        (&Method::POST, ["api", "progress", "update-position"]) => {
            handlers::progress::update_position(&state, req).await
        }
        (&Method::POST, ["api", "progress", "submit-evaluation"]) => {
            handlers::progress::submit_evaluation(&state, req).await
        }

        (&Method::GET, ["api", "bookmarks"]) => handlers::bookmarks::list(&state, &req).await,
        (&Method::POST, ["api", "bookmarks"]) => handlers::bookmarks::add(&state, req).await,
        (&Method::DELETE, ["api", "bookmarks", rest @ ..]) if !rest.is_empty() => {
            handlers::bookmarks::remove(&state, &req, &rest.join("/")).await
        }

        (&Method::GET, ["content", rest @ ..]) if !rest.is_empty() => {
            handlers::content::static_file(&state, &rest.join("/")).await
        }

        _ => Err(ApiError::NotFound("Resource not found".into())),
    }
}
