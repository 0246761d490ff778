use std::sync::Arc;

use hyper::{Body, Request, Response};
use serde::Deserialize;
use serde_json::json;

use lms_core::model::{CourseId, ModuleId, TopicId};
use services::{EvaluationServiceError, EvaluationSubmission};

use crate::handlers::{acting_user, read_json};
use crate::response::{ApiError, data, success};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkCompleteBody {
    course_id: Option<String>,
    module_id: Option<String>,
    topic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePositionBody {
    topic_id: Option<String>,
    position: Option<f64>,
    #[serde(default)]
    time_spent: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitEvaluationBody {
    topic_id: Option<String>,
    score: Option<f64>,
    max_score: Option<f64>,
    #[serde(default)]
    answers: Option<serde_json::Value>,
    #[serde(default)]
    time_spent: Option<i64>,
}

/// `GET /api/progress/{courseId}`: rows plus stats.
pub async fn course(
    state: &Arc<AppState>,
    req: &Request<Body>,
    course_id: &str,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(req);
    let progress = state
        .progress
        .course_progress(user, &CourseId::new(course_id))
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve progress", err))?;

    Ok(data(&progress))
}

/// `GET /api/progress/{courseId}/stats`: stats plus completion percentage.
pub async fn stats(
    state: &Arc<AppState>,
    req: &Request<Body>,
    course_id: &str,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(req);
    let stats = state
        .progress
        .course_stats(user, &CourseId::new(course_id))
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve course statistics", err))?;

    let mut payload = serde_json::to_value(stats)
        .map_err(|err| ApiError::internal("Failed to retrieve course statistics", err))?;
    if let Some(object) = payload.as_object_mut() {
        object.insert(
            "percentage".to_string(),
            json!(stats.completion_percentage()),
        );
    }

    Ok(data(&payload))
}

/// `GET /api/progress/topic/{topicId}`: a single row, defaulting to a
/// not-started shape.
pub async fn topic(
    state: &Arc<AppState>,
    req: &Request<Body>,
    topic_id: &str,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(req);
    let progress = state
        .progress
        .topic_progress(user, &TopicId::new(topic_id))
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve topic progress", err))?;

    Ok(data(&progress))
}

/// `POST /api/progress/mark-complete`
pub async fn mark_complete(
    state: &Arc<AppState>,
    req: Request<Body>,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(&req);
    let body: MarkCompleteBody = read_json(req).await?;

    let (Some(course_id), Some(module_id), Some(topic_id)) =
        (body.course_id, body.module_id, body.topic_id)
    else {
        return Err(ApiError::Validation(
            "Missing required fields: courseId, moduleId, topicId".into(),
        ));
    };

    state
        .progress
        .mark_complete(
            user,
            &CourseId::new(course_id),
            &ModuleId::new(module_id),
            &TopicId::new(topic_id),
        )
        .await
        .map_err(|err| ApiError::internal("Failed to mark topic as completed", err))?;

    Ok(crate::response::message("Topic marked as completed"))
}

/// `POST /api/progress/update-position`
pub async fn update_position(
    state: &Arc<AppState>,
    req: Request<Body>,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(&req);
    let body: UpdatePositionBody = read_json(req).await?;

    let (Some(topic_id), Some(position)) = (body.topic_id, body.position) else {
        return Err(ApiError::Validation(
            "Missing required fields: topicId, position".into(),
        ));
    };

    state
        .progress
        .update_position(
            user,
            &TopicId::new(topic_id),
            position,
            body.time_spent.unwrap_or(0),
        )
        .await
        .map_err(|err| ApiError::internal("Failed to update progress position", err))?;

    Ok(crate::response::message("Progress position updated"))
}

/// `POST /api/progress/submit-evaluation`
pub async fn submit_evaluation(
    state: &Arc<AppState>,
    req: Request<Body>,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(&req);
    let body: SubmitEvaluationBody = read_json(req).await?;

    let (Some(topic_id), Some(score), Some(max_score)) =
        (body.topic_id, body.score, body.max_score)
    else {
        return Err(ApiError::Validation(
            "Missing required fields: topicId, score, maxScore".into(),
        ));
    };

    let stored = state
        .evaluations
        .submit(
            user,
            EvaluationSubmission {
                topic_id: TopicId::new(topic_id),
                score,
                max_score,
                answers: body.answers.unwrap_or_else(|| json!([])),
                time_spent_seconds: body.time_spent.unwrap_or(0),
            },
        )
        .await
        .map_err(|err| match err {
            EvaluationServiceError::Evaluation(err) => ApiError::Validation(err.to_string()),
            other => ApiError::internal("Failed to submit evaluation", other),
        })?;

    Ok(success(json!({
        "message": "Evaluation submitted successfully",
        "data": stored,
    })))
}

/// `GET /api/progress/evaluations/{topicId}`: stored attempts, newest
/// first.
pub async fn evaluation_results(
    state: &Arc<AppState>,
    req: &Request<Body>,
    topic_id: &str,
) -> Result<Response<Body>, ApiError> {
    let user = acting_user(req);
    let results = state
        .evaluations
        .results(user, &TopicId::new(topic_id))
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve evaluation results", err))?;

    Ok(data(&results))
}
