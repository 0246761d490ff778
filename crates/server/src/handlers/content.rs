use std::path::Path;
use std::sync::Arc;

use hyper::{Body, Request, Response, StatusCode, header};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use lms_core::model::TopicId;

use crate::range::parse_range;
use crate::response::{ApiError, data, success, typed};
use crate::state::AppState;

/// `GET /api/content/{topicId}`: topic row plus its markdown body.
pub async fn topic_content(
    state: &Arc<AppState>,
    topic_id: &str,
) -> Result<Response<Body>, ApiError> {
    let id = TopicId::new(topic_id);
    let content = state
        .content
        .topic_content(&id)
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve content", err))?
        .ok_or_else(|| ApiError::NotFound("Topic not found".into()))?;

    Ok(data(&content))
}

/// `GET /api/content/{topicId}/raw`: the markdown body alone.
pub async fn raw(state: &Arc<AppState>, topic_id: &str) -> Result<Response<Body>, ApiError> {
    let id = TopicId::new(topic_id);
    let content = state
        .content
        .topic_content(&id)
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve content", err))?
        .ok_or_else(|| ApiError::NotFound("Topic not found".into()))?;

    Ok(typed(
        "text/markdown; charset=utf-8",
        Body::from(content.content),
    ))
}

/// `GET /api/content/{topicId}/evaluation`: the linked quiz markdown.
pub async fn evaluation(
    state: &Arc<AppState>,
    topic_id: &str,
) -> Result<Response<Body>, ApiError> {
    let id = TopicId::new(topic_id);
    let topic = state
        .content
        .topic(&id)
        .await
        .map_err(|err| ApiError::internal("Failed to retrieve evaluation", err))?
        .ok_or_else(|| ApiError::NotFound("Topic not found".into()))?;

    if topic.evaluation_path.is_none() {
        return Err(ApiError::NotFound("Evaluation not linked to topic".into()));
    }

    let markdown = state
        .content
        .evaluation_content(&topic)
        .map_err(|err| ApiError::internal("Failed to retrieve evaluation", err))?
        .ok_or_else(|| ApiError::NotFound("Evaluation file not found on disk".into()))?;

    Ok(success(json!({ "markdown": markdown })))
}

/// `GET /api/audio/{topicId}`: audio bytes, honoring a single `Range`.
pub async fn audio(
    state: &Arc<AppState>,
    topic_id: &str,
    req: &Request<Body>,
) -> Result<Response<Body>, ApiError> {
    let id = TopicId::new(topic_id);
    let topic = state
        .content
        .topic(&id)
        .await
        .map_err(|err| ApiError::internal("Failed to stream audio", err))?
        .ok_or_else(|| ApiError::NotFound("Topic not found".into()))?;

    let path = state
        .content
        .audio_file(&topic)
        .ok_or_else(|| ApiError::NotFound("Audio file not found".into()))?;

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|err| ApiError::internal("Failed to stream audio", err))?;
    let file_size = metadata.len();
    let content_type = audio_content_type(&path);

    let range_header = req
        .headers()
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let Some(range_header) = range_header else {
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|err| ApiError::internal("Failed to stream audio", err))?;
        return Ok(stream_response(
            StatusCode::OK,
            file_size,
            content_type,
            None,
            Body::wrap_stream(ReaderStream::new(file)),
        ));
    };

    let Some(range) = parse_range(range_header, file_size) else {
        return Ok(unsatisfiable_range(file_size));
    };

    let mut file = tokio::fs::File::open(&path)
        .await
        .map_err(|err| ApiError::internal("Failed to stream audio", err))?;
    file.seek(std::io::SeekFrom::Start(range.start))
        .await
        .map_err(|err| ApiError::internal("Failed to stream audio", err))?;

    Ok(stream_response(
        StatusCode::PARTIAL_CONTENT,
        range.len(),
        content_type,
        Some(format!("bytes {}-{}/{file_size}", range.start, range.end)),
        Body::wrap_stream(ReaderStream::new(file.take(range.len()))),
    ))
}

/// `GET /content/{path}`: static files under the content root.
pub async fn static_file(state: &Arc<AppState>, relative: &str) -> Result<Response<Body>, ApiError> {
    let path = state
        .content
        .resolve_static(relative)
        .ok_or_else(|| ApiError::NotFound("Resource not found".into()))?;

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|err| ApiError::internal("Failed to serve file", err))?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|err| ApiError::internal("Failed to serve file", err))?;

    Ok(stream_response(
        StatusCode::OK,
        metadata.len(),
        static_content_type(&path),
        None,
        Body::wrap_stream(ReaderStream::new(file)),
    ))
}

fn stream_response(
    status: StatusCode,
    content_length: u64,
    content_type: &str,
    content_range: Option<String>,
    body: Body,
) -> Response<Body> {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(content_range) = content_range {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }
    builder
        .body(body)
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn unsatisfiable_range(file_size: u64) -> Response<Body> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(header::CONTENT_RANGE, format!("bytes */{file_size}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "success": false, "error": "requested range not satisfiable" }).to_string(),
        ))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn audio_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

fn static_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("md") => "text/markdown; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
