//! Download of the unrecognized-query log.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// `GET /export`: the log as a CSV attachment, or 404 before the first entry.
pub async fn download(State(ctx): State<ApiContext>) -> Result<Response, ApiError> {
    let log = ctx.handler.unrecognized_log().clone();
    let filename = log
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::config::DEFAULT_LOG_PATH.to_string());

    let bytes = tokio::task::spawn_blocking(move || log.export_bytes()).await??;

    let Some(bytes) = bytes else {
        return Ok((
            StatusCode::NOT_FOUND,
            "Unrecognized query log not found: nothing has been logged yet.",
        )
            .into_response());
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
