//! Trigger endpoint for externally delivered upload notifications.

use crate::{
    errors::AppError,
    models::event::UploadNotification,
    services::pipeline::PipelineOutcome,
    state::AppState,
};
use axum::{Json, body::Bytes, extract::State};

/// `POST /events/upload`
///
/// Accepts an S3-style notification body and runs the pipeline for its first
/// record. The body is parsed here rather than through the `Json` extractor so
/// malformed events get the same JSON error shape as every other failure.
pub async fn handle_upload_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PipelineOutcome>, AppError> {
    let notification = UploadNotification::from_json(&body)?;
    let outcome = state.pipeline.run(notification).await?;
    Ok(Json(outcome))
}
