//! Record access endpoints.
//!
//! - `GET    /thumbnails`       list every record
//! - `GET    /thumbnails/{id}`  fetch one record
//! - `DELETE /thumbnails/{id}`  delete one record (the thumbnail object stays)
//!
//! Every response on these routes, errors included, allows any origin.

use crate::{errors::AppError, models::thumbnail::ThumbnailRecord, state::AppState};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: Uuid,
}

pub async fn get_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ThumbnailRecord>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.records.get(id).await?))
}

pub async fn list_thumbnails(
    State(state): State<AppState>,
) -> Result<Json<Vec<ThumbnailRecord>>, AppError> {
    Ok(Json(state.records.list_all().await?))
}

pub async fn delete_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = parse_id(&id)?;
    let deleted = state.records.delete(id).await?;
    info!(id = %deleted, "thumbnail record deleted");
    Ok(Json(DeletedResponse { deleted }))
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::bad_request(format!("`{}` is not a valid thumbnail id", raw)))
}
