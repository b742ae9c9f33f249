//! HTTP handlers for the object store surface.
//! Streams object bodies to avoid buffering in memory and delegates storage
//! concerns to `DiskObjectStore`. Successful uploads raise an upload
//! notification for the thumbnail pipeline.

use crate::{
    errors::AppError,
    models::{
        event::UploadNotification,
        object::{StoredObject, Visibility},
    },
    services::{object_store::StorageError, pipeline::PipelineOutcome},
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::io;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

const AMZ_ACL: HeaderName = HeaderName::from_static("x-amz-acl");

/// Upload an object to `/objects/{bucket}/{*key}`.
///
/// The canned ACL comes from `x-amz-acl`; objects are private by default.
pub async fn upload_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let visibility = headers
        .get(&AMZ_ACL)
        .and_then(|v| v.to_str().ok())
        .map(Visibility::from_canned_acl)
        .unwrap_or(Visibility::Private);

    let stream = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(io::Error::other));

    let object = state
        .objects
        .upload_object_stream(&bucket, &key, content_type, visibility, stream)
        .await?;

    if state.notify_on_upload {
        notify_pipeline(&state, &object);
    }

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    if let Some(value) = object
        .etag
        .as_ref()
        .and_then(|e| HeaderValue::from_str(&format!("\"{}\"", e)).ok())
    {
        response.headers_mut().insert(header::ETAG, value);
    }
    Ok(response)
}

/// Download an object `/objects/{bucket}/{*key}` as a streaming response.
///
/// Only `public-read` objects are served.
pub async fn get_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let (meta, file) = state.objects.get_object_reader(&bucket, &key).await?;
    if meta.visibility != Visibility::PublicRead {
        return Err(StorageError::AccessDenied { bucket, key }.into());
    }

    let body = Body::from_stream(ReaderStream::new(file));
    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    set_object_headers(response.headers_mut(), &meta);

    Ok(response)
}

/// Fire-and-forget pipeline run for a freshly stored object.
fn notify_pipeline(state: &AppState, object: &StoredObject) {
    let pipeline = state.pipeline.clone();
    let notification = UploadNotification {
        bucket: object.bucket.clone(),
        key: object.key.clone(),
        size_bytes: object.size_bytes.max(0) as u64,
    };

    tokio::spawn(async move {
        let bucket = notification.bucket.clone();
        let key = notification.key.clone();
        match pipeline.run(notification).await {
            Ok(PipelineOutcome::Generated { url, .. }) => {
                info!(%bucket, %key, %url, "upload notification handled")
            }
            Ok(PipelineOutcome::Skipped { .. }) => {}
            Err(err) => warn!(%bucket, %key, error = %err, "upload notification failed"),
        }
    });
}

fn set_object_headers(headers: &mut HeaderMap, meta: &StoredObject) {
    let content_type = meta
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".into());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(meta.size_bytes.max(0) as u64),
    );

    if let Some(etag) = meta.etag.as_ref() {
        if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", etag)) {
            headers.insert(header::ETAG, value);
        }
    }

    if let Ok(value) = HeaderValue::from_str(&meta.last_modified.to_rfc2822()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    headers.insert(AMZ_ACL, HeaderValue::from_static(meta.visibility.as_str()));
}
