//! Upload-to-thumbnail pipeline.
//!
//! One run handles one [`UploadNotification`]:
//!
//! 1. skip keys that already are thumbnails (writing a thumbnail into the same
//!    bucket raises another upload event);
//! 2. fetch the original bytes;
//! 3. decode, fit to the configured square and encode as PNG on the blocking
//!    pool;
//! 4. store the PNG next to the original as `<base>_thumbnail.png`, public-read;
//! 5. persist a [`ThumbnailRecord`] pointing at it.
//!
//! Any failure after the guard aborts the run and is returned as is. Nothing
//! is retried or rolled back: when the record write fails the thumbnail object
//! stays in the store without a record.

use crate::{
    models::{event::UploadNotification, object::Visibility, thumbnail::ThumbnailRecord},
    services::{
        codec::{self, CodecError},
        naming,
        object_store::{ObjectStore, StorageError},
        record_builder,
        record_table::{RecordTable, TableError},
        transform,
    },
};
use bytes::Bytes;
use image::ImageFormat;
use serde::Serialize;
use std::{num::NonZeroU32, sync::Arc};
use thiserror::Error;
use tracing::info;

pub const THUMBNAIL_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetching `{key}` from bucket `{bucket}` failed: {source}")]
    Fetch {
        bucket: String,
        key: String,
        source: StorageError,
    },
    #[error("image `{key}` could not be processed: {source}")]
    Codec { key: String, source: CodecError },
    #[error("storing thumbnail `{key}` failed: {source}")]
    Store { key: String, source: StorageError },
    #[error("persisting record for `{url}` failed: {source}")]
    Persist { url: String, source: TableError },
    #[error("thumbnail task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineOutcome {
    /// The key already was a generated thumbnail; nothing was written.
    Skipped { key: String },
    Generated { url: String, record: ThumbnailRecord },
}

#[derive(Clone)]
pub struct ThumbnailPipeline {
    objects: Arc<dyn ObjectStore>,
    table: Arc<dyn RecordTable>,
    size: NonZeroU32,
}

impl ThumbnailPipeline {
    pub fn new(objects: Arc<dyn ObjectStore>, table: Arc<dyn RecordTable>, size: NonZeroU32) -> Self {
        Self {
            objects,
            table,
            size,
        }
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.size.get()
    }

    pub async fn run(
        &self,
        notification: UploadNotification,
    ) -> Result<PipelineOutcome, PipelineError> {
        let UploadNotification {
            bucket,
            key,
            size_bytes,
        } = notification;

        if naming::is_thumbnail_key(&key) {
            info!(%bucket, %key, "key is already a thumbnail, skipping");
            return Ok(PipelineOutcome::Skipped { key });
        }

        info!(%bucket, %key, size_bytes, "generating thumbnail");

        let original = self
            .objects
            .get(&bucket, &key)
            .await
            .map_err(|source| PipelineError::Fetch {
                bucket: bucket.clone(),
                key: key.clone(),
                source,
            })?;

        let size = self.size.get();
        let png = tokio::task::spawn_blocking(move || render_thumbnail(&original, size))
            .await?
            .map_err(|source| PipelineError::Codec {
                key: key.clone(),
                source,
            })?;

        let thumbnail_key = naming::thumbnail_key(&key);
        self.objects
            .put(
                &bucket,
                &thumbnail_key,
                Bytes::from(png),
                THUMBNAIL_CONTENT_TYPE,
                Visibility::PublicRead,
            )
            .await
            .map_err(|source| PipelineError::Store {
                key: thumbnail_key.clone(),
                source,
            })?;

        let url = self.objects.object_url(&bucket, &thumbnail_key);
        let record = record_builder::build_record(url.clone(), size_bytes);
        self.table
            .put_item(&record)
            .await
            .map_err(|source| PipelineError::Persist {
                url: url.clone(),
                source,
            })?;

        info!(%bucket, key = %thumbnail_key, id = %record.id, %url, "thumbnail generated");
        Ok(PipelineOutcome::Generated { url, record })
    }
}

fn render_thumbnail(original: &[u8], size: u32) -> Result<Vec<u8>, CodecError> {
    let image = codec::decode(original)?;
    let thumbnail = transform::fit_square(&image, size);
    codec::encode(&thumbnail, ImageFormat::Png)
}
