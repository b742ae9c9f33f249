//! Shared state handed to every HTTP handler.

use crate::services::{
    object_store::DiskObjectStore, pipeline::ThumbnailPipeline, record_table::RecordTable,
    records::ThumbnailRecords,
};
use sqlx::SqlitePool;
use std::{num::NonZeroU32, sync::Arc};

/// Built once per process and cloned into handlers; every field is a cheap
/// handle onto shared collaborators.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub objects: DiskObjectStore,
    pub pipeline: ThumbnailPipeline,
    pub records: ThumbnailRecords,
    pub notify_on_upload: bool,
    pub region: String,
}

impl AppState {
    pub fn new(
        db: Arc<SqlitePool>,
        objects: DiskObjectStore,
        table: Arc<dyn RecordTable>,
        thumbnail_size: NonZeroU32,
        notify_on_upload: bool,
        region: impl Into<String>,
    ) -> Self {
        let pipeline = ThumbnailPipeline::new(Arc::new(objects.clone()), table.clone(), thumbnail_size);
        Self {
            db,
            objects,
            pipeline,
            records: ThumbnailRecords::new(table),
            notify_on_upload,
            region: region.into(),
        }
    }
}
