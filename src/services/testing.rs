//! In-memory collaborators and fixtures shared by unit tests.

use crate::{
    db,
    models::{
        object::{StoredObject, Visibility},
        thumbnail::ThumbnailRecord,
    },
    services::{
        object_store::{ObjectStore, StorageError, StorageResult},
        record_table::{RecordTable, ScanPage, TableError, TableResult},
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::{
    collections::HashMap,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use uuid::Uuid;

/// Single-connection in-memory SQLite with the object schema applied.
///
/// One connection only: every `sqlite::memory:` connection is its own database.
pub async fn sqlite_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::apply_object_schema(&pool).await.unwrap();
    Arc::new(pool)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Bytes {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let bytes = crate::services::codec::encode(&image, ImageFormat::Jpeg).unwrap();
    Bytes::from(bytes)
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), (StoredObject, Bytes)>>,
    reject_writes: bool,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn rejecting_writes() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// Seed an object without counting it as a `put`.
    pub fn insert(&self, bucket: &str, key: &str, body: Bytes) {
        let object = stored_object(bucket, key, &body, "application/octet-stream", Visibility::Private);
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), (object, body));
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<(StoredObject, Bytes)> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

fn stored_object(
    bucket: &str,
    key: &str,
    body: &Bytes,
    content_type: &str,
    visibility: Visibility,
) -> StoredObject {
    StoredObject {
        id: Uuid::new_v4(),
        bucket: bucket.to_string(),
        key: key.to_string(),
        content_type: Some(content_type.to_string()),
        size_bytes: body.len() as i64,
        etag: Some(format!("{:x}", md5::compute(body))),
        visibility,
        last_modified: Utc::now(),
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.object(bucket, key)
            .map(|(_, body)| body)
            .ok_or_else(|| StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> StorageResult<StoredObject> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.reject_writes {
            return Err(StorageError::Io(io::Error::other("write rejected")));
        }
        let object = stored_object(bucket, key, &body, content_type, visibility);
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), (object.clone(), body));
        Ok(object)
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("http://objects.test/{bucket}/{key}")
    }
}

/// Insertion-ordered table; continuation tokens are item offsets.
pub struct MemoryRecordTable {
    items: Mutex<Vec<ThumbnailRecord>>,
    page_size: usize,
    failing: bool,
    scans: AtomicUsize,
}

impl Default for MemoryRecordTable {
    fn default() -> Self {
        Self::with_page_size(100)
    }
}

impl MemoryRecordTable {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            page_size: page_size.max(1),
            failing: false,
            scans: AtomicUsize::new(0),
        }
    }

    /// Every operation fails with a backend error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, record: ThumbnailRecord) {
        self.items.lock().unwrap().push(record);
    }

    pub fn records(&self) -> Vec<ThumbnailRecord> {
        self.items.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn scan_calls(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    fn check(&self) -> TableResult<()> {
        if self.failing {
            Err(TableError::Sqlx(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordTable for MemoryRecordTable {
    async fn put_item(&self, record: &ThumbnailRecord) -> TableResult<()> {
        self.check()?;
        self.insert(record.clone());
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> TableResult<Option<ThumbnailRecord>> {
        self.check()?;
        Ok(self.records().into_iter().find(|r| r.id == id))
    }

    async fn delete_item(&self, id: Uuid) -> TableResult<bool> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|r| r.id != id);
        Ok(items.len() != before)
    }

    async fn scan(&self, continuation_token: Option<&str>) -> TableResult<ScanPage> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let start = match continuation_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| TableError::InvalidContinuationToken(token.to_string()))?,
            None => 0,
        };
        let items = self.items.lock().unwrap();
        let end = (start + self.page_size).min(items.len());
        let page = items.get(start..end).unwrap_or_default().to_vec();
        let next_token = (end < items.len()).then(|| end.to_string());
        Ok(ScanPage {
            items: page,
            next_token,
        })
    }
}
