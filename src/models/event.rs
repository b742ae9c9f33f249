//! Upload notifications delivered by the event trigger.
//!
//! The wire shape follows S3 event notifications:
//!
//! ```json
//! {"Records": [{"s3": {"bucket": {"name": "b"}, "object": {"key": "a.jpg", "size": 123}}}]}
//! ```
//!
//! Payloads are parsed into typed structs and validated here so that nothing
//! downstream indexes into raw JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event payload contains no records")]
    NoRecords,
    #[error("event field `{0}` must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records")]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    pub key: String,
    pub size: u64,
}

/// A validated "object was uploaded" event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadNotification {
    pub bucket: String,
    pub key: String,
    pub size_bytes: u64,
}

impl UploadNotification {
    /// Parse a raw S3-style notification body.
    pub fn from_json(body: &[u8]) -> Result<Self, EventError> {
        let event: S3Event = serde_json::from_slice(body)?;
        Self::try_from(event)
    }
}

impl TryFrom<S3Event> for UploadNotification {
    type Error = EventError;

    /// Only the first record is used; one invocation handles one image.
    fn try_from(event: S3Event) -> Result<Self, Self::Error> {
        let record = event
            .records
            .into_iter()
            .next()
            .ok_or(EventError::NoRecords)?;

        let S3Entity { bucket, object } = record.s3;
        if bucket.name.trim().is_empty() {
            return Err(EventError::EmptyField("s3.bucket.name"));
        }
        if object.key.is_empty() {
            return Err(EventError::EmptyField("s3.object.key"));
        }

        Ok(Self {
            bucket: bucket.name,
            key: object.key,
            size_bytes: object.size,
        })
    }
}
