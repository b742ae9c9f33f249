//! Represents an object (file) stored in a bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Canned access level of a stored object.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum Visibility {
    Private,
    PublicRead,
}

impl Visibility {
    /// Interpret an `x-amz-acl` canned ACL value.
    ///
    /// Only `public-read` grants anonymous reads; anything else stays private.
    pub fn from_canned_acl(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("public-read") {
            Visibility::PublicRead
        } else {
            Visibility::Private
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::PublicRead => "public-read",
        }
    }
}

/// Metadata of a single object (blob) within a bucket.
///
/// The payload bytes live on disk; this row only describes them.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct StoredObject {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Name of the bucket holding the object.
    pub bucket: String,

    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Content type (MIME type).
    pub content_type: Option<String>,

    /// Size in bytes.
    pub size_bytes: i64,

    /// MD5 checksum of the payload.
    pub etag: Option<String>,

    /// Who may read the object anonymously.
    pub visibility: Visibility,

    /// Timestamp when object was last written.
    pub last_modified: DateTime<Utc>,
}
