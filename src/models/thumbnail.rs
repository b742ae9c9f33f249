//! Represents the metadata record persisted for every generated thumbnail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the thumbnail table.
///
/// A record exists only for a thumbnail object that was successfully stored.
/// Deleting the record leaves the thumbnail object in place.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRecord {
    /// Generated at creation and never reused.
    pub id: Uuid,

    /// Locator of the thumbnail object.
    pub url: String,

    /// Human-readable estimate such as `"26.5 KB"`.
    pub approx_reduced_size: String,

    pub created_at: DateTime<Utc>,

    /// Equal to `created_at`; records are never updated in place.
    pub updated_at: DateTime<Utc>,
}
