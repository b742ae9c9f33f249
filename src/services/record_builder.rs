//! Builds the metadata record written after a thumbnail is stored.

use crate::models::thumbnail::ThumbnailRecord;
use chrono::Utc;
use uuid::Uuid;

/// Fixed estimate of thumbnail size relative to the original upload.
pub const SIZE_REDUCTION_FACTOR: f64 = 0.53;

/// `(size_bytes * 0.53) / 1000` rendered as a decimal with a `" KB"` unit.
///
/// Integral values keep one fractional digit (`"5.0 KB"`); everything else
/// uses the shortest representation that round-trips (`"26.5 KB"`).
pub fn approx_reduced_size(size_bytes: u64) -> String {
    let kilobytes = (size_bytes as f64 * SIZE_REDUCTION_FACTOR) / 1000.0;
    format!("{} KB", format_decimal(kilobytes))
}

fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// New record for a thumbnail reachable at `url`, created from an original of
/// `original_size_bytes`.
pub fn build_record(url: impl Into<String>, original_size_bytes: u64) -> ThumbnailRecord {
    let now = Utc::now();
    ThumbnailRecord {
        id: Uuid::new_v4(),
        url: url.into(),
        approx_reduced_size: approx_reduced_size(original_size_bytes),
        created_at: now,
        updated_at: now,
    }
}
