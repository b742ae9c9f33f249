//! Output key naming for generated thumbnails.

/// Appended to the base name of every generated thumbnail.
pub const THUMBNAIL_SUFFIX: &str = "_thumbnail.png";

/// Derive the thumbnail key from the original key.
///
/// The last extension is dropped (split once on the final `.`). A key without
/// any `.` keeps its full text as the base.
pub fn thumbnail_key(key: &str) -> String {
    let base = key.rsplit_once('.').map_or(key, |(base, _)| base);
    format!("{base}{THUMBNAIL_SUFFIX}")
}

/// True for keys this service produced itself; those never trigger a new run.
pub fn is_thumbnail_key(key: &str) -> bool {
    key.ends_with(THUMBNAIL_SUFFIX)
}
