//! Key-value table holding thumbnail records.
//!
//! [`RecordTable`] mirrors a managed key-value store: single-item put, get and
//! delete by id, plus a paginated scan driven by opaque continuation tokens.
//! [`SqliteRecordTable`] implements it on the shared SQLite pool.

use crate::models::thumbnail::ThumbnailRecord;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table name `{0}` is invalid: use ASCII letters, digits and underscores")]
    InvalidTableName(String),
    #[error("continuation token `{0}` is invalid")]
    InvalidContinuationToken(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type TableResult<T> = Result<T, TableError>;

/// One page of a table scan.
#[derive(Debug, Default)]
pub struct ScanPage {
    pub items: Vec<ThumbnailRecord>,
    /// Present when more items follow; pass it back to `scan`.
    pub next_token: Option<String>,
}

#[async_trait]
pub trait RecordTable: Send + Sync {
    async fn put_item(&self, record: &ThumbnailRecord) -> TableResult<()>;

    async fn get_item(&self, id: Uuid) -> TableResult<Option<ThumbnailRecord>>;

    /// Returns `true` when an item was removed.
    async fn delete_item(&self, id: Uuid) -> TableResult<bool>;

    async fn scan(&self, continuation_token: Option<&str>) -> TableResult<ScanPage>;
}

pub const DEFAULT_SCAN_PAGE_SIZE: usize = 100;
const MAX_SCAN_PAGE_SIZE: usize = 1000;

const RECORD_COLUMNS: &str = "id, url, approx_reduced_size, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteRecordTable {
    db: Arc<SqlitePool>,
    table: String,
    page_size: usize,
}

impl SqliteRecordTable {
    /// The table name ends up inside SQL text, so only `[A-Za-z0-9_]` is accepted.
    pub fn new(db: Arc<SqlitePool>, table: impl Into<String>, page_size: usize) -> TableResult<Self> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(TableError::InvalidTableName(table));
        }
        Ok(Self {
            db,
            table,
            page_size: page_size.clamp(1, MAX_SCAN_PAGE_SIZE),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Create the backing table if it does not exist yet.
    pub async fn create_table(&self) -> TableResult<()> {
        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                id                  BLOB PRIMARY KEY,
                url                 TEXT NOT NULL,
                approx_reduced_size TEXT NOT NULL,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            )"#,
            self.table
        ))
        .execute(&*self.db)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordTable for SqliteRecordTable {
    async fn put_item(&self, record: &ThumbnailRecord) -> TableResult<()> {
        sqlx::query(&format!(
            r#"INSERT INTO "{}" ({RECORD_COLUMNS}) VALUES (?, ?, ?, ?, ?)"#,
            self.table
        ))
        .bind(record.id)
        .bind(&record.url)
        .bind(&record.approx_reduced_size)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.db)
        .await?;
        debug!(id = %record.id, table = %self.table, "record stored");
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> TableResult<Option<ThumbnailRecord>> {
        let record = sqlx::query_as::<_, ThumbnailRecord>(&format!(
            r#"SELECT {RECORD_COLUMNS} FROM "{}" WHERE id = ?"#,
            self.table
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(record)
    }

    async fn delete_item(&self, id: Uuid) -> TableResult<bool> {
        let result = sqlx::query(&format!(r#"DELETE FROM "{}" WHERE id = ?"#, self.table))
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Items come back ordered by id; the token is the last id of the page.
    async fn scan(&self, continuation_token: Option<&str>) -> TableResult<ScanPage> {
        let fetch_limit = self.page_size + 1;

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            r#"SELECT {RECORD_COLUMNS} FROM "{}""#,
            self.table
        ));
        if let Some(token) = continuation_token {
            builder.push(" WHERE id > ");
            builder.push_bind(decode_continuation_token(token)?);
        }
        builder.push(" ORDER BY id ASC LIMIT ");
        builder.push_bind(fetch_limit as i64);

        let mut items: Vec<ThumbnailRecord> =
            builder.build_query_as().fetch_all(&*self.db).await?;

        let mut next_token = None;
        if items.len() == fetch_limit {
            items.pop();
            next_token = items.last().map(|last| encode_continuation_token(last.id));
        }

        Ok(ScanPage { items, next_token })
    }
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn encode_continuation_token(id: Uuid) -> String {
    general_purpose::STANDARD.encode(id.to_string())
}

fn decode_continuation_token(token: &str) -> TableResult<Uuid> {
    general_purpose::STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|text| Uuid::parse_str(&text).ok())
        .ok_or_else(|| TableError::InvalidContinuationToken(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{record_builder::build_record, testing::sqlite_pool};
    use std::collections::HashSet;

    async fn table(page_size: usize) -> SqliteRecordTable {
        let table = SqliteRecordTable::new(sqlite_pool().await, "thumbnails", page_size).unwrap();
        table.create_table().await.unwrap();
        table
    }

    #[tokio::test]
    async fn put_get_delete() {
        let table = table(10).await;
        let record = build_record("http://localhost/b/a_thumbnail.png", 10_000);
        table.put_item(&record).await.unwrap();

        let fetched = table.get_item(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.url, record.url);
        assert_eq!(fetched.approx_reduced_size, "5.3 KB");
        assert_eq!(fetched.created_at, record.created_at);

        assert!(table.delete_item(record.id).await.unwrap());
        assert!(table.get_item(record.id).await.unwrap().is_none());
        assert!(!table.delete_item(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn scan_pages_cover_every_item_once() {
        let table = table(2).await;
        let mut expected = HashSet::new();
        for i in 0..5u64 {
            let record = build_record(format!("u{i}"), i * 1000);
            expected.insert(record.id);
            table.put_item(&record).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut pages = 0;
        let mut token: Option<String> = None;
        loop {
            let page = table.scan(token.as_deref()).await.unwrap();
            pages += 1;
            assert!(page.items.len() <= 2);
            seen.extend(page.items.iter().map(|r| r.id));
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(seen.len(), 5);
        assert_eq!(seen.iter().copied().collect::<HashSet<_>>(), expected);
    }

    #[tokio::test]
    async fn exact_page_multiple_has_no_trailing_token() {
        let table = table(2).await;
        for i in 0..2 {
            table.put_item(&build_record(format!("u{i}"), 1)).await.unwrap();
        }
        let page = table.scan(None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_token.is_none());
    }

    #[tokio::test]
    async fn bad_token_is_rejected() {
        let table = table(2).await;
        let err = table.scan(Some("%%%")).await.unwrap_err();
        assert!(matches!(err, TableError::InvalidContinuationToken(_)));
    }

    #[tokio::test]
    async fn table_name_is_validated() {
        let db = sqlite_pool().await;
        assert!(SqliteRecordTable::new(db.clone(), "thumbs_v2", 10).is_ok());
        assert!(matches!(
            SqliteRecordTable::new(db.clone(), "thumbs; DROP TABLE objects", 10),
            Err(TableError::InvalidTableName(_))
        ));
        assert!(SqliteRecordTable::new(db, "", 10).is_err());
    }

    #[test]
    fn token_encoding_is_reversible() {
        let id = Uuid::new_v4();
        assert_eq!(decode_continuation_token(&encode_continuation_token(id)).unwrap(), id);
    }
}
