//! Read and delete access to persisted thumbnail records.

use crate::{
    models::thumbnail::ThumbnailRecord,
    services::record_table::{RecordTable, TableError},
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("thumbnail record `{0}` not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Clone)]
pub struct ThumbnailRecords {
    table: Arc<dyn RecordTable>,
}

impl ThumbnailRecords {
    pub fn new(table: Arc<dyn RecordTable>) -> Self {
        Self { table }
    }

    pub async fn get(&self, id: Uuid) -> Result<ThumbnailRecord, RecordError> {
        self.table
            .get_item(id)
            .await?
            .ok_or(RecordError::NotFound(id))
    }

    /// Every record in the table, following continuation tokens until the
    /// scan is exhausted. Pages are concatenated in the order the table
    /// returns them.
    pub async fn list_all(&self) -> Result<Vec<ThumbnailRecord>, RecordError> {
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.table.scan(token.as_deref()).await?;
            records.extend(page.items);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(records)
    }

    /// Removes the record only. The thumbnail object it points at stays in
    /// the object store.
    pub async fn delete(&self, id: Uuid) -> Result<Uuid, RecordError> {
        if self.table.delete_item(id).await? {
            Ok(id)
        } else {
            Err(RecordError::NotFound(id))
        }
    }
}
