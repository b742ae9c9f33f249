//! SQLite connection setup and schema management.

use crate::services::record_table::SqliteRecordTable;
use anyhow::{Context, Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr};

const OBJECT_SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Open the pool, creating the database file and its directory when missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let db_path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    if db_path != ":memory:" {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating database directory {:?}", parent))?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parsing database url `{}`", database_url))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("connecting to {}", database_url))?;
    Ok(pool)
}

/// Create the object metadata table and its indexes.
pub async fn apply_object_schema(db: &SqlitePool) -> Result<()> {
    let statements = OBJECT_SCHEMA
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }
    Ok(())
}

/// Bring every table the service uses up to date. Safe to run repeatedly.
pub async fn run_migrations(db: &SqlitePool, records: &SqliteRecordTable) -> Result<()> {
    apply_object_schema(db).await?;
    records
        .create_table()
        .await
        .with_context(|| format!("creating record table `{}`", records.table_name()))?;
    Ok(())
}
