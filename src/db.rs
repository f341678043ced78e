//! Database connection and store bootstrap.

use anyhow::{Context, Result};
use deskmate_core::store::KnowledgeBaseStore;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::config::Config;
use crate::migrate;
use crate::sqlite_storage::SqliteStorage;

/// Open (creating if needed) the SQLite file at `db_path` in WAL mode.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    Ok(pool)
}

/// Connect, make sure the schema exists, and load the knowledge bases.
pub async fn open_store(config: &Config) -> Result<KnowledgeBaseStore<SqliteStorage>> {
    let pool = connect(&config.db.path).await?;
    migrate::ensure_schema(&pool).await?;
    KnowledgeBaseStore::open(SqliteStorage::new(pool), config.chunking.params()).await
}
