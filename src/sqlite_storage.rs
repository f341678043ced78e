//! SQLite-backed [`Storage`] implementation.
//!
//! Each namespace is one row of `kv_store`; saving replaces the row.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use deskmate_core::store::Storage;

/// SQLite implementation of the [`Storage`] port.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn load(&self, namespace: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE namespace = ?")
            .bind(namespace)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn save(&self, namespace: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (namespace, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(namespace) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(namespace)
        .bind(value)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        debug!(namespace, bytes = value.len(), "saved namespace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, migrate};
    use deskmate_core::chunk::ChunkingParams;
    use deskmate_core::models::NewDocument;
    use deskmate_core::store::KnowledgeBaseStore;
    use tempfile::TempDir;

    async fn storage_in(tmp: &TempDir) -> SqliteStorage {
        let pool = db::connect(&tmp.path().join("data/dm.sqlite")).await.unwrap();
        migrate::ensure_schema(&pool).await.unwrap();
        SqliteStorage::new(pool)
    }

    #[tokio::test]
    async fn test_load_missing_namespace() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp).await;
        assert!(storage.load("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_value() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp).await;
        storage.save("ns", "[1]").await.unwrap();
        storage.save("ns", "[1,2]").await.unwrap();
        assert_eq!(storage.load("ns").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_store_round_trips_through_sqlite() {
        let tmp = TempDir::new().unwrap();
        let kb_id = {
            let mut store =
                KnowledgeBaseStore::open(storage_in(&tmp).await, ChunkingParams::default())
                    .await
                    .unwrap();
            let kb = store.create("手册", "").await.unwrap();
            store
                .add_document(
                    &kb.id,
                    NewDocument {
                        file_name: "guide.md".to_string(),
                        file_type: "md".to_string(),
                        file_size: 12,
                        content: "部署流程。\n\n回滚步骤。".to_string(),
                    },
                )
                .await
                .unwrap();
            kb.id
        };

        let store = KnowledgeBaseStore::open(storage_in(&tmp).await, ChunkingParams::default())
            .await
            .unwrap();
        let kb = store.get(&kb_id).unwrap();
        assert_eq!(kb.name, "手册");
        assert_eq!(kb.total_chunks, 1);
        assert_eq!(kb.documents[0].chunks[0].source, "guide.md");
    }
}
