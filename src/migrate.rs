use anyhow::Result;
use sqlx::SqlitePool;
use tracing::debug;

use crate::config::Config;
use crate::db;

/// Create the database file and schema. Safe to run repeatedly.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(&config.db.path).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    // One row per namespace, the value is an opaque JSON document.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            namespace TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    debug!("kv_store schema ready");
    Ok(())
}
