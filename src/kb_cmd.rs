//! `dm kb ...`: knowledge-base management commands.
//!
//! Every command accepts a knowledge base by id or exact name. An unknown
//! knowledge base or document prints an error to stderr and exits with
//! status 1.

use anyhow::{bail, Result};
use std::path::PathBuf;

use deskmate_core::models::KnowledgeBaseUpdate;
use deskmate_core::store::{KnowledgeBaseStore, Storage};

use crate::config::Config;
use crate::db;
use crate::ingest::ingest_paths;

/// Id of the knowledge base named by `id_or_name`, or exit(1).
pub(crate) fn resolve_or_exit<S: Storage>(store: &KnowledgeBaseStore<S>, id_or_name: &str) -> String {
    match store.resolve(id_or_name) {
        Some(kb) => kb.id.clone(),
        None => {
            eprintln!("Error: knowledge base not found: {}", id_or_name);
            std::process::exit(1);
        }
    }
}

pub async fn run_kb_create(config: &Config, name: &str, description: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Knowledge base name must not be empty");
    }
    let mut store = db::open_store(config).await?;
    let kb = store.create(name.trim(), description).await?;
    println!("Created knowledge base: {}", kb.name);
    println!("id: {}", kb.id);
    Ok(())
}

pub async fn run_kb_list(config: &Config) -> Result<()> {
    let store = db::open_store(config).await?;
    if store.list().is_empty() {
        println!("No knowledge bases.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<20}  {:>5}  {:>7}  {:>10}",
        "ID", "NAME", "DOCS", "CHUNKS", "SIZE"
    );
    for kb in store.list() {
        println!(
            "{:<36}  {:<20}  {:>5}  {:>7}  {:>10}",
            kb.id,
            kb.name,
            kb.documents.len(),
            kb.total_chunks,
            format_bytes(kb.total_size)
        );
    }
    Ok(())
}

pub async fn run_kb_show(config: &Config, kb: &str) -> Result<()> {
    let store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);
    let Some(kb) = store.get(&id) else {
        return Ok(());
    };

    println!("--- Knowledge Base ---");
    println!("id:          {}", kb.id);
    println!("name:        {}", kb.name);
    if !kb.description.is_empty() {
        println!("description: {}", kb.description);
    }
    println!("created_at:  {}", format_ts(kb.created_at));
    println!("updated_at:  {}", format_ts(kb.updated_at));
    println!("chunks:      {}", kb.total_chunks);
    println!("size:        {}", format_bytes(kb.total_size));
    println!();

    println!("--- Documents ({}) ---", kb.documents.len());
    for doc in &kb.documents {
        println!(
            "{}  {}  [{}]  {} chunks  {}  {}",
            doc.id,
            doc.file_name,
            doc.file_type,
            doc.chunks.len(),
            format_bytes(doc.file_size),
            format_ts(doc.uploaded_at)
        );
    }
    Ok(())
}

pub async fn run_kb_update(
    config: &Config,
    kb: &str,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let changes = KnowledgeBaseUpdate { name, description };
    if changes.is_empty() {
        bail!("Nothing to update: pass --name and/or --description");
    }

    let mut store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);
    if let Some(updated) = store.update(&id, changes).await? {
        println!("Updated knowledge base: {}", updated.name);
    }
    Ok(())
}

pub async fn run_kb_delete(config: &Config, kb: &str) -> Result<()> {
    let mut store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);
    if store.delete(&id).await? {
        println!("Deleted knowledge base: {}", id);
    }
    Ok(())
}

pub async fn run_kb_add(config: &Config, kb: &str, paths: &[PathBuf]) -> Result<()> {
    let mut store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);

    let report = ingest_paths(&mut store, &id, paths, &config.ingest).await?;
    for (file_name, doc_id) in &report.added {
        println!("  + {} ({})", file_name, doc_id);
    }
    for path in &report.skipped_duplicate {
        println!("  = {} (duplicate)", path.display());
    }
    for (path, reason) in &report.failed {
        println!("  ! {}: {}", path.display(), reason);
    }

    let total_chunks = store.get(&id).map(|kb| kb.total_chunks).unwrap_or(0);
    println!(
        "Added {} document(s), skipped {} duplicate(s), {} failed. Knowledge base now has {} chunks.",
        report.added.len(),
        report.skipped_duplicate.len(),
        report.failed.len(),
        total_chunks
    );
    Ok(())
}

pub async fn run_kb_remove(config: &Config, kb: &str, doc_id: &str) -> Result<()> {
    let mut store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);
    if !store.remove_document(&id, doc_id).await? {
        eprintln!("Error: document not found: {}", doc_id);
        std::process::exit(1);
    }
    println!("Removed document: {}", doc_id);
    Ok(())
}

pub async fn run_kb_reindex(config: &Config, kb: &str) -> Result<()> {
    let mut store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);
    if let Some(total) = store.reindex(&id, config.chunking.params()).await? {
        println!("Reindexed {}: {} chunks", id, total);
    }
    Ok(())
}

/// Format a byte count as a human-readable string.
pub(crate) fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn format_ts(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}
