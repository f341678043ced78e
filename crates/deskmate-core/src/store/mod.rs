//! Knowledge-base repository and its persistence port.
//!
//! [`KnowledgeBaseStore`] owns an in-memory snapshot of every knowledge
//! base and writes the whole collection back through a [`Storage`]
//! implementation after each mutation. The store is the only writer:
//! mutating methods take `&mut self`, so concurrent read-modify-write of
//! the aggregate counters is ruled out at compile time.
//!
//! # Operations
//!
//! | Method | Missing id |
//! |--------|------------|
//! | [`create`](KnowledgeBaseStore::create) | n/a |
//! | [`get`](KnowledgeBaseStore::get) | `None` |
//! | [`update`](KnowledgeBaseStore::update) | `Ok(None)` |
//! | [`delete`](KnowledgeBaseStore::delete) | `Ok(false)` |
//! | [`add_document`](KnowledgeBaseStore::add_document) | `Ok(None)` |
//! | [`remove_document`](KnowledgeBaseStore::remove_document) | `Ok(false)` |
//!
//! `Err` is only returned when the persistence port fails; the in-memory
//! collection is then left exactly as it was before the call.

pub mod memory;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunk::{chunk_text_with, ChunkingParams};
use crate::models::{Document, DocumentStatus, KnowledgeBase, KnowledgeBaseUpdate, NewDocument};

/// Namespace under which the knowledge-base collection is persisted.
pub const KB_NAMESPACE: &str = "knowledge_bases";

/// Namespaced string persistence, the shape of a browser's localStorage.
///
/// All operations are async (via `async-trait`) so that database-backed
/// implementations fit; in-memory implementations return
/// immediately-ready futures.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `namespace`, if any.
    async fn load(&self, namespace: &str) -> Result<Option<String>>;

    /// Replace the value stored under `namespace`.
    async fn save(&self, namespace: &str, value: &str) -> Result<()>;
}

/// Repository of knowledge bases backed by a [`Storage`] port.
pub struct KnowledgeBaseStore<S: Storage> {
    storage: S,
    bases: Vec<KnowledgeBase>,
    chunking: ChunkingParams,
}

impl<S: Storage> KnowledgeBaseStore<S> {
    /// Load the persisted collection, or start empty if none exists.
    pub async fn open(storage: S, chunking: ChunkingParams) -> Result<Self> {
        let bases = match storage.load(KB_NAMESPACE).await? {
            Some(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse persisted '{}'", KB_NAMESPACE))?,
            None => Vec::new(),
        };
        Ok(Self {
            storage,
            bases,
            chunking,
        })
    }

    pub fn list(&self) -> &[KnowledgeBase] {
        &self.bases
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeBase> {
        self.bases.iter().find(|kb| kb.id == id)
    }

    /// Find by id, falling back to an exact name match.
    pub fn resolve(&self, id_or_name: &str) -> Option<&KnowledgeBase> {
        self.get(id_or_name)
            .or_else(|| self.bases.iter().find(|kb| kb.name == id_or_name))
    }

    pub fn chunking(&self) -> &ChunkingParams {
        &self.chunking
    }

    pub async fn create(&mut self, name: &str, description: &str) -> Result<KnowledgeBase> {
        let now = now_millis();
        let kb = KnowledgeBase {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            documents: Vec::new(),
            total_chunks: 0,
            total_size: 0,
            created_at: now,
            updated_at: now,
        };
        let mut next = self.bases.clone();
        next.push(kb.clone());
        self.commit(next).await?;
        info!(kb = %kb.id, name = %kb.name, "created knowledge base");
        Ok(kb)
    }

    pub async fn update(
        &mut self,
        id: &str,
        changes: KnowledgeBaseUpdate,
    ) -> Result<Option<KnowledgeBase>> {
        let mut next = self.bases.clone();
        let Some(kb) = next.iter_mut().find(|kb| kb.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            kb.name = name;
        }
        if let Some(description) = changes.description {
            kb.description = description;
        }
        kb.updated_at = now_millis();
        let updated = kb.clone();
        self.commit(next).await?;
        Ok(Some(updated))
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let mut next = self.bases.clone();
        next.retain(|kb| kb.id != id);
        if next.len() == self.bases.len() {
            return Ok(false);
        }
        self.commit(next).await?;
        info!(kb = %id, "deleted knowledge base");
        Ok(true)
    }

    /// Chunk `doc.content`, append the document, and refresh the totals.
    pub async fn add_document(&mut self, kb_id: &str, doc: NewDocument) -> Result<Option<Document>> {
        let mut next = self.bases.clone();
        let Some(kb) = next.iter_mut().find(|kb| kb.id == kb_id) else {
            return Ok(None);
        };

        let chunks = chunk_text_with(&doc.content, &doc.file_name, &self.chunking);
        let status = if chunks.is_empty() {
            DocumentStatus::Empty
        } else {
            DocumentStatus::Ready
        };
        let document = Document {
            id: Uuid::new_v4().to_string(),
            content_hash: content_hash(&doc.content),
            file_name: doc.file_name,
            file_type: doc.file_type,
            file_size: doc.file_size,
            content: doc.content,
            chunks,
            uploaded_at: now_millis(),
            status,
        };
        debug!(
            kb = %kb_id,
            file = %document.file_name,
            chunks = document.chunks.len(),
            "chunked document"
        );

        kb.documents.push(document.clone());
        kb.recompute_totals();
        kb.updated_at = now_millis();
        self.commit(next).await?;
        Ok(Some(document))
    }

    pub async fn remove_document(&mut self, kb_id: &str, doc_id: &str) -> Result<bool> {
        let mut next = self.bases.clone();
        let Some(kb) = next.iter_mut().find(|kb| kb.id == kb_id) else {
            return Ok(false);
        };
        let before = kb.documents.len();
        kb.documents.retain(|d| d.id != doc_id);
        if kb.documents.len() == before {
            return Ok(false);
        }
        kb.recompute_totals();
        kb.updated_at = now_millis();
        self.commit(next).await?;
        Ok(true)
    }

    /// Re-chunk every document of a knowledge base with `params`.
    ///
    /// Returns the new chunk total, or `None` if the id is unknown.
    pub async fn reindex(&mut self, kb_id: &str, params: ChunkingParams) -> Result<Option<usize>> {
        let mut next = self.bases.clone();
        let Some(kb) = next.iter_mut().find(|kb| kb.id == kb_id) else {
            return Ok(None);
        };
        for doc in &mut kb.documents {
            doc.chunks = chunk_text_with(&doc.content, &doc.file_name, &params);
            doc.status = if doc.chunks.is_empty() {
                DocumentStatus::Empty
            } else {
                DocumentStatus::Ready
            };
        }
        kb.recompute_totals();
        kb.updated_at = now_millis();
        let total = kb.total_chunks;
        self.commit(next).await?;
        self.chunking = params;
        Ok(Some(total))
    }

    /// A document in `kb_id` whose content hashes to `hash`.
    pub fn find_document_by_hash(&self, kb_id: &str, hash: &str) -> Option<&Document> {
        self.get(kb_id)?
            .documents
            .iter()
            .find(|d| d.content_hash == hash)
    }

    /// Save `next` and make it the current collection. If the port fails
    /// the current collection is left as it was.
    async fn commit(&mut self, next: Vec<KnowledgeBase>) -> Result<()> {
        let raw = serde_json::to_string(&next)?;
        self.storage
            .save(KB_NAMESPACE, &raw)
            .await
            .context("Failed to persist knowledge bases")?;
        self.bases = next;
        Ok(())
    }
}

/// SHA-256 of `content`, hex encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
