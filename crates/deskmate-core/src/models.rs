//! Core data models for knowledge bases, documents, and chunks.
//!
//! These types are persisted as one JSON array per namespace, so every
//! field name is serialised in camelCase.

use serde::{Deserialize, Serialize};

/// A bounded slice of a document's text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: String,
    pub content: String,
    /// Name of the originating document.
    pub source: String,
    pub chunk_index: usize,
    /// Number of chunks the source document produced.
    pub total_chunks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Chunking produced at least one chunk.
    Ready,
    /// The content yielded no chunks (blank or whitespace only).
    Empty,
}

/// A document owned by exactly one [`KnowledgeBase`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub content: String,
    /// SHA-256 of `content`, hex encoded.
    #[serde(default)]
    pub content_hash: String,
    pub chunks: Vec<Chunk>,
    /// Unix milliseconds.
    pub uploaded_at: i64,
    pub status: DocumentStatus,
}

/// Input for [`KnowledgeBaseStore::add_document`](crate::store::KnowledgeBaseStore::add_document).
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub content: String,
}

/// A named collection of documents.
///
/// `total_chunks` and `total_size` are derived from `documents` and are
/// recomputed by the store on every document mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub documents: Vec<Document>,
    pub total_chunks: usize,
    pub total_size: u64,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds.
    pub updated_at: i64,
}

impl KnowledgeBase {
    /// Recompute `total_chunks` and `total_size` from the documents.
    pub fn recompute_totals(&mut self) {
        self.total_chunks = self.documents.iter().map(|d| d.chunks.len()).sum();
        self.total_size = self.documents.iter().map(|d| d.file_size).sum();
    }

    /// All chunks in document order, then chunk order within a document.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.documents.iter().flat_map(|d| d.chunks.iter())
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }
}

/// Partial metadata edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBaseUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl KnowledgeBaseUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
