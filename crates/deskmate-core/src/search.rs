//! Keyword-frequency retrieval over a knowledge base.
//!
//! The [`Retriever`] trait is the seam between callers (prompt assembly,
//! the CLI) and the scoring strategy. [`KeywordRetriever`] is the only
//! implementation today; an embedding-backed retriever can replace it
//! without touching callers.
//!
//! # Scoring Algorithm
//!
//! 1. Split the query on whitespace, drop tokens of one character or
//!    less, lower-case the rest.
//! 2. For every chunk of every document, count non-overlapping
//!    occurrences of each keyword in the lower-cased chunk text and sum
//!    them into the chunk score.
//! 3. Stable sort by score (desc), so ties keep document order, then
//!    chunk order.
//! 4. Drop zero scores and truncate to `top_k`.

use serde::Serialize;

use crate::models::{Chunk, KnowledgeBase};

/// Number of chunks returned when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 3;

/// A chunk paired with its keyword score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: usize,
}

/// Selects the chunks of a knowledge base most relevant to a query.
pub trait Retriever {
    /// Returns at most `top_k` chunks ordered by descending relevance.
    fn retrieve(&self, kb: &KnowledgeBase, query: &str, top_k: usize) -> Vec<Chunk>;
}

/// Keyword-overlap retriever. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRetriever;

impl Retriever for KeywordRetriever {
    fn retrieve(&self, kb: &KnowledgeBase, query: &str, top_k: usize) -> Vec<Chunk> {
        retrieve(kb, query, top_k)
    }
}

/// Retrieve the `top_k` best keyword matches from `kb`.
///
/// An empty keyword set (blank query, or only single-character tokens)
/// yields an empty result; callers are expected to fall back to a
/// generic preview of the knowledge base.
pub fn retrieve(kb: &KnowledgeBase, query: &str, top_k: usize) -> Vec<Chunk> {
    retrieve_scored(kb, query, top_k)
        .into_iter()
        .map(|sc| sc.chunk)
        .collect()
}

/// Same as [`retrieve`] but keeps each chunk's score.
pub fn retrieve_scored(kb: &KnowledgeBase, query: &str, top_k: usize) -> Vec<ScoredChunk> {
    let keywords = extract_keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredChunk> = kb
        .chunks()
        .map(|chunk| ScoredChunk {
            score: score_chunk(&chunk.content, &keywords),
            chunk: chunk.clone(),
        })
        .collect();

    // `sort_by` is stable: equal scores keep flatten order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.retain(|sc| sc.score > 0);
    scored.truncate(top_k);
    scored
}

/// Lower-cased whitespace tokens longer than one character.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

/// Sum of non-overlapping occurrences of each keyword in `content`.
///
/// Keywords must already be lower-cased (see [`extract_keywords`]).
pub fn score_chunk(content: &str, keywords: &[String]) -> usize {
    let haystack = content.to_lowercase();
    keywords
        .iter()
        .map(|k| haystack.matches(k.as_str()).count())
        .sum()
}
