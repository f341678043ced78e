//! Paragraph- and sentence-boundary text chunker with overlap.
//!
//! Splits document text into [`Chunk`]s of at most `chunk_size`
//! characters. Paragraphs (separated by blank lines) are packed together
//! while they fit; a paragraph that is too large on its own is broken into
//! sentences and packed sentence by sentence.
//!
//! Whenever a full buffer is flushed to make room, the next buffer is
//! seeded with the last `chunk_overlap` characters of the flushed one so
//! neighbouring chunks share context. The seed may cut a sentence in half.
//!
//! # Algorithm
//!
//! 1. Split text on `\n\n` boundaries, trim, drop blank paragraphs.
//! 2. A paragraph longer than `chunk_size` flushes the buffer, then each of
//!    its sentences is appended; when a sentence does not fit, flush and
//!    reseed with the overlap tail followed by the sentence.
//! 3. Otherwise, if joining the paragraph with a blank line would exceed
//!    `chunk_size`, flush and reseed with the overlap tail followed by the
//!    paragraph.
//! 4. Otherwise append the paragraph, separated by a blank line.
//! 5. Flush the remainder, number the chunks, back-fill `total_chunks`.
//!
//! All lengths are counted in `char`s, so CJK text is measured the same
//! way as ASCII.
//!
//! # Example
//!
//! ```rust
//! use deskmate_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("Hello world.\n\nSecond paragraph.", "notes.md");
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].source, "notes.md");
//! assert_eq!(chunks[0].total_chunks, 1);
//! ```

use uuid::Uuid;

use crate::models::Chunk;

/// Target maximum characters per chunk.
pub const CHUNK_SIZE: usize = 500;

/// Characters carried from a flushed chunk into the next one.
pub const CHUNK_OVERLAP: usize = 50;

/// Characters that end a sentence. The terminator stays with its sentence.
const SENTENCE_TERMINATORS: [char; 6] = ['。', '！', '？', '.', '!', '?'];

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Chunk sizing, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingParams {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            chunk_overlap: CHUNK_OVERLAP,
        }
    }
}

/// Split `content` into chunks using the default [`CHUNK_SIZE`] and
/// [`CHUNK_OVERLAP`]. Every chunk's `source` is `source_name`.
///
/// Empty or whitespace-only content yields no chunks.
pub fn chunk_text(content: &str, source_name: &str) -> Vec<Chunk> {
    chunk_text_with(content, source_name, &ChunkingParams::default())
}

/// Split `content` into chunks with explicit sizing.
///
/// # Guarantees
///
/// - Indices are contiguous `0..N` and every chunk has `total_chunks == N`.
/// - No chunk is empty after trimming.
/// - A chunk only exceeds `chunk_size + chunk_overlap` characters when it
///   holds a single sentence longer than `chunk_size`. The largest reseed
///   is an overlap tail followed by a piece that fit on its own.
pub fn chunk_text_with(content: &str, source_name: &str, params: &ChunkingParams) -> Vec<Chunk> {
    let mut pieces: Vec<String> = Vec::new();
    let mut buf = String::new();

    let paragraphs = content
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty());

    for paragraph in paragraphs {
        let para_len = char_len(paragraph);

        if para_len > params.chunk_size {
            flush(&mut pieces, &buf);
            buf.clear();

            for sentence in split_sentences(paragraph) {
                if !buf.is_empty() && char_len(&buf) + char_len(sentence) > params.chunk_size {
                    flush(&mut pieces, &buf);
                    buf = reseed(&buf, sentence, params.chunk_overlap);
                } else {
                    buf.push_str(sentence);
                }
            }
        } else if !buf.is_empty()
            && char_len(&buf) + PARAGRAPH_SEPARATOR.len() + para_len > params.chunk_size
        {
            flush(&mut pieces, &buf);
            buf = reseed(&buf, paragraph, params.chunk_overlap);
        } else {
            if !buf.is_empty() {
                buf.push_str(PARAGRAPH_SEPARATOR);
            }
            buf.push_str(paragraph);
        }
    }

    flush(&mut pieces, &buf);

    let total = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, content)| Chunk {
            id: Uuid::new_v4().to_string(),
            content,
            source: source_name.to_string(),
            chunk_index: index,
            total_chunks: total,
        })
        .collect()
}

/// Split a paragraph after every sentence terminator, consuming the
/// whitespace that follows it.
pub fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !SENTENCE_TERMINATORS.contains(&c) {
            continue;
        }
        let end = i + c.len_utf8();
        let mut next_start = end;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                break;
            }
            next_start = j + w.len_utf8();
            chars.next();
        }
        sentences.push(&paragraph[start..end]);
        start = next_start;
    }

    if start < paragraph.len() {
        sentences.push(&paragraph[start..]);
    }
    sentences.retain(|s| !s.is_empty());
    sentences
}

fn flush(pieces: &mut Vec<String>, buf: &str) {
    let trimmed = buf.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
}

fn reseed(flushed: &str, next: &str, overlap: usize) -> String {
    let mut seeded = tail_chars(flushed, overlap).to_string();
    seeded.push_str(next);
    seeded
}

/// The last `n` characters of `s` (all of `s` when shorter).
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((i, _)) => &s[i..],
        None => s,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
