//! Retrieval-augmented prompt assembly for `dm ask`.
//!
//! The question is matched against the knowledge base with a
//! [`Retriever`]. Matching chunks become labelled context blocks in the
//! system message. When nothing matches, a preview of every document
//! (truncated to `preview_chars` in total) is used instead so the model
//! still sees what the knowledge base is about.

use deskmate_core::models::{Chunk, KnowledgeBase};
use deskmate_core::search::{KeywordRetriever, Retriever};

use crate::chat::ChatMessage;
use crate::config::RetrievalConfig;

/// The messages to send for one question.
#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub system: String,
    pub user: String,
    /// `true` when retrieval found nothing and the preview was used.
    pub used_fallback: bool,
    /// Labels of the context blocks, in prompt order.
    pub sources: Vec<String>,
}

impl PromptPlan {
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(&self.system),
            ChatMessage::user(&self.user),
        ]
    }
}

pub fn build_messages(kb: &KnowledgeBase, question: &str, config: &RetrievalConfig) -> PromptPlan {
    build_messages_with(&KeywordRetriever, kb, question, config)
}

pub fn build_messages_with<R: Retriever>(
    retriever: &R,
    kb: &KnowledgeBase,
    question: &str,
    config: &RetrievalConfig,
) -> PromptPlan {
    let chunks = retriever.retrieve(kb, question, config.top_k);
    let used_fallback = chunks.is_empty();

    let blocks = if used_fallback {
        preview_blocks(kb, config.preview_chars)
    } else {
        chunks.iter().map(chunk_block).collect()
    };
    let sources: Vec<String> = blocks.iter().map(|(label, _)| label.clone()).collect();

    let mut system = format!(
        "你是一个办公助手，请根据知识库「{}」中的内容回答用户的问题。\
         如果资料中没有相关信息，请直接说明，不要编造。",
        kb.name
    );
    if !kb.description.is_empty() {
        system.push_str(&format!("\n知识库说明：{}", kb.description));
    }
    if blocks.is_empty() {
        system.push_str("\n\n该知识库目前没有可用的文档内容。");
    } else {
        system.push_str("\n\n参考资料：\n");
        let context: Vec<String> = blocks
            .iter()
            .map(|(label, text)| format!("[{}]\n{}", label, text))
            .collect();
        system.push_str(&context.join("\n\n"));
    }

    PromptPlan {
        system,
        user: question.to_string(),
        used_fallback,
        sources,
    }
}

fn chunk_block(chunk: &Chunk) -> (String, String) {
    (
        format!("{} #{}", chunk.source, chunk.chunk_index + 1),
        chunk.content.clone(),
    )
}

/// Leading text of each document until `budget` chars are used up.
fn preview_blocks(kb: &KnowledgeBase, budget: usize) -> Vec<(String, String)> {
    let mut remaining = budget;
    let mut blocks = Vec::new();
    for doc in &kb.documents {
        if remaining == 0 {
            break;
        }
        let text = doc.content.trim();
        if text.is_empty() {
            continue;
        }
        let excerpt: String = text.chars().take(remaining).collect();
        remaining -= excerpt.chars().count();
        blocks.push((doc.file_name.clone(), excerpt));
    }
    blocks
}
