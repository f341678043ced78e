use anyhow::Result;

use deskmate_core::search::retrieve_scored;

use crate::config::Config;
use crate::db;
use crate::kb_cmd::resolve_or_exit;

/// `dm search`: print the best keyword matches in one knowledge base.
pub async fn run_search(config: &Config, kb: &str, query: &str, top_k: Option<usize>) -> Result<()> {
    let store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);
    let Some(kb) = store.get(&id) else {
        return Ok(());
    };

    let results = retrieve_scored(kb, query, top_k.unwrap_or(config.retrieval.top_k));
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [{}] {} #{}/{}",
            i + 1,
            result.score,
            result.chunk.source,
            result.chunk.chunk_index + 1,
            result.chunk.total_chunks
        );
        println!(
            "    excerpt: \"{}\"",
            excerpt(&result.chunk.content, 160).replace('\n', " ").trim()
        );
        println!("    id: {}", result.chunk.id);
        println!();
    }
    Ok(())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
