use anyhow::Result;
use tracing::info;

use crate::chat::ChatClient;
use crate::config::Config;
use crate::db;
use crate::kb_cmd::resolve_or_exit;
use crate::prompt::build_messages;

/// `dm ask`: answer a question from one knowledge base.
///
/// With `dry_run` the assembled prompt is printed and nothing is sent.
pub async fn run_ask(config: &Config, kb: &str, question: &str, dry_run: bool) -> Result<()> {
    let store = db::open_store(config).await?;
    let id = resolve_or_exit(&store, kb);
    let Some(kb) = store.get(&id) else {
        return Ok(());
    };

    let plan = build_messages(kb, question, &config.retrieval);
    info!(
        kb = %kb.id,
        sources = plan.sources.len(),
        fallback = plan.used_fallback,
        "assembled prompt"
    );

    if dry_run {
        println!("--- System ---");
        println!("{}", plan.system);
        println!();
        println!("--- User ---");
        println!("{}", plan.user);
        return Ok(());
    }

    let client = ChatClient::from_config(&config.chat)?;
    let answer = client.complete(&plan.messages()).await?;
    println!("{}", answer.trim());
    if !plan.sources.is_empty() {
        println!();
        println!("Sources: {}", plan.sources.join(", "));
    }
    Ok(())
}
