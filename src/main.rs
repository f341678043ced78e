//! # Deskmate CLI (`dm`)
//!
//! ## Usage
//!
//! ```bash
//! dm --config ./config/deskmate.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dm init` | Create the SQLite database and schema |
//! | `dm kb create <name>` | Create a knowledge base |
//! | `dm kb list` | List knowledge bases |
//! | `dm kb show <kb>` | Show a knowledge base and its documents |
//! | `dm kb update <kb>` | Rename or re-describe a knowledge base |
//! | `dm kb delete <kb>` | Delete a knowledge base |
//! | `dm kb add <kb> <path>...` | Add files or directories |
//! | `dm kb remove <kb> <doc-id>` | Remove a document |
//! | `dm kb reindex <kb>` | Re-chunk with the configured sizes |
//! | `dm search <kb> "<query>"` | Keyword search within a knowledge base |
//! | `dm ask <kb> "<question>"` | Answer a question with retrieved context |
//! | `dm report weekly <file>` | Merge a week of daily reports |
//! | `dm report monthly <file>` | Merge weekly (or daily) reports into a month |
//!
//! ## Examples
//!
//! ```bash
//! dm init
//! dm kb create 运维手册 --description "部署与回滚"
//! dm kb add 运维手册 ./docs
//! dm search 运维手册 "回滚 步骤"
//! dm ask 运维手册 "如何回滚上一次发布？" --dry-run
//! dm report weekly ./week.json --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use deskmate::{ask, config, kb_cmd, logging, migrate, report_cmd, search};

/// Deskmate CLI: knowledge-base RAG chat and work-report merging.
///
/// Commands that touch knowledge bases read `--config`; the `report`
/// commands work on plain JSON files and need no configuration.
#[derive(Parser)]
#[command(
    name = "dm",
    about = "Deskmate: knowledge-base retrieval for RAG chat and daily/weekly/monthly report merging",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/deskmate.toml")]
    config: PathBuf,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `kv_store` table.
    /// Running it multiple times is safe.
    Init,

    /// Manage knowledge bases and their documents.
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },

    /// Keyword search within one knowledge base.
    Search {
        /// Knowledge base id or name.
        kb: String,
        /// The search query. Tokens of one character are ignored.
        query: String,
        /// Number of chunks to return (defaults to `[retrieval] top_k`).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Ask a question answered from one knowledge base.
    Ask {
        /// Knowledge base id or name.
        kb: String,
        question: String,
        /// Print the assembled prompt instead of calling the model.
        #[arg(long)]
        dry_run: bool,
    },

    /// Merge work reports.
    Report {
        #[command(subcommand)]
        period: ReportPeriod,
    },
}

#[derive(Subcommand)]
enum KbAction {
    /// Create a knowledge base.
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List knowledge bases.
    List,
    /// Show a knowledge base and its documents.
    Show { kb: String },
    /// Change name and/or description.
    Update {
        kb: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a knowledge base and all its documents.
    Delete { kb: String },
    /// Add files or directories.
    ///
    /// Directories are walked and filtered by `[ingest]` globs. Files whose
    /// content already exists in the knowledge base are skipped.
    Add {
        kb: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove one document.
    Remove { kb: String, doc_id: String },
    /// Re-chunk every document with the configured chunk sizes.
    Reindex { kb: String },
}

#[derive(Subcommand)]
enum ReportPeriod {
    /// Merge a JSON array of days (each an array of report items).
    Weekly {
        file: PathBuf,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Merge a JSON array of weekly reports into one month.
    Monthly {
        file: PathBuf,
        /// Treat the file as daily item sets instead of weekly reports.
        #[arg(long)]
        from_daily: bool,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose)?;

    // Commands that don't require config
    if let Commands::Report { period } = &cli.command {
        match period {
            ReportPeriod::Weekly { file, json } => report_cmd::run_report_weekly(file, *json)?,
            ReportPeriod::Monthly {
                file,
                from_daily,
                json,
            } => report_cmd::run_report_monthly(file, *from_daily, *json)?,
        }
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Kb { action } => match action {
            KbAction::Create { name, description } => {
                kb_cmd::run_kb_create(&cfg, &name, &description).await?;
            }
            KbAction::List => kb_cmd::run_kb_list(&cfg).await?,
            KbAction::Show { kb } => kb_cmd::run_kb_show(&cfg, &kb).await?,
            KbAction::Update {
                kb,
                name,
                description,
            } => {
                kb_cmd::run_kb_update(&cfg, &kb, name, description).await?;
            }
            KbAction::Delete { kb } => kb_cmd::run_kb_delete(&cfg, &kb).await?,
            KbAction::Add { kb, paths } => kb_cmd::run_kb_add(&cfg, &kb, &paths).await?,
            KbAction::Remove { kb, doc_id } => kb_cmd::run_kb_remove(&cfg, &kb, &doc_id).await?,
            KbAction::Reindex { kb } => kb_cmd::run_kb_reindex(&cfg, &kb).await?,
        },
        Commands::Search { kb, query, top_k } => {
            search::run_search(&cfg, &kb, &query, top_k).await?;
        }
        Commands::Ask {
            kb,
            question,
            dry_run,
        } => {
            ask::run_ask(&cfg, &kb, &question, dry_run).await?;
        }
        Commands::Report { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
