//! # Deskmate
//!
//! Office-assistant toolkit: knowledge bases with keyword retrieval for
//! retrieval-augmented chat, and merging of daily work reports into weekly
//! and monthly summaries.
//!
//! The pure logic (chunking, retrieval, the knowledge-base repository,
//! report aggregation) lives in [`deskmate_core`]. This crate adds the
//! application around it: configuration, SQLite persistence, file
//! extraction, prompt assembly, the chat client, and the `dm` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────┐   ┌──────────┐
//! │  Files   │──▶│  Extract  │──▶│ deskmate-core │──▶│  SQLite  │
//! │ md/pdf/… │   │  + Ingest │   │ chunk + store │   │ kv_store │
//! └──────────┘   └───────────┘   └──────┬───────┘   └──────────┘
//!                                       │ retrieve
//!                                       ▼
//!                                ┌─────────────┐   ┌──────────┐
//!                                │   Prompt    │──▶│   Chat   │
//!                                └─────────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`db`] | Database connection and store bootstrap |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_storage`] | SQLite implementation of the core `Storage` port |
//! | [`extract`] | Text extraction from txt/md/pdf/docx/pptx |
//! | [`ingest`] | File discovery and de-duplicated ingestion |
//! | [`prompt`] | Retrieval-augmented prompt assembly |
//! | [`chat`] | OpenAI-compatible chat-completion client |
//! | [`kb_cmd`], [`search`], [`ask`], [`report_cmd`] | CLI command handlers |

pub mod ask;
pub mod chat;
pub mod config;
pub mod db;
pub mod extract;
pub mod ingest;
pub mod kb_cmd;
pub mod logging;
pub mod migrate;
pub mod prompt;
pub mod report_cmd;
pub mod search;
pub mod sqlite_storage;
