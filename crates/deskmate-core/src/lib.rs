//! # Deskmate Core
//!
//! Shared, WASM-safe logic for Deskmate: data models, paragraph/sentence
//! chunking, the knowledge-base store and its persistence port, keyword
//! retrieval, and the daily → weekly → monthly report aggregators.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Persistence is injected through the
//! [`store::Storage`] trait.

pub mod chunk;
pub mod models;
pub mod report;
pub mod search;
pub mod store;
