//! In-memory [`Storage`] implementation for testing and WASM targets.
//!
//! Uses a `HashMap` behind `Arc<RwLock>`; clones share the same map, so a
//! test can reopen a store over the data a previous store wrote.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::Storage;

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn load(&self, namespace: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("in-memory storage lock poisoned"))?;
        Ok(entries.get(namespace).cloned())
    }

    async fn save(&self, namespace: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("in-memory storage lock poisoned"))?;
        entries.insert(namespace.to_string(), value.to_string());
        Ok(())
    }
}
