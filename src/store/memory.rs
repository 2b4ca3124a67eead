//! In-memory [`TenantIndex`] for tests and ephemeral use.
//!
//! Collections are a `HashMap` keyed by client id behind an `RwLock`; query
//! ranking goes through the same helper as the SQLite backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::Result;

use super::{rank_by_similarity, IndexEntry, RankedHit, TenantIndex};

#[derive(Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Vec<IndexEntry>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantIndex for InMemoryIndex {
    async fn upsert(&self, client_id: &str, entries: Vec<IndexEntry>) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        let collection = collections.entry(client_id.to_string()).or_default();
        for entry in entries {
            match collection.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => collection.push(entry),
            }
        }
        Ok(())
    }

    async fn count(&self, client_id: &str) -> Result<u64> {
        let collections = self.collections.read().unwrap();
        Ok(collections.get(client_id).map_or(0, |c| c.len() as u64))
    }

    async fn query(&self, client_id: &str, vector: &[f32], k: usize) -> Result<Vec<RankedHit>> {
        let collections = self.collections.read().unwrap();
        let entries = collections
            .get(client_id)
            .map(|c| {
                c.iter()
                    .map(|e| (e.vector.clone(), e.document.clone(), e.metadata.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(rank_by_similarity(entries, vector, k))
    }
}
