//! HashMap-backed store for development and tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use super::{DocumentStore, StoreError, StoreResult, without_id};
use crate::filter::{Document, Filter};

/// In-memory document store. Clone-friendly via `Arc`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<(String, Document)>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total documents across all collections.
    pub fn len(&self) -> usize {
        self.collections
            .read()
            .map(|c| c.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".into())
}

impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn insert(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections
            .entry(collection.to_owned())
            .or_default()
            .push((id.clone(), without_id(doc)));
        Ok(id)
    }

    fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
