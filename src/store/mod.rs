//! Document storage.
//!
//! A [`DocumentStore`] keeps schema-free JSON documents grouped into named
//! collections and assigns each inserted document an opaque string id. Two
//! backends exist, chosen by connection string through [`open`]:
//!
//! | Connection string | Backend |
//! |---|---|
//! | `memory://` | [`MemoryStore`], process-local |
//! | `sqlite://<path>`, `sqlite::memory:`, `<path>.db`, `<path>.sqlite` | [`SqliteStore`] |
//!
//! Stored documents never carry their id; `find` returns bodies only.

mod memory;
mod sqlite;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::filter::{Document, Filter};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No store was ever connected.
    #[error("database not available")]
    Unavailable,

    /// The connection string names no backend or the backend refused it.
    #[error("cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The backend failed an operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document no longer decodes into its entity type.
    #[error("corrupt document in `{collection}`: {reason}")]
    Corrupt { collection: String, reason: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A document database addressed by collection name.
///
/// Calls block; async callers run them on the blocking pool.
pub trait DocumentStore: Send + Sync {
    /// Short backend label, e.g. `"memory"` or `"sqlite"`.
    fn backend(&self) -> &'static str;

    /// Appends `doc` to `collection` and returns its new id.
    fn insert(&self, collection: &str, doc: Document) -> StoreResult<String>;

    /// Every document of `collection` matching `filter`, in insertion order.
    fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// First document of `collection` matching `filter`.
    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(self.find(collection, filter)?.into_iter().next())
    }

    /// Names of collections holding at least one document, sorted.
    fn collection_names(&self) -> StoreResult<Vec<String>>;
}

/// Opens the store a connection string names.
pub fn open(url: &str) -> StoreResult<Arc<dyn DocumentStore>> {
    let url = url.trim();
    let store: Arc<dyn DocumentStore> = if url == "memory:" || url == "memory://" {
        Arc::new(MemoryStore::new())
    } else if url == "sqlite::memory:" {
        Arc::new(SqliteStore::open_in_memory()?)
    } else if let Some(path) = url.strip_prefix("sqlite://") {
        Arc::new(SqliteStore::open(path)?)
    } else if url.ends_with(".db") || url.ends_with(".sqlite") {
        Arc::new(SqliteStore::open(url)?)
    } else {
        return Err(StoreError::Connect {
            url: url.to_owned(),
            reason: "unsupported connection string".to_owned(),
        });
    };
    info!(backend = store.backend(), "document store opened");
    Ok(store)
}

/// Drops an `_id` the caller may have left in a document body.
pub(crate) fn without_id(mut doc: Document) -> Document {
    doc.remove("_id");
    doc
}
