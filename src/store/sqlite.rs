//! SQLite-backed document store.
//!
//! # Layout
//! One `documents` table holds every collection. `seq` keeps insertion
//! order, `body` is the document as JSON text.
//!
//! # Invariants
//! - The schema is created on open; there are no migrations.
//! - Filters are evaluated on decoded bodies, the same way the memory
//!   store evaluates them.

use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rusqlite::{Connection, params};
use tracing::{error, info};
use uuid::Uuid;

use super::{DocumentStore, StoreError, StoreResult, without_id};
use crate::filter::{Document, Filter};

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS documents (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT NOT NULL UNIQUE,
    collection TEXT NOT NULL,
    body       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS documents_collection ON documents (collection, seq);";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        Self::bootstrap("file", || Connection::open(path))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    fn bootstrap(
        mode: &str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> StoreResult<Self> {
        let started = Instant::now();
        let result = connect().and_then(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(conn)
        });
        match result {
            Ok(conn) => {
                info!(mode, duration_ms = started.elapsed().as_millis() as u64, "sqlite store ready");
                Ok(Self { conn: Mutex::new(conn) })
            }
            Err(e) => {
                error!(mode, duration_ms = started.elapsed().as_millis() as u64, "sqlite open failed: {e}");
                Err(StoreError::Connect { url: format!("sqlite ({mode})"), reason: e.to_string() })
            }
        }
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Backend("lock poisoned".into()))
    }
}

impl DocumentStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn insert(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let body = serde_json::to_string(&without_id(doc))?;
        self.lock()?.execute(
            "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3)",
            params![id, collection, body],
        )?;
        Ok(id)
    }

    fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT body FROM documents WHERE collection = ?1 ORDER BY seq",
        )?;
        let bodies = stmt
            .query_map(params![collection], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        let mut docs = Vec::new();
        for body in bodies {
            let doc: Document = serde_json::from_str(&body).map_err(|e| StoreError::Corrupt {
                collection: collection.to_owned(),
                reason: e.to_string(),
            })?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT DISTINCT collection FROM documents ORDER BY collection",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}
