//! Process-wide database handle and typed repositories.
//!
//! [`Database`] is connected once at startup. When no connection string was
//! configured, or the store refused it, the handle is *degraded*: reads
//! answer empty and writes fail with [`StoreError::Unavailable`]. The
//! process keeps serving either way.
//!
//! [`Repository<E>`] is the typed view of one collection. The entity type
//! fixes the collection name, so handlers never spell one out.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::config::Config;
use crate::filter::{Document, Filter};
use crate::schema::{Collection, ContactMessage, NewsletterSubscriber, Product, Schema};
use crate::store::{self, DocumentStore, StoreError, StoreResult};

/// A validated, persistable record kind.
pub trait Entity: Schema + Serialize + DeserializeOwned + Send + 'static {
    /// Storage collection name: the lowercased type name.
    const COLLECTION: &'static str;
}

impl Entity for Collection {
    const COLLECTION: &'static str = "collection";
}

impl Entity for Product {
    const COLLECTION: &'static str = "product";
}

impl Entity for ContactMessage {
    const COLLECTION: &'static str = "contactmessage";
}

impl Entity for NewsletterSubscriber {
    const COLLECTION: &'static str = "newslettersubscriber";
}

/// Shared handle to the document store, possibly absent.
#[derive(Clone)]
pub struct Database {
    store: Option<Arc<dyn DocumentStore>>,
    name: String,
    url_configured: bool,
}

impl Database {
    /// Connects from configuration, degrading instead of failing.
    pub fn connect(config: &Config) -> Self {
        let store = match config.database_url.as_deref() {
            None => {
                warn!("DATABASE_URL not set, running without a database");
                None
            }
            Some(url) => match store::open(url) {
                Ok(store) => Some(store),
                Err(e) => {
                    error!("database connection failed, running without a database: {e}");
                    None
                }
            },
        };
        Self {
            store,
            name: config.database_name.clone(),
            url_configured: config.database_url.is_some(),
        }
    }

    /// Wraps an already opened store.
    pub fn with_store(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self { store: Some(store), name: name.into(), url_configured: true }
    }

    /// A handle with no store behind it.
    pub fn unavailable() -> Self {
        Self { store: None, name: String::new(), url_configured: false }
    }

    pub fn store(&self) -> Option<&Arc<dyn DocumentStore>> {
        self.store.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a connection string was supplied at all.
    pub fn url_configured(&self) -> bool {
        self.url_configured
    }

    pub fn repository<E: Entity>(&self) -> Repository<E> {
        Repository { store: self.store.clone(), _entity: PhantomData }
    }

    /// Runs a blocking store call on the blocking pool.
    pub(crate) async fn blocking<T, F>(store: Arc<dyn DocumentStore>, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DocumentStore) -> StoreResult<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(move || f(&*store))
            .await
            .map_err(|e| StoreError::Backend(format!("storage task failed: {e}")))?
    }
}

/// Typed access to the collection of `E`.
pub struct Repository<E> {
    store: Option<Arc<dyn DocumentStore>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    /// Persists `entity` and returns its id.
    pub async fn insert(&self, entity: &E) -> StoreResult<String> {
        let store = self.store.clone().ok_or(StoreError::Unavailable)?;
        let doc = to_document(entity)?;
        Database::blocking(store, move |s| s.insert(E::COLLECTION, doc)).await
    }

    /// Every stored `E` matching `filter`. Empty when degraded.
    pub async fn find(&self, filter: Filter) -> StoreResult<Vec<E>> {
        let Some(store) = self.store.clone() else {
            return Ok(Vec::new());
        };
        let docs = Database::blocking(store, move |s| s.find(E::COLLECTION, &filter)).await?;
        docs.into_iter().map(from_document::<E>).collect()
    }

    /// First stored `E` matching `filter`. `None` when degraded.
    pub async fn find_one(&self, filter: Filter) -> StoreResult<Option<E>> {
        let Some(store) = self.store.clone() else {
            return Ok(None);
        };
        let doc = Database::blocking(store, move |s| s.find_one(E::COLLECTION, &filter)).await?;
        doc.map(from_document::<E>).transpose()
    }
}

fn to_document<E: Entity>(entity: &E) -> StoreResult<Document> {
    match serde_json::to_value(entity)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::Backend(format!(
            "{} serialised to a non-object: {other}",
            E::COLLECTION
        ))),
    }
}

fn from_document<E: Entity>(doc: Document) -> StoreResult<E> {
    serde_json::from_value(serde_json::Value::Object(doc)).map_err(|e| StoreError::Corrupt {
        collection: E::COLLECTION.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::Language;
    use crate::store::MemoryStore;

    fn subscriber(email: &str) -> NewsletterSubscriber {
        NewsletterSubscriber { email: email.to_owned(), language: Language::En }
    }

    #[tokio::test]
    async fn degraded_reads_are_empty_and_writes_fail() {
        let db = Database::unavailable();
        let repo = db.repository::<NewsletterSubscriber>();
        assert!(repo.find(Filter::all()).await.unwrap().is_empty());
        assert!(repo.find_one(Filter::all()).await.unwrap().is_none());
        assert!(matches!(repo.insert(&subscriber("a@x.com")).await, Err(StoreError::Unavailable)));
    }

    #[tokio::test]
    async fn repository_writes_to_the_lowercased_collection() {
        let store = MemoryStore::new();
        let db = Database::with_store(Arc::new(store.clone()), "test");
        db.repository::<NewsletterSubscriber>().insert(&subscriber("a@x.com")).await.unwrap();

        let raw = store.find("newslettersubscriber", &Filter::all()).unwrap();
        assert_eq!(raw[0], json!({"email": "a@x.com", "language": "en"}).as_object().cloned().unwrap());
    }

    #[tokio::test]
    async fn undecodable_document_is_corrupt() {
        let store = MemoryStore::new();
        store.insert("product", json!({"sku": 1}).as_object().cloned().unwrap()).unwrap();
        let db = Database::with_store(Arc::new(store), "test");
        let err = db.repository::<Product>().find(Filter::all()).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
