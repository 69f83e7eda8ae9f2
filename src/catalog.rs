//! Catalog operations: validate, persist, read back.
//!
//! Each operation is a single request-to-result step with no state kept
//! between calls. Validation always happens before any storage access, and
//! every operation performs at most one write.
//!
//! # Newsletter race
//! [`Catalog::subscribe_newsletter`] reads before it writes and nothing
//! makes the pair atomic. Two concurrent sign-ups for the same address can
//! both see "not subscribed" and both insert.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::database::{Database, Entity};
use crate::filter::Filter;
use crate::schema::{
    Collection, ContactMessage, NewsletterSubscriber, Product, Schema, ValidationError, Violation,
    parse_bool, parse_number,
};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// `{"id": ...}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

/// `{"id": ..., "status": "received"}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
    pub status: ReceiptStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Received,
}

/// Outcome of a newsletter sign-up. `id` is absent for a repeat address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: SubscriptionStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Subscribed,
    AlreadySubscribed,
}

/// Product listing filters, all optional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductQuery {
    pub material: Option<String>,
    pub stone: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub available: Option<bool>,
    pub collection_key: Option<String>,
}

impl ProductQuery {
    /// Reads the filters from decoded query-string pairs.
    ///
    /// Empty text values count as absent. Prices and availability that do
    /// not parse are reported together.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ValidationError> {
        let last = |name: &str| {
            pairs.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
        };
        let text = |name: &str| last(name).filter(|v| !v.is_empty()).map(str::to_owned);

        let mut violations = Vec::new();
        let mut price = |name: &str| {
            let raw = last(name)?;
            let parsed = parse_number(raw);
            if parsed.is_none() {
                violations.push(Violation::query(
                    name,
                    "float_parsing",
                    "Input should be a valid number, unable to parse string as a number",
                ));
            }
            parsed
        };
        let min_price = price("min_price");
        let max_price = price("max_price");

        let available = match last("available") {
            None => None,
            Some(raw) => {
                let parsed = parse_bool(raw);
                if parsed.is_none() {
                    violations.push(Violation::query(
                        "available",
                        "bool_parsing",
                        "Input should be a valid boolean, unable to interpret input",
                    ));
                }
                parsed
            }
        };

        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }
        Ok(Self {
            material: text("material"),
            stone: text("stone"),
            min_price,
            max_price,
            available,
            collection_key: text("collection_key"),
        })
    }

    /// Equality on material, stone and collection key, inclusive range on
    /// price, equality on availability. Absent filters are left out.
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::all();
        if let Some(material) = &self.material {
            filter = filter.eq("material", material.as_str());
        }
        if let Some(stone) = &self.stone {
            filter = filter.eq("stone", stone.as_str());
        }
        if let Some(key) = &self.collection_key {
            filter = filter.eq("collection_key", key.as_str());
        }
        filter = filter.range("price", self.min_price, self.max_price);
        if let Some(available) = self.available {
            filter = filter.eq("available", available);
        }
        filter
    }
}

/// The catalog service over one database handle.
#[derive(Clone)]
pub struct Catalog {
    db: Database,
}

impl Catalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn create<E: Entity>(&self, payload: &Value) -> CatalogResult<String> {
        let entity = E::validate(payload)?;
        let id = self.db.repository::<E>().insert(&entity).await?;
        debug!(collection = E::COLLECTION, %id, "document created");
        Ok(id)
    }

    pub async fn list_collections(&self) -> CatalogResult<Vec<Collection>> {
        Ok(self.db.repository::<Collection>().find(Filter::all()).await?)
    }

    pub async fn create_collection(&self, payload: &Value) -> CatalogResult<Created> {
        let id = self.create::<Collection>(payload).await?;
        Ok(Created { id })
    }

    pub async fn list_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
        Ok(self.db.repository::<Product>().find(query.filter()).await?)
    }

    pub async fn create_product(&self, payload: &Value) -> CatalogResult<Created> {
        let id = self.create::<Product>(payload).await?;
        Ok(Created { id })
    }

    /// Stores every message, duplicates included.
    pub async fn submit_contact(&self, payload: &Value) -> CatalogResult<Receipt> {
        let id = self.create::<ContactMessage>(payload).await?;
        Ok(Receipt { id, status: ReceiptStatus::Received })
    }

    /// Subscribes an address unless a subscriber with the same address exists.
    pub async fn subscribe_newsletter(&self, payload: &Value) -> CatalogResult<Subscription> {
        let subscriber = NewsletterSubscriber::validate(payload)?;
        let repo = self.db.repository::<NewsletterSubscriber>();

        let existing = repo.find_one(Filter::all().eq("email", subscriber.email.as_str())).await?;
        if existing.is_some() {
            debug!("newsletter address already subscribed");
            return Ok(Subscription { id: None, status: SubscriptionStatus::AlreadySubscribed });
        }

        let id = repo.insert(&subscriber).await?;
        info!(%id, language = ?subscriber.language, "newsletter subscription created");
        Ok(Subscription { id: Some(id), status: SubscriptionStatus::Subscribed })
    }
}
