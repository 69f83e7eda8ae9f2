//! Operational health report for `GET /test`.
//!
//! The probe never fails: every problem it meets is folded into the
//! `database` label, with the error text cut to [`MAX_ERROR_CHARS`].

use serde::{Deserialize, Serialize};

use crate::database::Database;

/// Longest error text echoed back to a caller.
pub const MAX_ERROR_CHARS: usize = 50;

/// Collection names listed at most.
const MAX_COLLECTIONS: usize = 10;

pub const BACKEND_RUNNING: &str = "✅ Running";
pub const DB_NOT_INITIALIZED: &str = "⚠️  Available but not initialized";
pub const DB_WORKING: &str = "✅ Connected & Working";
pub const URL_SET: &str = "✅ Set";
pub const URL_NOT_SET: &str = "❌ Not Set";
pub const CONNECTED: &str = "Connected";
pub const NOT_CONNECTED: &str = "Not Connected";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

impl Diagnostics {
    fn not_connected() -> Self {
        Self {
            backend: BACKEND_RUNNING.to_owned(),
            database: DB_NOT_INITIALIZED.to_owned(),
            database_url: None,
            database_name: None,
            connection_status: NOT_CONNECTED.to_owned(),
            collections: Vec::new(),
        }
    }
}

/// First `max` characters of `message`.
pub fn truncate(message: &str, max: usize) -> String {
    message.chars().take(max).collect()
}

/// Probes the database by listing its first collection names.
pub async fn probe(db: &Database) -> Diagnostics {
    let mut report = Diagnostics::not_connected();
    let Some(store) = db.store() else {
        return report;
    };

    report.database_url = Some(if db.url_configured() { URL_SET } else { URL_NOT_SET }.to_owned());
    report.database_name = Some(db.name().to_owned());
    report.connection_status = CONNECTED.to_owned();

    match Database::blocking(store.clone(), |s| s.collection_names()).await {
        Ok(mut names) => {
            names.truncate(MAX_COLLECTIONS);
            report.collections = names;
            report.database = DB_WORKING.to_owned();
        }
        Err(e) => {
            tracing::warn!("database probe failed: {e}");
            report.database = format!("⚠️  Connected but Error: {}", truncate(&e.to_string(), MAX_ERROR_CHARS));
        }
    }
    report
}
