use lonaire::{Catalog, Config, Database};
use lonaire::catalog::{ProductQuery, SubscriptionStatus};
use serde_json::json;

fn sqlite_catalog(dir: &tempfile::TempDir) -> Catalog {
    let url = format!("sqlite://{}", dir.path().join("lonaire.db").display());
    let database = Database::connect(&Config::with_database_url(Some(url.as_str())));
    assert!(database.is_available());
    Catalog::new(database)
}

#[tokio::test]
async fn subscriptions_persist_across_restarts() {
    let dir = tempfile::tempdir().unwrap();

    let first = sqlite_catalog(&dir)
        .subscribe_newsletter(&json!({"email": "a@x.com"}))
        .await
        .unwrap();
    assert_eq!(first.status, SubscriptionStatus::Subscribed);

    let again = sqlite_catalog(&dir)
        .subscribe_newsletter(&json!({"email": "a@x.com", "language": "en"}))
        .await
        .unwrap();
    assert_eq!(again.status, SubscriptionStatus::AlreadySubscribed);
    assert_eq!(again.id, None);
}

#[tokio::test]
async fn products_filter_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = sqlite_catalog(&dir);
    for (sku, stone) in [("P1", "perla"), ("P2", "zircone"), ("P3", "perla")] {
        catalog
            .create_product(&json!({
                "sku": sku,
                "title_it": "Orecchini",
                "title_en": "Earrings",
                "material": "argento",
                "stone": stone,
                "price": 35,
                "collection_key": "pietre",
            }))
            .await
            .unwrap();
    }

    let query = ProductQuery { stone: Some("perla".into()), ..ProductQuery::default() };
    let skus: Vec<String> = catalog.list_products(&query).await.unwrap().into_iter().map(|p| p.sku).collect();
    assert_eq!(skus, vec!["P1", "P3"]);
}

#[tokio::test]
async fn unsupported_url_degrades_instead_of_failing() {
    let database = Database::connect(&Config::with_database_url(Some("mongodb://localhost:27017")));
    assert!(!database.is_available());
    assert!(database.url_configured());
    assert!(Catalog::new(database).list_collections().await.unwrap().is_empty());
}
