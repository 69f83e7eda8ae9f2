use std::sync::Arc;

use lonaire::store::MemoryStore;
use lonaire::{Catalog, Database, Server, handlers};
use serde_json::{Value, json};

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
async fn spawn_server(database: Database) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_listener(listener);
    let addr = server.local_addr().unwrap();
    let app = handlers::router(Catalog::new(database));
    tokio::spawn(async move {
        server.serve_with_shutdown(app, std::future::pending()).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_with_memory_store() -> String {
    spawn_server(Database::with_store(Arc::new(MemoryStore::new()), "lonaire")).await
}

fn product(sku: &str, material: &str, price: f64) -> Value {
    json!({
        "sku": sku,
        "title_it": "Bracciale",
        "title_en": "Bracelet",
        "material": material,
        "stone": "zircone",
        "price": price,
        "images": ["https://cdn.lonaire.it/1.jpg"],
        "collection_key": "pietre",
    })
}

#[tokio::test]
async fn root_reports_running() {
    let base = spawn_with_memory_store().await;
    let body: Value = reqwest::get(base.as_str()).await.unwrap().json().await.unwrap();
    assert_eq!(body, json!({"message": "LONAIRE API is running"}));
}

#[tokio::test]
async fn collection_round_trip() {
    let base = spawn_with_memory_store().await;
    let client = reqwest::Client::new();
    let payload = json!({
        "key": "acciaio",
        "name_it": "Acciaio",
        "name_en": "Steel",
        "tagline_it": "Forza lunare",
        "tagline_en": "Lunar strength",
        "description_it": "Acciaio chirurgico",
        "description_en": "Surgical steel",
        "hero_image": null,
    });

    let resp = client.post(format!("{base}/api/collections")).json(&payload).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let created: Value = resp.json().await.unwrap();
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));

    let listed: Vec<Value> = reqwest::get(format!("{base}/api/collections"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, vec![payload]);
    assert!(listed[0].get("_id").is_none() && listed[0].get("id").is_none());
}

#[tokio::test]
async fn product_validation_errors_list_every_field() {
    let base = spawn_with_memory_store().await;
    let mut bad = product("X", "oro", -1.0);
    bad.as_object_mut().unwrap().remove("sku");

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/products"))
        .json(&bad)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    let locs: Vec<Value> = body["detail"].as_array().unwrap().iter().map(|v| v["loc"].clone()).collect();
    assert_eq!(locs, vec![json!(["body", "sku"]), json!(["body", "material"]), json!(["body", "price"])]);

    let listed: Vec<Value> = reqwest::get(format!("{base}/api/products")).await.unwrap().json().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn product_listing_filters_by_material_and_price() {
    let base = spawn_with_memory_store().await;
    let client = reqwest::Client::new();
    for (sku, material, price) in [("A", "acciaio", 5.0), ("B", "argento", 10.0), ("C", "argento", 20.0), ("D", "argento", 30.0)] {
        let resp = client.post(format!("{base}/api/products")).json(&product(sku, material, price)).send().await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    let listed: Vec<Value> = reqwest::get(format!("{base}/api/products?material=argento&min_price=10&max_price=20"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let skus: Vec<&str> = listed.iter().map(|p| p["sku"].as_str().unwrap()).collect();
    assert_eq!(skus, vec!["B", "C"]);
    assert_eq!(listed[0]["available"], true);

    let resp = reqwest::get(format!("{base}/api/products?min_price=abc")).await.unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn product_round_trip_keeps_every_field() {
    let base = spawn_with_memory_store().await;
    let client = reqwest::Client::new();
    let full = json!({
        "sku": "LN-PI-007",
        "title_it": "Collana Perla",
        "title_en": "Pearl Necklace",
        "description_it": "Perla d'acqua dolce",
        "description_en": "Freshwater pearl",
        "material": "argento",
        "stone": "perla",
        "price": 89.9,
        "available": false,
        "images": ["https://cdn.lonaire.it/7a.jpg", "https://cdn.lonaire.it/7b.jpg"],
        "collection_key": "pietre",
    });
    let minimal = json!({
        "sku": "LN-AC-002",
        "title_it": "Anello",
        "title_en": "Ring",
        "material": "acciaio",
        "price": 19.5,
        "collection_key": "acciaio",
    });
    for payload in [&full, &minimal] {
        let resp = client.post(format!("{base}/api/products")).json(payload).send().await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    let listed: Vec<Value> = reqwest::get(format!("{base}/api/products")).await.unwrap().json().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0], full);

    let mut with_defaults = minimal.clone();
    let fields = with_defaults.as_object_mut().unwrap();
    fields.insert("description_it".into(), Value::Null);
    fields.insert("description_en".into(), Value::Null);
    fields.insert("stone".into(), Value::Null);
    fields.insert("available".into(), json!(true));
    fields.insert("images".into(), json!([]));
    assert_eq!(listed[1], with_defaults);

    for product in &listed {
        assert!(product.get("id").is_none() && product.get("_id").is_none());
    }
}

async fn sign_up(client: &reqwest::Client, base: &str, email: &str) -> Value {
    client
        .post(format!("{base}/api/newsletter"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn newsletter_dedupes_sequential_sign_ups() {
    let base = spawn_with_memory_store().await;
    let client = reqwest::Client::new();
    let first = sign_up(&client, &base, "a@x.com").await;
    assert_eq!(first["status"], "subscribed");
    assert!(first["id"].is_string());

    let second = sign_up(&client, &base, "a@x.com").await;
    assert_eq!(second, json!({"status": "already_subscribed"}));
}

#[tokio::test]
async fn contact_is_received() {
    let base = spawn_with_memory_store().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/contact"))
        .json(&json!({"name": "Sara", "email": "sara@x.com", "message": "Taglia anello?", "language": "it"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "received");
}

#[tokio::test]
async fn degraded_service_still_answers() {
    let base = spawn_server(Database::unavailable()).await;

    let diag: Value = reqwest::get(format!("{base}/test")).await.unwrap().json().await.unwrap();
    assert_eq!(diag["backend"], "✅ Running");
    assert_eq!(diag["database"], "⚠️  Available but not initialized");
    assert_eq!(diag["connection_status"], "Not Connected");

    let resp = reqwest::get(format!("{base}/api/collections")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let listed: Vec<Value> = resp.json().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn diagnostics_list_collections_in_use() {
    let base = spawn_with_memory_store().await;
    reqwest::Client::new()
        .post(format!("{base}/api/newsletter"))
        .json(&json!({"email": "b@x.com", "language": "en"}))
        .send()
        .await
        .unwrap();

    let diag: Value = reqwest::get(format!("{base}/test")).await.unwrap().json().await.unwrap();
    assert_eq!(diag["database"], "✅ Connected & Working");
    assert_eq!(diag["database_name"], "lonaire");
    assert_eq!(diag["collections"], json!(["newslettersubscriber"]));
}

#[tokio::test]
async fn cors_headers_and_preflight() {
    let base = spawn_with_memory_store().await;
    let client = reqwest::Client::new();

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/products"))
        .header("Origin", "https://lonaire.it")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "https://lonaire.it");
    assert_eq!(resp.headers()["access-control-allow-headers"], "content-type");

    let resp = client.get(format!("{base}/api/collections")).send().await.unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let base = spawn_with_memory_store().await;
    let resp = reqwest::get(format!("{base}/api/orders")).await.unwrap();
    assert_eq!(resp.status(), 404);
}
