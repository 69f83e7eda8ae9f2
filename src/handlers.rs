//! HTTP surface of the catalog.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET  | `/`                | [`root`] |
//! | GET  | `/test`            | [`test_database`] |
//! | GET  | `/api/collections` | [`list_collections`] |
//! | POST | `/api/collections` | [`create_collection`] |
//! | GET  | `/api/products`    | [`list_products`] |
//! | POST | `/api/products`    | [`create_product`] |
//! | POST | `/api/contact`     | [`submit_contact`] |
//! | POST | `/api/newsletter`  | [`subscribe_newsletter`] |

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::error;

use crate::catalog::{Catalog, CatalogError, Created, ProductQuery, Receipt, Subscription};
use crate::diagnostics::{self, Diagnostics, MAX_ERROR_CHARS};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::schema::{Collection, Loc, Product, ValidationError, Violation};
use crate::status::Status;
use crate::store::StoreError;

/// Builds the application router over `catalog`.
pub fn router(catalog: Catalog) -> Router<Catalog> {
    Router::new(catalog)
        .get("/", root)
        .get("/test", test_database)
        .get("/api/collections", list_collections)
        .post("/api/collections", create_collection)
        .get("/api/products", list_products)
        .post("/api/products", create_product)
        .post("/api/contact", submit_contact)
        .post("/api/newsletter", subscribe_newsletter)
}

pub async fn root(_catalog: Arc<Catalog>, _req: Request) -> Json<Value> {
    Json(json!({ "message": "LONAIRE API is running" }))
}

pub async fn test_database(catalog: Arc<Catalog>, _req: Request) -> Json<Diagnostics> {
    Json(diagnostics::probe(catalog.database()).await)
}

pub async fn list_collections(
    catalog: Arc<Catalog>,
    _req: Request,
) -> Result<Json<Vec<Collection>>, CatalogError> {
    Ok(Json(catalog.list_collections().await?))
}

pub async fn create_collection(catalog: Arc<Catalog>, req: Request) -> Result<Json<Created>, CatalogError> {
    let payload = body(&req)?;
    Ok(Json(catalog.create_collection(&payload).await?))
}

pub async fn list_products(catalog: Arc<Catalog>, req: Request) -> Result<Json<Vec<Product>>, CatalogError> {
    let query = ProductQuery::from_pairs(&req.query_pairs())?;
    Ok(Json(catalog.list_products(&query).await?))
}

pub async fn create_product(catalog: Arc<Catalog>, req: Request) -> Result<Json<Created>, CatalogError> {
    let payload = body(&req)?;
    Ok(Json(catalog.create_product(&payload).await?))
}

pub async fn submit_contact(catalog: Arc<Catalog>, req: Request) -> Result<Json<Receipt>, CatalogError> {
    let payload = body(&req)?;
    Ok(Json(catalog.submit_contact(&payload).await?))
}

pub async fn subscribe_newsletter(
    catalog: Arc<Catalog>,
    req: Request,
) -> Result<Json<Subscription>, CatalogError> {
    let payload = body(&req)?;
    Ok(Json(catalog.subscribe_newsletter(&payload).await?))
}

/// Parses the JSON body. An absent body or one that is not JSON is itself
/// a violation.
fn body(req: &Request) -> Result<Value, ValidationError> {
    if req.body().is_empty() {
        return Err(ValidationError::single(Violation::new(
            vec![Loc::from("body")],
            "missing",
            "Field required",
        )));
    }
    req.json().map_err(|e| {
        ValidationError::single(Violation::new(
            vec![Loc::from("body"), Loc::Index(e.column())],
            "json_invalid",
            format!("JSON decode error: {e}"),
        ))
    })
}

fn detail(status: Status, detail: Value) -> Response {
    let mut response = Json(json!({ "detail": detail })).into_response();
    response.status = status;
    response
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match self {
            CatalogError::Validation(e) => match serde_json::to_value(&e.violations) {
                Ok(violations) => detail(Status::UnprocessableEntity, violations),
                Err(_) => Response::status(Status::UnprocessableEntity),
            },
            CatalogError::Store(StoreError::Unavailable) => {
                detail(Status::ServiceUnavailable, json!("Database not available"))
            }
            CatalogError::Store(e) => {
                error!("storage failure: {e}");
                detail(
                    Status::InternalServerError,
                    json!(diagnostics::truncate(&e.to_string(), MAX_ERROR_CHARS)),
                )
            }
        }
    }
}
