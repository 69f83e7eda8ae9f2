//! # lonaire
//!
//! Catalog backend for the LONAIRE jewelry storefront: collections,
//! products, contact messages and newsletter sign-ups over a document store.
//!
//! ## Layers
//!
//! - [`schema`]: entity shapes and payload validation, every violation reported.
//! - [`store`] / [`database`]: document storage, typed repositories, degraded
//!   mode when no database is configured.
//! - [`catalog`]: the operations, validate then persist.
//! - [`handlers`]: the HTTP surface, on a small hyper + matchit core
//!   ([`Router`], [`Server`], [`middleware::cors`]).
//! - [`diagnostics`]: the `/test` health report.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use lonaire::{Catalog, Config, Database, Server, handlers};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lonaire::Error> {
//!     let config = Config::with_database_url(Some("memory://"));
//!     let catalog = Catalog::new(Database::connect(&config));
//!     Server::bind(config.listen_addr()).await?.serve(handlers::router(catalog)).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod catalog;
pub mod config;
pub mod database;
pub mod diagnostics;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod schema;
pub mod store;

pub use catalog::Catalog;
pub use config::Config;
pub use database::{Database, Entity, Repository};
pub use error::Error;
pub use filter::{Document, Filter, Predicate};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
