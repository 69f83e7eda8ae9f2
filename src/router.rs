//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Application state is
//! held once in an `Arc` and handed to every handler call.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use serde_json::json;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::cors;
use crate::request::Request;
use crate::response::{Json, IntoResponse, Response};
use crate::status::Status;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    state: Arc<S>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new(state: S) -> Self {
        Self { routes: HashMap::new(), state: Arc::new(state) }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `path` conflicts with a route already registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Post, path, handler)
    }

    fn lookup(&self, method: Method, path: &str) -> Option<BoxedHandler<S>> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }

    fn path_known(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }

    /// Routes one request and produces one response, CORS headers included.
    pub async fn handle(&self, req: Request) -> Response {
        let origin = req.header("origin").map(str::to_owned);

        if let Some(preflight) = cors::preflight(&req) {
            return preflight;
        }

        let mut response = match self.lookup(req.method(), req.path()) {
            Some(handler) => handler.call(Arc::clone(&self.state), req).await,
            None if self.path_known(req.path()) => method_not_allowed(),
            None => Response::builder()
                .status(Status::NotFound)
                .json(br#"{"detail":"Not Found"}"#.to_vec()),
        };
        cors::decorate(&mut response, origin.as_deref());
        response
    }
}

/// `405` for a path registered under other methods, or a method the server
/// does not know at all.
pub(crate) fn method_not_allowed() -> Response {
    let mut response = Json(json!({ "detail": "Method Not Allowed" })).into_response();
    response.status = Status::MethodNotAllowed;
    response
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    async fn hello(state: Arc<&'static str>, _req: Request) -> String {
        format!("hello {state}")
    }

    fn get(path: &str) -> Request {
        Request::new(Method::Get, path.to_owned(), None, Vec::new(), Bytes::new())
    }

    #[tokio::test]
    async fn dispatches_to_the_registered_handler_with_state() {
        let router = Router::new("lonaire").get("/", hello);
        let resp = router.handle(get("/")).await;
        assert_eq!(resp.status_code(), Status::Ok);
        assert_eq!(resp.body(), b"hello lonaire");
        assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
    }

    #[tokio::test]
    async fn unknown_path_is_a_json_404() {
        let router = Router::new(()).get("/", |_: Arc<()>, _: Request| async { "ok" });
        let resp = router.handle(get("/missing")).await;
        assert_eq!(resp.status_code(), Status::NotFound);
        assert_eq!(resp.body(), br#"{"detail":"Not Found"}"#);
    }

    #[tokio::test]
    async fn wrong_method_on_known_path_is_405() {
        let router = Router::new(()).post("/api/contact", |_: Arc<()>, _: Request| async { "ok" });
        let resp = router.handle(get("/api/contact")).await;
        assert_eq!(resp.status_code(), Status::MethodNotAllowed);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic_at_startup() {
        let _ = Router::new(())
            .get("/{a}", |_: Arc<()>, _: Request| async { "a" })
            .get("/{b}", |_: Arc<()>, _: Request| async { "b" });
    }
}
