//! Permissive CORS.
//!
//! Every origin, method and header is allowed. Because credentials are
//! allowed too, the caller's `Origin` is echoed back instead of `*` whenever
//! the request carries one.

use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

const ALLOWED_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const MAX_AGE_SECS: &str = "600";

/// Answers a CORS preflight, or returns `None` for any other request.
///
/// A preflight is an `OPTIONS` request carrying `access-control-request-method`.
pub fn preflight(req: &Request) -> Option<Response> {
    if req.method() != Method::Options {
        return None;
    }
    let requested_method = req.header("access-control-request-method")?;

    let mut builder = Response::builder()
        .status(Status::Ok)
        .header("access-control-allow-methods", ALLOWED_METHODS)
        .header("access-control-max-age", MAX_AGE_SECS);
    if let Some(headers) = req.header("access-control-request-headers") {
        builder = builder.header("access-control-allow-headers", headers);
    }
    tracing::debug!(method = requested_method, "cors preflight");

    let mut response = builder.text("OK");
    decorate(&mut response, req.header("origin"));
    Some(response)
}

/// Adds the simple-response CORS headers.
pub fn decorate(response: &mut Response, origin: Option<&str>) {
    response.set_header("access-control-allow-origin", origin.unwrap_or("*"));
    response.set_header("access-control-allow-credentials", "true");
    if origin.is_some() {
        response.set_header("vary", "Origin");
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn options(headers: &[(&str, &str)]) -> Request {
        Request::new(
            Method::Options,
            "/api/products".to_owned(),
            None,
            headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
            Bytes::new(),
        )
    }

    #[test]
    fn preflight_allows_requested_headers_and_echoes_origin() {
        let req = options(&[
            ("Origin", "https://lonaire.it"),
            ("Access-Control-Request-Method", "POST"),
            ("Access-Control-Request-Headers", "content-type"),
        ]);
        let resp = preflight(&req).expect("preflight");
        assert_eq!(resp.status_code(), Status::Ok);
        assert_eq!(resp.header("access-control-allow-origin"), Some("https://lonaire.it"));
        assert_eq!(resp.header("access-control-allow-headers"), Some("content-type"));
        assert_eq!(resp.header("access-control-allow-credentials"), Some("true"));
        assert_eq!(resp.header("vary"), Some("Origin"));
    }

    #[test]
    fn plain_options_is_not_a_preflight() {
        assert!(preflight(&options(&[("Origin", "https://lonaire.it")])).is_none());
    }

    #[test]
    fn decorate_without_origin_uses_wildcard() {
        let mut resp = Response::text("ok");
        decorate(&mut resp, None);
        assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
        assert_eq!(resp.header("vary"), None);
    }
}
