//! Incoming HTTP request type.

use std::error::Error as StdError;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use serde_json::Value;
use thiserror::Error;

use crate::method::Method;

/// Largest request body read into memory.
pub(crate) const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub(crate) enum BodyError {
    #[error("request body exceeds the size limit")]
    TooLarge,

    #[error("failed to read request body: {0}")]
    Read(Box<dyn StdError + Send + Sync>),
}

/// Collects `body`, refusing anything past `limit` bytes.
pub(crate) async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(BodyError::TooLarge),
        Err(e) => Err(BodyError::Read(e)),
    }
}

/// An incoming HTTP request with its body fully collected.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        query: Option<String>,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        Self { method, path, query, headers, body }
    }

    /// Collects a hyper request into a [`Request`].
    ///
    /// Returns `Ok(None)` when the method is not one [`Method`] knows about.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Option<Self>, BodyError> {
        let (parts, body) = req.into_parts();
        let Ok(method) = parts.method.as_str().parse::<Method>() else {
            return Ok(None);
        };
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned())))
            .collect();
        let body = read_body(body, MAX_BODY_BYTES).await?;

        Ok(Some(Self::new(
            method,
            parts.uri.path().to_owned(),
            parts.uri.query().map(str::to_owned),
            headers,
            body,
        )))
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decoded `name=value` pairs from the query string, in order.
    ///
    /// A malformed query string yields no pairs rather than an error.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .unwrap_or_default()
    }

    /// Parses the body as an untyped JSON value.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
