//! Unified error type.

use thiserror::Error;

/// The error type returned by the server's fallible operations.
///
/// Application-level failures (404, 422, 503, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port or accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
