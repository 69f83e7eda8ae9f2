//! Middleware layer.
//!
//! Cross-cutting concerns applied by the router around every handler call.
//!
//! - [`cors`]: permissive cross-origin headers and preflight answers.

pub mod cors;
