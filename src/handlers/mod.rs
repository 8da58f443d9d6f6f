//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (raw body, URI, method)
//! 2. Delegates to a service or reads the filesystem
//! 3. Returns HTTP response (JSON or plain text, status code)

/// Liveness endpoint
pub mod health;
/// Payment processing and verification endpoints
pub mod payments;
/// Catch-all static asset serving
pub mod static_files;
