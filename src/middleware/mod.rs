//! HTTP middleware components.
//!
//! Layers that wrap every route, including the static fallback.

/// Fixed-size worker pool
pub mod worker_pool;
