//! Payment Relay Server Library
//!
//! Receives payment notifications from the payment processor, applies the
//! small-amount approval rule, forwards everything else to the game server,
//! and answers the processor with a translated JSON response.
//!
//! The binary in `main.rs` only wires configuration, logging and the
//! listener around [`app::router`]; everything else lives here so it can be
//! exercised by the integration tests.

pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use app::router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
