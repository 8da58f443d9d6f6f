//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle validation, the auto-approval rule and game server calls.

pub mod game_server_client;
pub mod payment_service;
