//! Application state shared by every handler.
//!
//! Everything in here is immutable after startup, so handlers read it
//! concurrently without locking. Cloning is cheap: the configuration sits
//! behind an `Arc` and the HTTP client shares its connection pool.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::game_server_client::GameServerClient;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Client used to forward payments to the game server
    pub game_server: GameServerClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let game_server = GameServerClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            game_server,
        })
    }
}
