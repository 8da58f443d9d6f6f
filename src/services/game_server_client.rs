//! HTTP client for the game server.
//!
//! Sends one JSON POST per call with bounded connect and read timeouts. The
//! game server reports errors as JSON bodies, so non-2xx answers are parsed
//! the same way as successful ones.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::codec::{self, Record};
use crate::config::Config;
use crate::error::AppError;
use crate::models::outbound::OutboundResult;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Shared client; cloning is cheap and reuses the connection pool.
#[derive(Debug, Clone)]
pub struct GameServerClient {
    client: reqwest::Client,
    api_key: Option<HeaderValue>,
}

impl GameServerClient {
    /// Build the client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// - `Internal`: the TLS backend could not be initialised, or the API key
    ///   contains characters that are not valid in a header
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.backend_connect_timeout)
            .read_timeout(config.backend_read_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client error: {}", e)))?;

        let api_key = config
            .processor
            .game_server_api_key
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Invalid GAME_SERVER_API_KEY: {}", e)))?
            .map(|mut value| {
                value.set_sensitive(true);
                value
            });

        Ok(Self { client, api_key })
    }

    /// Headers sent with every game server call.
    pub fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            headers.insert(API_KEY_HEADER, key.clone());
        }
        headers
    }

    /// POST `body` as JSON to `url`.
    ///
    /// # Returns
    ///
    /// The parsed answer, whatever the status code. An empty body becomes an
    /// `EMPTY_RESPONSE` failure result.
    ///
    /// # Errors
    ///
    /// - `BackendUnreachable`: connect failure, DNS failure, or timeout
    /// - `InvalidBackendResponse`: the body is not a JSON object
    pub async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &Record,
    ) -> Result<OutboundResult, AppError> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(codec::serialize(body))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Game server responded with status {}", status);

        let text = response.text().await?;
        if text.trim().is_empty() {
            tracing::warn!("Game server returned an empty body (status {})", status);
            return Ok(OutboundResult::empty_backend_response());
        }

        match codec::parse(text.as_bytes()) {
            Ok(payload) => Ok(OutboundResult::from_backend(status.is_success(), payload)),
            Err(e) => Err(AppError::InvalidBackendResponse(format!(
                "status {}: {}",
                status, e
            ))),
        }
    }

    /// POST `body` to `url` with [`default_headers`](Self::default_headers).
    pub async fn post_payment(&self, url: &str, body: &Record) -> Result<OutboundResult, AppError> {
        self.post(url, self.default_headers(), body).await
    }
}
