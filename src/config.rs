//! Application configuration management.
//!
//! Configuration is assembled once at startup from three sources:
//!
//! - Environment variables (optionally seeded from a `.env` file), deserialized with `envy`
//! - An optional positional `PORT` command-line argument, which wins over `SERVER_PORT`
//! - An optional processor properties file holding payment processor credentials
//!
//! The resulting [`Config`] is immutable and shared with every handler through the application state.

use std::{collections::BTreeMap, fmt, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;

/// Port used when neither the command line nor the environment supplies a valid one.
pub const DEFAULT_PORT: u16 = 8080;

/// Amounts strictly below this many minor currency units skip the game server.
pub const DEFAULT_AUTO_APPROVE_THRESHOLD: i64 = 300;

/// Largest static file that will be served (10 MiB).
pub const DEFAULT_MAX_STATIC_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of requests processed concurrently.
pub const DEFAULT_WORKER_POOL_SIZE: usize = 10;

/// Connect and read timeout for game server calls.
pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 10_000;

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid GAME_SERVER_URL `{url}`: {source}")]
    InvalidGameServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("WORKER_POOL_SIZE must be at least 1")]
    EmptyWorkerPool,
}

/// Raw environment variables, before validation.
///
/// Field names are converted by `envy`: `game_server_url` -> `GAME_SERVER_URL`.
#[derive(Debug, Deserialize)]
struct EnvConfig {
    /// Kept as text so a bad value degrades to the default port instead of failing startup.
    server_port: Option<String>,

    #[serde(default = "default_game_server_url")]
    game_server_url: String,

    #[serde(default = "default_game_server_path")]
    game_server_path: String,

    #[serde(default = "default_threshold")]
    auto_approve_threshold: i64,

    #[serde(default = "default_static_dir")]
    static_dir: PathBuf,

    #[serde(default = "default_max_static_file_bytes")]
    max_static_file_bytes: u64,

    #[serde(default = "default_worker_pool_size")]
    worker_pool_size: usize,

    #[serde(default = "default_backend_timeout_ms")]
    backend_connect_timeout_ms: u64,

    #[serde(default = "default_backend_timeout_ms")]
    backend_read_timeout_ms: u64,

    #[serde(default = "default_processor_properties")]
    processor_properties: PathBuf,
}

fn default_game_server_url() -> String {
    "http://localhost:7998".to_string()
}

fn default_game_server_path() -> String {
    "/api/payment/process".to_string()
}

fn default_threshold() -> i64 {
    DEFAULT_AUTO_APPROVE_THRESHOLD
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_max_static_file_bytes() -> u64 {
    DEFAULT_MAX_STATIC_FILE_BYTES
}

fn default_worker_pool_size() -> usize {
    DEFAULT_WORKER_POOL_SIZE
}

fn default_backend_timeout_ms() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_MS
}

fn default_processor_properties() -> PathBuf {
    PathBuf::from("cryptoKeys.properties")
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,

    /// Base URL of the game server, without a trailing slash.
    pub game_server_url: String,

    /// Path appended to `game_server_url` for payment forwarding.
    pub game_server_path: String,

    pub auto_approve_threshold: i64,

    /// Root directory for static assets.
    pub static_dir: PathBuf,

    pub max_static_file_bytes: u64,

    /// Upper bound on requests handled at the same time.
    pub worker_pool_size: usize,

    pub backend_connect_timeout: Duration,

    pub backend_read_timeout: Duration,

    pub processor: ProcessorCredentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            game_server_url: default_game_server_url(),
            game_server_path: default_game_server_path(),
            auto_approve_threshold: DEFAULT_AUTO_APPROVE_THRESHOLD,
            static_dir: default_static_dir(),
            max_static_file_bytes: DEFAULT_MAX_STATIC_FILE_BYTES,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            backend_connect_timeout: Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
            backend_read_timeout: Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
            processor: ProcessorCredentials::default(),
        }
    }
}

impl Config {
    /// Load configuration from the environment and the processor properties file.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables. `port_arg` is the positional command-line
    /// port, if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An environment variable cannot be parsed into its expected type
    /// - `GAME_SERVER_URL` is not a valid URL
    /// - `WORKER_POOL_SIZE` is zero
    ///
    /// A missing or unreadable properties file is not an error.
    pub fn load(port_arg: Option<&str>) -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        let env = envy::from_env::<EnvConfig>()?;
        let processor = ProcessorCredentials::load(&env.processor_properties);

        Self::from_parts(env, port_arg, processor)
    }

    fn from_parts(
        env: EnvConfig,
        port_arg: Option<&str>,
        processor: ProcessorCredentials,
    ) -> Result<Self, ConfigError> {
        let game_server_url = normalize_base_url(&env.game_server_url)?;

        if env.worker_pool_size == 0 {
            return Err(ConfigError::EmptyWorkerPool);
        }

        Ok(Self {
            server_port: resolve_port(port_arg, env.server_port.as_deref()),
            game_server_url,
            game_server_path: normalize_path(&env.game_server_path),
            auto_approve_threshold: env.auto_approve_threshold,
            static_dir: env.static_dir,
            max_static_file_bytes: env.max_static_file_bytes,
            worker_pool_size: env.worker_pool_size,
            backend_connect_timeout: Duration::from_millis(env.backend_connect_timeout_ms),
            backend_read_timeout: Duration::from_millis(env.backend_read_timeout_ms),
            processor,
        })
    }

    /// Full URL that payments are forwarded to.
    pub fn game_server_endpoint(&self) -> String {
        format!("{}{}", self.game_server_url, self.game_server_path)
    }
}

/// Pick the listening port.
///
/// The command-line value takes precedence over `SERVER_PORT`. The first source
/// that is present decides: if it does not parse as a port, a warning is logged and
/// [`DEFAULT_PORT`] is used.
pub fn resolve_port(cli: Option<&str>, env: Option<&str>) -> u16 {
    let Some(raw) = cli.or(env) else {
        tracing::info!("Using default port {}", DEFAULT_PORT);
        return DEFAULT_PORT;
    };

    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => port,
        _ => {
            tracing::warn!(
                "Invalid port number `{}`, falling back to default port {}",
                raw,
                DEFAULT_PORT
            );
            DEFAULT_PORT
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|source| ConfigError::InvalidGameServerUrl {
        url: raw.to_string(),
        source,
    })?;

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn normalize_path(raw: &str) -> String {
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw)
    }
}

/// Payment processor credentials read from the properties file.
///
/// The file uses `KEY=VALUE` lines. Unknown keys are kept in `extra`.
#[derive(Clone, Default)]
pub struct ProcessorCredentials {
    /// `TOSS_CLIENT_KEY`
    pub client_key: Option<String>,

    /// `TOSS_SECRET_KEY`
    pub secret_key: Option<String>,

    /// `GAME_SERVER_API_KEY`, sent as `X-API-KEY` on game server calls.
    pub game_server_api_key: Option<String>,

    pub extra: BTreeMap<String, String>,
}

impl ProcessorCredentials {
    /// Read credentials from `path`.
    ///
    /// Never fails: a missing file or a malformed line is logged and the
    /// defaults (no credentials) are used for whatever could not be read.
    pub fn load(path: &Path) -> Self {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) => {
                tracing::warn!(
                    "Processor properties file {} not loaded ({}), using defaults",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };

        let mut pairs = Vec::new();
        for item in iter {
            match item {
                Ok(pair) => pairs.push(pair),
                Err(e) => tracing::warn!("Skipping malformed line in {}: {}", path.display(), e),
            }
        }

        tracing::info!("Processor properties loaded from {}", path.display());
        Self::from_pairs(pairs)
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut credentials = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "TOSS_CLIENT_KEY" => credentials.client_key = Some(value),
                "TOSS_SECRET_KEY" => credentials.secret_key = Some(value),
                "GAME_SERVER_API_KEY" => credentials.game_server_api_key = Some(value),
                _ => {
                    credentials.extra.insert(key, value);
                }
            }
        }

        credentials
    }
}

// Secrets never reach the logs.
impl fmt::Debug for ProcessorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() { "<set>" } else { "<unset>" }
        }

        f.debug_struct("ProcessorCredentials")
            .field("client_key", &redact(&self.client_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("game_server_api_key", &redact(&self.game_server_api_key))
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}
