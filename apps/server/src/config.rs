use std::{net::SocketAddr, time::Duration};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Runtime settings, all sourced from `PT_*` environment variables
/// with workable defaults for local development.
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub finnhub_api_key: String,
    pub jwt_secret: Option<String>,
    pub token_ttl: Duration,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub snapshot_interval: Duration,
    pub starting_cash: String,
}

impl Config {
    /// Reads the environment, loading `.env` first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let listen_addr = env_or("PT_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .expect("Invalid PT_LISTEN_ADDR");

        let cors_allow = env_or("PT_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            listen_addr,
            db_path: env_or("PT_DB_PATH", "./db/papertrade.db"),
            finnhub_api_key: std::env::var("PT_FINNHUB_API_KEY").unwrap_or_default(),
            jwt_secret: std::env::var("PT_JWT_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            token_ttl: Duration::from_secs(env_u64("PT_TOKEN_TTL_SECS", 86_400)),
            cors_allow,
            request_timeout: Duration::from_millis(env_u64("PT_REQUEST_TIMEOUT_MS", 30_000)),
            snapshot_interval: Duration::from_secs(env_u64("PT_SNAPSHOT_INTERVAL_SECS", 86_400)),
            starting_cash: env_or(
                "PT_STARTING_CASH",
                papertrade_core::constants::DEFAULT_STARTING_CASH,
            ),
        }
    }
}
