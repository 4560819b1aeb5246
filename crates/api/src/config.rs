use std::str::FromStr;

use cardvault_core::ingest::ConsistencyPolicy;

use crate::auth::jwt::JwtConfig;

/// Default upload size limit: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_TOKEN_TTL_MINS: i64 = 15;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted upload request body in bytes.
    pub max_upload_bytes: usize,
    /// How footer and declared-count mismatches affect upload status.
    pub upload_consistency: ConsistencyPolicy,
    /// Create the default accounts on an empty `users` table at startup.
    pub seed_default_users: bool,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `MAX_UPLOAD_BYTES`          | `10485760`              |
    /// | `UPLOAD_STRICT_CONSISTENCY` | `false`                 |
    /// | `SEED_DEFAULT_USERS`        | `true`                  |
    /// | `JWT_SECRET`                | required                |
    /// | `JWT_ACCESS_EXPIRY_MINS`    | `15`                    |
    ///
    /// # Panics
    ///
    /// Panics if a variable is set but does not parse, or if `JWT_SECRET`
    /// is unset or empty.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES);

        let upload_consistency = if env_or("UPLOAD_STRICT_CONSISTENCY", false) {
            ConsistencyPolicy::Strict
        } else {
            ConsistencyPolicy::Advisory
        };

        let seed_default_users: bool = env_or("SEED_DEFAULT_USERS", true);

        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");
        let jwt = JwtConfig {
            secret,
            ttl_mins: env_or("JWT_ACCESS_EXPIRY_MINS", DEFAULT_TOKEN_TTL_MINS),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            upload_consistency,
            seed_default_users,
            jwt,
        }
    }
}

/// Read `key` from the environment, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
