//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Ledger engine tuning.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Timeout for acquiring a connection, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    5
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key the access tokens are signed with.
    pub secret: String,
}

/// Ledger engine configuration: optimistic-concurrency retry and statement timeout.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Attempts per mutating operation before giving up on version conflicts.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the second attempt, in milliseconds. Doubles per attempt.
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,
    /// Upper bound for a single backoff, in milliseconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// `statement_timeout` applied inside every ledger transaction, in milliseconds.
    /// Zero disables it.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_backoff() -> u64 {
    20
}

fn default_max_backoff() -> u64 {
    500
}

fn default_statement_timeout() -> u64 {
    5_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff(),
            max_backoff_ms: default_max_backoff(),
            statement_timeout_ms: default_statement_timeout(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TRANCHE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_config_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_backoff_ms, 20);
        assert_eq!(config.max_backoff_ms, 500);
        assert_eq!(config.statement_timeout_ms, 5_000);
    }

    #[test]
    fn test_app_config_from_toml_fills_defaults() {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 9000

                [database]
                url = "postgres://localhost/tranche"

                [jwt]
                secret = "s3cret"

                [ledger]
                max_attempts = 3
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let app: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(app.server.port, 9000);
        assert_eq!(app.server.host, "0.0.0.0");
        assert_eq!(app.database.max_connections, 10);
        assert_eq!(app.ledger.max_attempts, 3);
        assert_eq!(app.ledger.base_backoff_ms, 20);
    }
}
