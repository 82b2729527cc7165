//! Environment-driven configuration, loaded once at process startup.

use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {source}")]
    InvalidValue {
        var: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{var} is required but was not set")]
    Missing { var: &'static str },
}

fn env_or(var: &'static str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::Missing { var })
}

fn env_parsed<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| ConfigError::InvalidValue { var, source: Box::new(e) }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub ssl: bool,
    pub pool_size: u32,
    pub idle_timeout: Duration,
    pub connection_timeout: Duration,
    pub logging: bool,
    /// Whether the process is expected to apply/verify schema migrations on
    /// startup. Migration execution itself lives outside this crate.
    pub synchronize: bool,
}

impl DbConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or("DB_HOST", "localhost"),
            port: env_parsed("DB_PORT", 5432)?,
            username: env_or("DB_USERNAME", "postgres"),
            password: env_or("DB_PASSWORD", "postgres"),
            name: env_or("DB_NAME", "bbqjudge"),
            ssl: env_parsed("DB_SSL", false)?,
            pool_size: env_parsed("DB_POOL_SIZE", 10)?,
            idle_timeout: Duration::from_secs(env_parsed("DB_IDLE_TIMEOUT", 30)?),
            connection_timeout: Duration::from_secs(env_parsed("DB_CONNECTION_TIMEOUT", 10)?),
            logging: env_parsed("DB_LOGGING", false)?,
            synchronize: env_parsed("DB_SYNCHRONIZE", false)?,
        })
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username,
            self.password,
            self.host,
            self.port,
            self.name,
            if self.ssl { "require" } else { "prefer" },
        )
    }
}

/// Process-wide configuration. Never implements `Display`; use the `Debug`
/// impl's secret redaction when logging it at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub jwt_secret: Vec<u8>,
    pub jwt_expires_in: Duration,
    pub barcode_secret: Vec<u8>,
    pub port: u16,
    pub node_env: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            db: DbConfig::from_env()?,
            jwt_secret: env_required("JWT_SECRET")?.into_bytes(),
            jwt_expires_in: Duration::from_secs(env_parsed("JWT_EXPIRES_IN", 86_400)?),
            barcode_secret: env_required("BARCODE_SECRET")?.into_bytes(),
            port: env_parsed("PORT", 8080)?,
            node_env: env_or("NODE_ENV", "development"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.node_env == "production"
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_host", &self.db.host)
            .field("db_port", &self.db.port)
            .field("db_name", &self.db.name)
            .field("db_ssl", &self.db.ssl)
            .field("db_pool_size", &self.db.pool_size)
            .field("jwt_secret", &"[redacted]")
            .field("jwt_expires_in", &self.jwt_expires_in)
            .field("barcode_secret", &"[redacted]")
            .field("port", &self.port)
            .field("node_env", &self.node_env)
            .finish()
    }
}
