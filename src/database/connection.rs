//! Database Connection Management
//!
//! PostgreSQL connection pooling with SQLx.

use sqlx::PgPool;
use std::time::Duration;

/// Database connection pool type alias for convenience
pub type DatabasePool = PgPool;

/// Database configuration for connection setup
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/member_auth".to_string(),
            max_connections: 16,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl DatabaseConfig {
    /// Create database configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; pool tuning knobs fall back to defaults.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let defaults = Self::default();
        let url = std::env::var("DATABASE_URL")?;

        Ok(Self {
            url,
            max_connections: crate::config::env::get_u32(
                "DB_MAX_CONNECTIONS",
                defaults.max_connections,
            ),
            min_connections: crate::config::env::get_u32(
                "DB_MIN_CONNECTIONS",
                defaults.min_connections,
            ),
            connect_timeout: Duration::from_secs(crate::config::env::get_u64(
                "DB_CONNECT_TIMEOUT",
                defaults.connect_timeout.as_secs(),
            )),
            idle_timeout: Duration::from_secs(crate::config::env::get_u64(
                "DB_IDLE_TIMEOUT",
                defaults.idle_timeout.as_secs(),
            )),
        })
    }

    /// Create a database connection pool from this configuration
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .connect(&self.url)
            .await
    }
}
