//! Configuration Module
//!
//! Centralized, environment-driven configuration for the service.

pub mod security;

// Re-export configuration types for convenient access
pub use security::{LockoutPolicy, LockoutTier, SecurityConfig, SecurityConfigError};

use crate::database::DatabaseConfig;

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Security configuration
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Load the full application configuration from the environment.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server: ServerConfig {
                host: env::get_string("SERVER_HOST", "127.0.0.1"),
                port: env::get_u16("SERVER_PORT", 3000),
            },
            database: DatabaseConfig::from_env()?,
            security: SecurityConfig::from_env(),
        })
    }

    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<(), SecurityConfigError> {
        self.security.validate()
    }
}
