//! Member Auth Service Library
//!
//! Authentication core for a membership application: registration with a
//! report-everything validation pipeline, login with progressive account
//! lockout, and security-question account recovery that re-authorizes a
//! password change without email or SMS.
//!
//! # Features
//!
//! - **Registration pipeline**: every field rule checked independently, all
//!   violations reported in one pass as a per-field error map
//! - **Progressive lockout**: escalating lockout windows derived from the
//!   stored failure counter, self-healing by wall-clock comparison alone
//! - **Security-question recovery**: two-stage protocol granting a
//!   single-use password-reset authorization
//! - **Password security**: bcrypt hashing for the password and each
//!   security answer independently
//! - **Narrow store seam**: one async trait over PostgreSQL (SQLx) with an
//!   in-memory implementation for tests
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use member_auth_service::{
//!     api::{AppState, RouterBuilder},
//!     config::AppConfig,
//!     store::PgCredentialStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let pool = config.database.create_pool().await?;
//!     let store = Arc::new(PgCredentialStore::new(pool));
//!
//!     let app_state = AppState::new(store, &config.security);
//!     let app = RouterBuilder::with_all_routes()
//!         .build()
//!         .with_state(app_state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: HTTP handlers and configurable route definitions
//! - **Service Layer**: registration, lockout engine, recovery protocol,
//!   session store
//! - **Store**: the narrow credential-store trait and its implementations
//! - **Models**: credential record, question catalog, payloads, sessions
//! - **Utils**: field-error map, error taxonomy, hashing, validation

/// HTTP API layer with handlers and configurable routing
pub mod api;

/// Configuration management
pub mod config;

/// Database connection management
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Business logic: registration, login lockout, recovery, sessions
pub mod service;

/// Credential-store trait and implementations
pub mod store;

/// Shared utilities for errors, hashing, and validation
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use config::{AppConfig, LockoutPolicy, SecurityConfig};
pub use models::{
    BeginRecoveryRequest, LoginRequest, LoginSession, RecoveryAuthorization, RegisterRequest,
    SecurityQuestionId, SetPasswordRequest, SubmitAnswersRequest, User,
};
pub use service::{
    AuthService, LoginOutcome, RecoveryService, RegistrationService, SessionStore,
};
pub use store::{CredentialStore, InMemoryCredentialStore, PgCredentialStore, StoreError};
pub use utils::error::{AppError, AppResult, ErrorResponse, FieldErrors};

// Re-export database utilities for configuration
pub use database::{DatabaseConfig, DatabasePool};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
