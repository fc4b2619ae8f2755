//! HTTP API Layer
//!
//! Handlers and configurable route definitions.

pub mod handlers;
pub mod routes;

// Re-export commonly used types
pub use handlers::{AppState, SuccessResponse, SESSION_COOKIE};
pub use routes::{create_routes, RouterBuilder};
