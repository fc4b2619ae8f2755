//! Service Layer
//!
//! The behavioural core: registration validation, the login lockout engine,
//! the recovery protocol, and the session store.

pub mod auth;
pub mod recovery;
pub mod registration;
pub mod session;

// Re-export services
pub use auth::{AuthError, AuthService, LoginOutcome};
pub use recovery::{RecoveryError, RecoveryService};
pub use registration::{RegistrationError, RegistrationService};
pub use session::{SessionFailure, SessionStore};
