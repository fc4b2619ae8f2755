//! API Route Definitions
//!
//! Route construction through a builder that can selectively enable
//! endpoints, so a deployment can expose only what it needs (e.g. a
//! login-only instance with registration turned off).

use axum::{routing::get, routing::post, Router};

use super::handlers::{self, AppState};

/// Builder for creating API routes with configurable endpoints
#[derive(Default)]
pub struct RouterBuilder {
    /// GET /health
    health_check: bool,
    /// GET /auth/questions
    question_catalog: bool,
    /// POST /auth/register
    register: bool,
    /// POST /auth/login
    login: bool,
    /// POST /auth/recovery/{begin,answers,password}
    recovery: bool,
}

impl RouterBuilder {
    /// All routes disabled; enable them explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every endpoint enabled.
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            question_catalog: true,
            register: true,
            login: true,
            recovery: true,
        }
    }

    /// Login and recovery only, for deployments where registration is
    /// handled elsewhere.
    pub fn with_auth_routes() -> Self {
        Self {
            health_check: true,
            question_catalog: true,
            register: false,
            login: true,
            recovery: true,
        }
    }

    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    pub fn question_catalog(mut self, enabled: bool) -> Self {
        self.question_catalog = enabled;
        self
    }

    pub fn register(mut self, enabled: bool) -> Self {
        self.register = enabled;
        self
    }

    pub fn login(mut self, enabled: bool) -> Self {
        self.login = enabled;
        self
    }

    pub fn recovery(mut self, enabled: bool) -> Self {
        self.recovery = enabled;
        self
    }

    /// Builds the router; callers attach state with `.with_state(...)`.
    pub fn build(self) -> Router<AppState> {
        let mut router = Router::new();

        if self.health_check {
            router = router.route("/health", get(handlers::health_check));
        }
        if self.question_catalog {
            router = router.route("/auth/questions", get(handlers::question_catalog));
        }
        if self.register {
            router = router.route("/auth/register", post(handlers::register));
        }
        if self.login {
            router = router.route("/auth/login", post(handlers::login));
        }
        if self.recovery {
            router = router
                .route("/auth/recovery/begin", post(handlers::begin_recovery))
                .route(
                    "/auth/recovery/answers",
                    post(handlers::submit_recovery_answers),
                )
                .route("/auth/recovery/password", post(handlers::set_new_password));
        }

        router
    }
}

/// Convenience constructor for the full route set.
pub fn create_routes() -> Router<AppState> {
    RouterBuilder::with_all_routes().build()
}
