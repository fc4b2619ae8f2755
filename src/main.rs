//! Member Auth Service Development Server
//!
//! Runs the full HTTP surface (registration, login with progressive
//! lockout, and security-question account recovery) against PostgreSQL.
//! For deployments that need a narrower surface, build a custom router with
//! `RouterBuilder` in your own binary.

use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use member_auth_service::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    store::PgCredentialStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    env_logger::init();

    log::info!(
        "Starting Member Auth Service v{}",
        member_auth_service::VERSION
    );

    let config = AppConfig::from_env()?;
    config.validate()?;
    log::info!("Configuration loaded and validated");

    let pool = config.database.create_pool().await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database migrations completed");

    let store = Arc::new(PgCredentialStore::new(pool));
    let app_state = AppState::new(store, &config.security);
    log::info!("Services initialized");
    log::info!("   - Registration (validation pipeline)");
    log::info!("   - Login (progressive lockout engine)");
    log::info!("   - Account recovery (security questions)");

    let router = RouterBuilder::with_all_routes().build();
    let app = router.with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any) // Permissive CORS for development
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .into_inner(),
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("API endpoints:");
    log::info!("   GET  /health - Health check");
    log::info!("   GET  /auth/questions - Security question catalog");
    log::info!("   POST /auth/register - Member registration");
    log::info!("   POST /auth/login - Login");
    log::info!("   POST /auth/recovery/begin - Start account recovery");
    log::info!("   POST /auth/recovery/answers - Verify security answers");
    log::info!("   POST /auth/recovery/password - Set new password");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("Listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
