//! User Form API - persistent HTTP server.
//!
//! Serves the users CRUD API under `USER_FORM_BASE_PATH` (default `/api`) on
//! port 5000. The `users` table is created before the listener binds; if that
//! fails the process exits with status 1.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use user_form_api::config::ServerConfig;
use user_form_api::db::{self, PgUserStore};
use user_form_api::routes;
use user_form_api::state::AppState;
use user_form_api::telemetry::{self, LogTarget};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(
        config.sentry_dsn.as_deref(),
        config.sentry_environment.clone(),
    );
    telemetry::init_tracing(config.log_format, LogTarget::Stdout);

    let pool = match db::create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "Failed to connect to database");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Database pool created");

    let state = AppState::new(Arc::new(PgUserStore::new(pool)), config.base_path.clone());

    if let Err(err) = state.users().ensure_schema().await {
        tracing::error!(error = %err, "Error initializing database");
        return ExitCode::FAILURE;
    }

    let app = routes::server_app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!(base_path = %config.base_path, "user-form-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    ExitCode::SUCCESS
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
