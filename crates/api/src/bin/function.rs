//! User Form API - serverless function host.
//!
//! Reads one function event as JSON from stdin, handles it, and writes the
//! function response as JSON to stdout. Logs go to stderr.
//!
//! ```text
//! echo '{"httpMethod":"GET","path":"/.netlify/functions/api/users"}' \
//!     | user-form-function --mode raw
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{Read, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use user_form_api::config::{FunctionConfig, LogFormat};
use user_form_api::db::{self, PgUserStore, RepositoryError};
use user_form_api::error::AppError;
use user_form_api::functions::{FrameworkHandler, FunctionEvent, FunctionResponse, RawHandler};
use user_form_api::state::AppState;
use user_form_api::telemetry::{self, LogTarget};

/// Which adapter handles the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Hand-written method and path dispatch.
    Raw,
    /// The axum router shared with the persistent server.
    Framework,
}

#[derive(Parser)]
#[command(name = "user-form-function")]
#[command(about = "Handle one serverless function event from stdin")]
#[command(version)]
struct Cli {
    /// Adapter to run
    #[arg(long, value_enum, default_value_t = Mode::Framework)]
    mode: Mode,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match FunctionConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            telemetry::init_tracing(LogFormat::Text, LogTarget::Stderr);
            tracing::error!(error = %err, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init_tracing(config.log_format, LogTarget::Stderr);

    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        tracing::error!(error = %err, "Failed to read event from stdin");
        return ExitCode::FAILURE;
    }

    let event: FunctionEvent = match serde_json::from_str(&input) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "Malformed function event");
            return ExitCode::FAILURE;
        }
    };

    let response = handle(cli.mode, &config, event).await;

    let mut stdout = std::io::stdout().lock();
    if let Err(err) = serde_json::to_writer(&mut stdout, &response)
        .map_err(std::io::Error::from)
        .and_then(|()| stdout.write_all(b"\n"))
    {
        tracing::error!(error = %err, "Failed to write function response");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn handle(mode: Mode, config: &FunctionConfig, event: FunctionEvent) -> FunctionResponse {
    let pool = match db::create_lazy_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(err) => {
            return FunctionResponse::error(&AppError::store(
                "initializing database",
                RepositoryError::Database(err),
            ));
        }
    };

    let state = AppState::new(Arc::new(PgUserStore::new(pool)), config.base_path.clone());

    match mode {
        Mode::Raw => {
            RawHandler::new(state.users().clone(), state.base_path())
                .handle(event)
                .await
        }
        Mode::Framework => FrameworkHandler::new(state).handle(event).await,
    }
}
