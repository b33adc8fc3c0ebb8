//! Bulk freeze requests for learners that have not validated a quest.
//!
//! Two OAuth2-protected services are involved: a listing API (client-credentials grant) that
//! pages through learners, and a freeze service (password grant) that accepts one bulk request.

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;
pub mod shared;

pub(crate) use shared::blocking;

pub use api::client::ApiClient;
pub use api::client_config::{AuthType, ClientConfig};
pub use api::oauth::grant::GrantStrategy;
pub use api::oauth::token_store::{Token, TokenStore};
pub use api::registry::ClientRegistry;
pub use domain::collector::{CollectOutcome, Collector, CollectorSettings, SkipReason};
pub use domain::freeze::{ExclusionList, FreezeReason, FreezeRequest, RemoteUser};
pub use shared::error::{AppError, AppResult, ErrorCode};

use app::cli::CliArgs;
use app::workflow::WorkflowOutcome;
use clap::Parser;
use std::process::ExitCode;

pub fn run() -> ExitCode {
    let args = CliArgs::parse();
    let _log_guard = app::logging::init(args.log_dir.as_deref());

    // Payload is not logged: it may contain operator input.
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(location = %location, "PANIC: application panicked at {location}");
    }));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("tokio runtime init failed: {}", err);
            eprintln!("INTERNAL_ERROR: tokio runtime init failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(app::workflow::execute(&args)) {
        Ok(outcome) => {
            match outcome {
                WorkflowOutcome::Submitted { users, status } => {
                    tracing::info!(users, status, "freeze submitted");
                }
                WorkflowOutcome::Cancelled { users } => {
                    tracing::info!(users, "freeze cancelled by operator");
                }
                WorkflowOutcome::DryRun { users } => {
                    tracing::info!(users, "dry run finished");
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(code = err.code(), "freeze workflow failed: {}", err.message());
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
