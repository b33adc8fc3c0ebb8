//! Usage: The linear freeze workflow (register -> prompt -> collect -> review -> confirm -> submit).

use super::cli::CliArgs;
use super::prompts;
use crate::api::registry::ClientRegistry;
use crate::blocking;
use crate::domain::collector::Collector;
use crate::domain::submission::submit_freeze;
use crate::infra::settings::{Settings, FREEZE_SERVICE, LISTING_SERVICE};
use crate::shared::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WorkflowOutcome {
    Submitted { users: usize, status: u16 },
    Cancelled { users: usize },
    DryRun { users: usize },
}

/// Builds and probes every configured client; the first failure aborts startup.
pub(crate) async fn build_registry(settings: &Settings) -> AppResult<ClientRegistry> {
    let mut registry = ClientRegistry::new();
    for config in settings.clients() {
        registry.register(&config.name, config.clone()).await?;
    }
    Ok(registry)
}

pub(crate) async fn execute(args: &CliArgs) -> AppResult<WorkflowOutcome> {
    let settings = Settings::load(&args.config)?;
    let registry = build_registry(&settings).await?;

    let draft = blocking::run("prompt_freeze_request", prompts::ask_freeze_request).await?;

    let listing = registry.get(LISTING_SERVICE)?;
    let collected = Collector::new(listing, &settings.collector)
        .collect(&draft.exclusions())
        .await?;
    let request = draft.with_users(collected.logins);
    let users = request.user_ids.len();

    println!("\nCollected data:");
    println!("{}", request.render_review()?);

    if args.dry_run {
        println!("Dry run: nothing submitted");
        return Ok(WorkflowOutcome::DryRun { users });
    }

    let confirmed =
        blocking::run("confirm_submission", move || prompts::confirm_submission(users)).await?;
    if !confirmed {
        println!("Operation canceled");
        return Ok(WorkflowOutcome::Cancelled { users });
    }

    println!("Validated");
    let freeze = registry.get(FREEZE_SERVICE)?;
    let submitted = submit_freeze(freeze, &request).await?;
    println!("Response: {}", submitted.status);
    Ok(WorkflowOutcome::Submitted {
        users,
        status: submitted.status,
    })
}
