//! Push command - push the current stack and sync its pull requests

use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Theme, spinner_style};
use crate::cli::{CliProgress, format_outcome, print_problems};
use anstream::println;
use dialoguer::Confirm;
use git_stack::concurrent::blocking;
use git_stack::error::{Error, Result};
use git_stack::git::GitWriter;
use git_stack::sync::{SyncAction, SyncPlan, execute_sync, plan_sync};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Options for the push command
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// Show what would be done without pushing or touching pull requests
    pub dry_run: bool,
    /// Preview plan and prompt for confirmation before executing
    pub confirm: bool,
    /// Print progress messages as they happen
    pub verbose: bool,
}

/// Run the push command
pub async fn run_push(path: &Path, remote: Option<&str>, options: PushOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;
    let platform = ctx.platform().await?;
    let default_branch = ctx.default_branch(Some(&platform)).await?;
    let stacks = ctx.load_stacks(&default_branch).await?;
    let theme = ctx.theme;

    let stack = match stacks.get_current() {
        Ok(stack) => stack,
        Err(e) => {
            print_problems(&stacks, &theme);
            return Err(e);
        }
    };

    let plan = plan_sync(stack, Arc::clone(&platform), ctx.token()).await?;

    if options.dry_run || options.confirm {
        print_plan(&plan, &ctx.remote_name, &theme);
    }
    if options.dry_run {
        println!("{}", "Dry run complete".style(theme.muted));
        return Ok(());
    }
    if options.confirm
        && !Confirm::new()
            .with_prompt("Proceed with push?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("failed to read confirmation: {e}")))?
    {
        println!("{}", "Aborted".style(theme.muted));
        return Ok(());
    }

    println!(
        "{} {}",
        "Pushing stack:".style(theme.emphasis),
        stack.name().style(theme.primary)
    );

    for name in stack.branch_names() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!(
            "Pushing {} to {}...",
            name.style(theme.accent),
            ctx.remote_name
        ));
        spinner.enable_steady_tick(Duration::from_millis(80));

        let repo = Arc::clone(&ctx.repo);
        let remote_name = ctx.remote_name.clone();
        let branch = name.to_string();
        let pushed = blocking(ctx.token(), move || repo.push_branch(&remote_name, &branch)).await;

        match pushed {
            Ok(()) => spinner.finish_with_message(format!(
                "{} Pushed {}",
                theme.check(),
                name.style(theme.accent)
            )),
            Err(e) => {
                spinner.finish_with_message(format!("{} {name}", theme.cross()));
                return Err(e);
            }
        }
    }

    let progress = if options.verbose {
        CliProgress::verbose(theme)
    } else {
        CliProgress::compact(theme)
    };
    let report = execute_sync(&plan, platform, ctx.token(), &progress).await?;

    println!();
    for outcome in &report.outcomes {
        println!("  {}", format_outcome(outcome, &theme));
        if let Some(err) = &outcome.description_error {
            println!("      {}", err.style(theme.error));
        }
    }

    println!();
    if let Some(err) = &report.error {
        println!("{} {err}", "Sync failed:".style(theme.error));
        print_problems(&stacks, &theme);
        return Err(Error::Platform(format!("failed to sync {}", err.branch)));
    }

    println!(
        "{} {} created, {} retargeted, {} unchanged",
        format!("{CHECK} Push complete:").style(theme.success),
        report.count(&SyncAction::Created).style(theme.accent),
        report.count(&SyncAction::Retargeted).style(theme.accent),
        report.count(&SyncAction::Unchanged).style(theme.accent)
    );
    print_problems(&stacks, &theme);
    Ok(())
}

/// Print the plan for --dry-run and --confirm
fn print_plan(plan: &SyncPlan, remote: &str, theme: &Theme) {
    println!("{}:", "Push plan".style(theme.emphasis));
    println!();
    println!("  {}:", "Push".style(theme.emphasis));
    for step in &plan.steps {
        println!("    {} {} to {remote}", theme.arrow(), step.branch());
    }
    println!();

    if plan.is_noop() {
        println!("  {}", "Pull requests already in place".style(theme.muted));
    } else {
        println!("  {}:", "Pull requests".style(theme.emphasis));
        for step in &plan.steps {
            println!("    {} {step}", theme.arrow());
        }
    }
    println!();
}
