//! Command implementations for the `git-stack` binary

pub mod context;
pub mod fixup;
pub mod init;
pub mod list;
pub mod push;
pub mod show;
pub mod style;
pub mod switch;

use anstream::println;
use async_trait::async_trait;
use git_stack::stack::Stacks;
use git_stack::sync::{BranchOutcome, ProgressCallback, SyncAction};
use owo_colors::OwoColorize;
use style::Theme;

/// Print structural problems found during inference, if any
pub fn print_problems(stacks: &Stacks, theme: &Theme) {
    if !stacks.has_errors() {
        return;
    }
    println!();
    println!("{}", "Problems detected:".style(theme.warn));
    for err in &stacks.errors {
        println!("  {err}");
    }
}

/// One-line rendering of a branch's sync outcome
pub fn format_outcome(outcome: &BranchOutcome, theme: &Theme) -> String {
    let mark = match outcome.action {
        SyncAction::Failed(_) => theme.cross(),
        SyncAction::Skipped => "-".style(theme.muted).to_string(),
        _ => theme.check(),
    };
    let url = outcome
        .pull_request
        .as_ref()
        .map(|pr| format!(" {}", theme.link(&pr.web_url)))
        .unwrap_or_default();
    let description = if outcome.description_updated {
        " (description updated)".style(theme.muted).to_string()
    } else {
        String::new()
    };
    format!(
        "{mark} {} {}{url}{description}",
        outcome.branch.style(theme.accent),
        outcome.action
    )
}

/// Progress reporter that prints to the terminal
pub struct CliProgress {
    theme: Theme,
    verbose: bool,
}

impl CliProgress {
    /// Silent; the command prints the final report
    pub const fn compact(theme: Theme) -> Self {
        Self {
            theme,
            verbose: false,
        }
    }

    /// Status messages and phase-one results as they happen
    pub const fn verbose(theme: Theme) -> Self {
        Self {
            theme,
            verbose: true,
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        if self.verbose {
            println!("{}", message.style(self.theme.muted));
        }
    }

    async fn on_outcome(&self, outcome: &BranchOutcome) {
        if self.verbose {
            println!("{}", format!("  {}: {}", outcome.branch, outcome.action).style(self.theme.muted));
        }
    }
}
