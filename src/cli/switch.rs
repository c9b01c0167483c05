//! Switch command - check out the top of another stack

use crate::cli::context::CommandContext;
use anstream::println;
use dialoguer::FuzzySelect;
use dialoguer::theme::ColorfulTheme;
use git_stack::concurrent::blocking;
use git_stack::error::{Error, Result};
use git_stack::git::GitWriter;
use git_stack::stack::{Stack, Stacks};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

/// Run the switch command
///
/// With `branch`, switches to the stack containing it; otherwise prompts.
pub async fn run_switch(path: &Path, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;
    let default_branch = ctx.default_branch(None).await?;
    let stacks = ctx.load_stacks(&default_branch).await?;
    let theme = &ctx.theme;

    if stacks.inferred_stacks.is_empty() {
        println!(
            "{}",
            format!("No stacks found on top of {default_branch}").style(theme.muted)
        );
        return Ok(());
    }

    let stack = match branch {
        Some(name) => stacks.find_by_branch(name)?,
        None => choose_stack(&stacks)?,
    };

    let repo = Arc::clone(&ctx.repo);
    let top = stack.name().to_string();
    blocking(ctx.token(), move || repo.checkout_branch(&top)).await?;

    println!(
        "{} Switched to stack {}",
        theme.check(),
        stack.name().style(theme.primary)
    );
    Ok(())
}

fn choose_stack(stacks: &Stacks) -> Result<&Stack> {
    let names: Vec<&str> = stacks.inferred_stacks.iter().map(Stack::name).collect();
    let current = stacks
        .inferred_stacks
        .iter()
        .position(Stack::current)
        .unwrap_or(0);

    let index = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose a stack")
        .items(&names)
        .default(current)
        .interact()
        .map_err(|e| Error::Internal(format!("failed to read selection: {e}")))?;

    stacks
        .inferred_stacks
        .get(index)
        .ok_or_else(|| Error::Internal(format!("selection {index} out of range")))
}
