//! Fixup command - fold staged changes into an earlier branch of the stack

use crate::cli::context::CommandContext;
use crate::cli::print_problems;
use anstream::println;
use dialoguer::FuzzySelect;
use dialoguer::theme::ColorfulTheme;
use git_stack::concurrent::blocking;
use git_stack::error::{Error, Result};
use git_stack::git::GitWriter;
use git_stack::stack::Stack;
use git_stack::types::Branch;
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

/// Options for the fixup command
#[derive(Debug, Clone, Default)]
pub struct FixupOptions {
    /// Branch to fix up; prompts when absent
    pub branch: Option<String>,
    /// Stage every tracked change first, like `git commit -a`
    pub add_all: bool,
    /// Squash the fixup into place afterwards
    pub rebase: bool,
}

/// Run the fixup command
pub async fn run_fixup(path: &Path, remote: Option<&str>, options: FixupOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;
    let default_branch = ctx.default_branch(None).await?;
    let stacks = ctx.load_stacks(&default_branch).await?;
    let theme = ctx.theme;

    let stack = match stacks.get_current() {
        Ok(stack) => stack,
        Err(e) => {
            print_problems(&stacks, &theme);
            return Err(e);
        }
    };

    let branch = match options.branch.as_deref() {
        Some(name) => stack.branch(name)?,
        None => choose_branch(stack)?,
    };

    let repo = Arc::clone(&ctx.repo);
    let tip = branch.tip.clone();
    let add_all = options.add_all;
    let output = blocking(ctx.token(), move || repo.commit_fixup(&tip, add_all)).await?;
    println!("{output}");

    if options.rebase {
        let repo = Arc::clone(&ctx.repo);
        let onto = stack.base().to_string();
        let output = blocking(ctx.token(), move || repo.rebase_autosquash(&onto)).await?;
        if !output.is_empty() {
            println!("{}", output.style(theme.muted));
        }
        println!(
            "{} Squashed fixup into {}",
            theme.check(),
            branch.name.style(theme.accent)
        );
    }
    Ok(())
}

/// Prompt for a branch, top of the stack first
fn choose_branch(stack: &Stack) -> Result<&Branch> {
    let choices: Vec<&Branch> = stack.local_branches().iter().rev().collect();
    let names: Vec<&str> = choices.iter().map(|b| b.name.as_str()).collect();

    let index = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose which branch to fixup")
        .items(&names)
        .default(0)
        .interact()
        .map_err(|e| Error::Internal(format!("failed to read selection: {e}")))?;

    choices
        .get(index)
        .copied()
        .ok_or_else(|| Error::Internal(format!("selection {index} out of range")))
}
