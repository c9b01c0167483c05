//! List command - every inferred stack

use crate::cli::context::CommandContext;
use crate::cli::print_problems;
use anstream::println;
use git_stack::error::Result;
use owo_colors::OwoColorize;
use std::path::Path;

/// Run the list command
pub async fn run_list(path: &Path, remote: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;
    let default_branch = ctx.default_branch(None).await?;
    let stacks = ctx.load_stacks(&default_branch).await?;
    let theme = &ctx.theme;

    if stacks.inferred_stacks.is_empty() {
        println!(
            "{}",
            format!("No stacks found on top of {default_branch}").style(theme.muted)
        );
    }

    for stack in &stacks.inferred_stacks {
        let name = if stack.current() {
            format!("* {}", stack.name().style(theme.primary))
        } else {
            format!("  {}", stack.name())
        };
        let suffix = match stack.len() {
            1 => "(1 branch)".to_string(),
            n => format!("({n} branches)"),
        };
        println!("{name} {}", suffix.style(theme.muted));
    }

    print_problems(&stacks, theme);
    Ok(())
}
