//! Show command - branches of the current stack

use crate::cli::context::CommandContext;
use crate::cli::print_problems;
use anstream::println;
use git_stack::error::Result;
use git_stack::git::CommitGraphReader;
use git_stack::sync::{DEFAULT_CONCURRENCY, Lookup, fetch_existing};
use owo_colors::OwoColorize;
use std::path::Path;

/// Options for the show command
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowOptions {
    /// Also show each branch's pull request
    pub prs: bool,
}

/// Run the show command
pub async fn run_show(path: &Path, remote: Option<&str>, options: ShowOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;
    let platform = if options.prs {
        Some(ctx.platform().await?)
    } else {
        None
    };
    let default_branch = ctx.default_branch(platform.as_ref()).await?;
    let stacks = ctx.load_stacks(&default_branch).await?;
    let theme = &ctx.theme;

    let stack = match stacks.get_current() {
        Ok(stack) => stack,
        Err(e) => {
            print_problems(&stacks, theme);
            return Err(e);
        }
    };
    let checked_out = ctx.repo.current_branch()?;

    let lookups = match platform {
        Some(platform) => Some(fetch_existing(stack, platform, ctx.token(), DEFAULT_CONCURRENCY).await?),
        None => None,
    };

    println!(
        "{} {}",
        "Stack:".style(theme.emphasis),
        stack.name().style(theme.primary)
    );

    let mut missing = false;
    for (i, branch) in stack.all_branches().iter().enumerate().rev() {
        let is_top = i + 1 == stack.len();
        let marker = if checked_out.as_deref() == Some(branch.name.as_str()) {
            format!("* {}", branch.name.style(theme.primary))
        } else {
            format!("  {}", branch.name)
        };
        let top = if is_top {
            format!(" {}", "(top)".style(theme.muted))
        } else {
            String::new()
        };
        println!("{marker}{top}");

        if let Some(lookups) = &lookups {
            match &lookups[i] {
                Lookup::Found(pr) => println!("  └── {}", theme.link(&pr.web_url)),
                Lookup::Missing => {
                    missing = true;
                    println!("  └── {}", "No pull request".style(theme.muted));
                }
                Lookup::Failed(reason) => {
                    println!("  └── {}", reason.style(theme.error));
                }
            }
        }
    }

    if missing {
        println!();
        println!(
            "{}",
            "some branches don't have pull requests yet (use \"git stack push\" to open)"
                .style(theme.warn)
        );
    }

    print_problems(&stacks, theme);
    Ok(())
}
