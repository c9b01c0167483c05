//! Init command - store per-repository settings in the config file

use crate::cli::context::CommandContext;
use anstream::println;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use git_stack::config::{config_path, load_config_from, save_config_to};
use git_stack::error::{Error, Result};
use git_stack::types::Platform;
use owo_colors::OwoColorize;
use std::path::Path;

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Default branch override; prompts when absent
    pub default_branch: Option<String>,
    /// Personal access token; prompts when absent
    pub token: Option<String>,
}

/// Run the init command
pub fn run_init(path: &Path, remote: Option<&str>, options: InitOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;
    let theme = &ctx.theme;
    let platform = ctx.platform_config.platform;
    let repo_path = ctx.platform_config.repo_path();

    let file = config_path()?;
    let mut config = load_config_from(&file)?;

    let default_branch = match options.default_branch {
        Some(branch) => branch,
        None => {
            let current = config
                .repository(&repo_path)
                .and_then(|r| r.default_branch.as_deref());
            prompt_default_branch(current)?
        }
    };
    let token = match options.token {
        Some(token) => token,
        None => prompt_token(platform)?,
    };

    let entry = config.repository_mut(&repo_path);
    let default_branch = default_branch.trim();
    entry.default_branch = (!default_branch.is_empty()).then(|| default_branch.to_string());
    if remote.is_some() {
        entry.remote = Some(ctx.remote_name.clone());
    }
    let token = token.trim();
    if !token.is_empty() {
        entry.set_token(platform, token);
    }

    save_config_to(&file, &config)?;
    println!(
        "{} Saved settings for {} to {}",
        theme.check(),
        repo_path.style(theme.accent),
        file.display()
    );
    Ok(())
}

fn prompt_default_branch(current: Option<&str>) -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Default branch (blank to ask the host)")
        .with_initial_text(current.unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .map_err(|e| Error::Internal(format!("failed to read default branch: {e}")))
}

fn prompt_token(platform: Platform) -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{platform} personal access token (blank to keep current)"))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| Error::Internal(format!("failed to read token: {e}")))
}
