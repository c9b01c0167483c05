//! GitHub token resolution

use super::{AuthSource, token_from_cli, token_from_config_or_env};
use crate::error::{Error, Result};

const ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Access token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// Enterprise host, if any
    pub host: Option<String>,
}

/// Resolve a GitHub token for `host` (None for github.com)
pub async fn get_github_auth(
    config_token: Option<&str>,
    host: Option<&str>,
) -> Result<GitHubAuthConfig> {
    if let Some((token, source)) =
        token_from_config_or_env(config_token, ENV_VARS, |name| std::env::var(name).ok())
    {
        return Ok(GitHubAuthConfig {
            token,
            source,
            host: host.map(ToString::to_string),
        });
    }

    let mut args = vec!["auth", "token"];
    if let Some(h) = host {
        args.extend(["--hostname", h]);
    }
    let token = token_from_cli("gh", &args).await.ok_or_else(|| {
        Error::Auth(
            "no GitHub token found: set GITHUB_TOKEN, add one to the git-stack config, or run `gh auth login`"
                .to_string(),
        )
    })?;

    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
        host: host.map(ToString::to_string),
    })
}
