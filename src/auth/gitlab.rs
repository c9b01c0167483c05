//! GitLab token resolution

use super::{AuthSource, token_from_cli, token_from_config_or_env};
use crate::error::{Error, Result};

const ENV_VARS: &[&str] = &["GITLAB_TOKEN", "GL_TOKEN"];

/// Resolved GitLab credentials
#[derive(Debug, Clone)]
pub struct GitLabAuthConfig {
    /// Access token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// Self-hosted instance, if any
    pub host: Option<String>,
}

/// Resolve a GitLab token for `host` (None for gitlab.com)
pub async fn get_gitlab_auth(
    config_token: Option<&str>,
    host: Option<&str>,
) -> Result<GitLabAuthConfig> {
    if let Some((token, source)) =
        token_from_config_or_env(config_token, ENV_VARS, |name| std::env::var(name).ok())
    {
        return Ok(GitLabAuthConfig {
            token,
            source,
            host: host.map(ToString::to_string),
        });
    }

    let mut args = vec!["config", "get", "token"];
    if let Some(h) = host {
        args.extend(["--host", h]);
    }
    let token = token_from_cli("glab", &args).await.ok_or_else(|| {
        Error::Auth(
            "no GitLab token found: set GITLAB_TOKEN, add one to the git-stack config, or run `glab auth login`"
                .to_string(),
        )
    })?;

    Ok(GitLabAuthConfig {
        token,
        source: AuthSource::Cli,
        host: host.map(ToString::to_string),
    })
}
