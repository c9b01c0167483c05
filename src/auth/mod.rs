//! Authentication for GitHub and GitLab
//!
//! Tokens come from the repository config, then environment variables, then
//! the platform CLI (`gh`, `glab`).

mod github;
mod gitlab;

pub use github::{GitHubAuthConfig, get_github_auth};
pub use gitlab::{GitLabAuthConfig, get_gitlab_auth};

use crate::config::RepoConfig;
use crate::error::Result;
use crate::types::{Platform, PlatformConfig};
use tokio::process::Command;
use tracing::debug;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the git-stack config file
    Config,
    /// Token from environment variable
    EnvVar,
    /// Token from CLI tool (gh or glab)
    Cli,
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "config file"),
            Self::EnvVar => write!(f, "environment"),
            Self::Cli => write!(f, "CLI"),
        }
    }
}

/// Resolve a token for whichever platform `config` points at
pub async fn resolve_token(
    config: &PlatformConfig,
    repo_config: Option<&RepoConfig>,
) -> Result<(String, AuthSource)> {
    let config_token = repo_config.and_then(|c| c.token(config.platform));
    let host = config.host.as_deref();
    match config.platform {
        Platform::GitHub => {
            let auth = get_github_auth(config_token, host).await?;
            Ok((auth.token, auth.source))
        }
        Platform::GitLab => {
            let auth = get_gitlab_auth(config_token, host).await?;
            Ok((auth.token, auth.source))
        }
    }
}

/// First non-blank token among config and the named env vars
pub(crate) fn token_from_config_or_env<F>(
    config_token: Option<&str>,
    env_vars: &[&str],
    env: F,
) -> Option<(String, AuthSource)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = config_token.map(str::trim).filter(|t| !t.is_empty()) {
        return Some((token.to_string(), AuthSource::Config));
    }
    env_vars.iter().find_map(|name| {
        env(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| {
                debug!(var = name, "using token from environment");
                (v, AuthSource::EnvVar)
            })
    })
}

/// Run a CLI and return its trimmed stdout on success
pub(crate) async fn token_from_cli(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().await.ok()?;
    if !output.status.success() {
        debug!(program, "CLI did not provide a token");
        return None;
    }
    let token = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_config_token_wins() {
        let found = token_from_config_or_env(
            Some("from-config"),
            &["GITHUB_TOKEN"],
            env_with(&[("GITHUB_TOKEN", "from-env")]),
        );
        assert_eq!(found, Some(("from-config".to_string(), AuthSource::Config)));
    }

    #[test]
    fn test_env_vars_in_order() {
        let found = token_from_config_or_env(
            None,
            &["GITHUB_TOKEN", "GH_TOKEN"],
            env_with(&[("GH_TOKEN", "second"), ("GITHUB_TOKEN", "first")]),
        );
        assert_eq!(found, Some(("first".to_string(), AuthSource::EnvVar)));
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let found = token_from_config_or_env(
            Some(" "),
            &["GITHUB_TOKEN", "GH_TOKEN"],
            env_with(&[("GITHUB_TOKEN", ""), ("GH_TOKEN", "tok")]),
        );
        assert_eq!(found, Some(("tok".to_string(), AuthSource::EnvVar)));
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(token_from_config_or_env(None, &["X"], env_with(&[])), None);
    }

    #[tokio::test]
    async fn test_missing_cli_yields_none() {
        assert_eq!(
            token_from_cli("git-stack-no-such-binary", &["auth", "token"]).await,
            None
        );
    }
}
