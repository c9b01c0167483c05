//! User configuration
//!
//! Lives in `config.toml` under the platform config directory
//! (`$XDG_CONFIG_HOME/git-stack/` on Linux). Everything is optional; a
//! missing file means defaults everywhere.

mod storage;

pub(crate) use storage::APP_DIR;
pub use storage::{config_path, load_config, load_config_from, save_config_to};

use crate::types::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color scheme for terminal output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Colored output
    #[default]
    Default,
    /// No colors, emphasis only
    Mono,
}

/// A stored access token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Personal access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_access_token: Option<String>,
}

/// Per-repository settings, keyed by `owner/repo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Overrides the host's default branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Remote to push to and detect the platform from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// GitHub credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<TokenConfig>,
    /// GitLab credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<TokenConfig>,
}

impl RepoConfig {
    /// Stored token for `platform`, ignoring blank values
    pub fn token(&self, platform: Platform) -> Option<&str> {
        let entry = match platform {
            Platform::GitHub => self.github.as_ref(),
            Platform::GitLab => self.gitlab.as_ref(),
        };
        entry
            .and_then(|t| t.personal_access_token.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Store a token for `platform`, replacing any previous one
    pub fn set_token(&mut self, platform: Platform, token: &str) {
        let entry = Some(TokenConfig {
            personal_access_token: Some(token.to_string()),
        });
        match platform {
            Platform::GitHub => self.github = entry,
            Platform::GitLab => self.gitlab = entry,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output theme
    pub theme: ThemeName,
    /// Per-repository settings
    pub repositories: BTreeMap<String, RepoConfig>,
}

impl Config {
    /// Settings for `owner/repo`, if any
    pub fn repository(&self, repo_path: &str) -> Option<&RepoConfig> {
        self.repositories.get(repo_path)
    }

    /// Settings for `owner/repo`, created empty if missing
    pub fn repository_mut(&mut self, repo_path: &str) -> &mut RepoConfig {
        self.repositories.entry(repo_path.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config: Config = toml::from_str(
            r#"
            theme = "mono"

            [repositories."acme/widgets"]
            default_branch = "trunk"
            remote = "upstream"

            [repositories."acme/widgets".github]
            personal_access_token = "ghp_abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.theme, ThemeName::Mono);
        let repo = config.repository("acme/widgets").unwrap();
        assert_eq!(repo.default_branch.as_deref(), Some("trunk"));
        assert_eq!(repo.remote.as_deref(), Some("upstream"));
        assert_eq!(repo.token(Platform::GitHub), Some("ghp_abc"));
        assert_eq!(repo.token(Platform::GitLab), None);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.theme, ThemeName::Default);
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let repo = RepoConfig {
            gitlab: Some(TokenConfig {
                personal_access_token: Some("  ".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(repo.token(Platform::GitLab), None);
    }

    #[test]
    fn test_repository_mut_creates_and_keeps_entries() {
        let mut config = Config::default();
        config.repository_mut("acme/widgets").remote = Some("upstream".to_string());
        config
            .repository_mut("acme/widgets")
            .set_token(Platform::GitLab, "glpat");

        let repo = config.repository("acme/widgets").unwrap();
        assert_eq!(repo.remote.as_deref(), Some("upstream"));
        assert_eq!(repo.token(Platform::GitLab), Some("glpat"));
        assert_eq!(repo.token(Platform::GitHub), None);
        assert_eq!(config.repositories.len(), 1);
    }

    #[test]
    fn test_set_token_replaces_previous() {
        let mut repo = RepoConfig::default();
        repo.set_token(Platform::GitHub, "old");
        repo.set_token(Platform::GitHub, "new");
        assert_eq!(repo.token(Platform::GitHub), Some("new"));
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        assert!(toml::from_str::<Config>("theme = \"neon\"").is_err());
    }
}
