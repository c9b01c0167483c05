//! Platform services for GitHub and GitLab
//!
//! Provides a unified interface for the handful of pull request operations
//! the synchronizer needs.

mod detection;
mod factory;
mod github;
mod gitlab;

pub use detection::{RepoInfo, detect_platform, detect_platform_with_hosts, parse_repo_info};
pub use factory::create_platform_service;
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::{Error, Result};
use crate::types::{PlatformConfig, PullRequest, Repo};
use async_trait::async_trait;

/// Platform service trait for PR/MR operations
///
/// Each service is bound to one repository (see [`PlatformService::config`]),
/// so calls only name branches and requests.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Repository metadata, chiefly the default branch
    async fn get_repo(&self) -> Result<Repo>;

    /// The single open request whose source is `source_branch`
    ///
    /// Fails with [`Error::PullRequestNotFound`] when there is none and
    /// [`Error::MultiplePullRequests`] when there are several.
    async fn get_pull_request(&self, source_branch: &str) -> Result<PullRequest>;

    /// Open a request from `pr`'s source, target, title and description
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<PullRequest>;

    /// Overwrite title, description and target of request `pr.id`
    async fn update_pull_request(&self, pr: &PullRequest) -> Result<PullRequest>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}

/// Reject payloads the hosts would refuse anyway
pub(crate) fn validate_for_create(pr: &PullRequest) -> Result<()> {
    if pr.title.trim().is_empty() {
        return Err(Error::InvalidPullRequest(
            "pull request title cannot be empty".to_string(),
        ));
    }
    if pr.source_branch.is_empty() || pr.target_branch.is_empty() {
        return Err(Error::InvalidPullRequest(
            "source and target branch must be set".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_for_update(pr: &PullRequest) -> Result<()> {
    if pr.id == 0 {
        return Err(Error::InvalidPullRequest(
            "pull request ID must be set".to_string(),
        ));
    }
    if pr.title.trim().is_empty() {
        return Err(Error::InvalidPullRequest(
            "pull request title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Turn a list of open requests for one branch into the single match
pub(crate) fn single_match(source_branch: &str, mut prs: Vec<PullRequest>) -> Result<PullRequest> {
    match prs.len() {
        0 => Err(Error::PullRequestNotFound {
            branch: source_branch.to_string(),
        }),
        1 => Ok(prs.remove(0)),
        _ => Err(Error::MultiplePullRequests {
            branch: source_branch.to_string(),
            urls: prs.into_iter().map(|pr| pr.web_url).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(id: u64, title: &str) -> PullRequest {
        PullRequest {
            id,
            source_branch: "feat".to_string(),
            target_branch: "main".to_string(),
            title: title.to_string(),
            web_url: format!("https://example.com/{id}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_requires_title() {
        assert!(validate_for_create(&pr(0, "Add feature")).is_ok());
        assert!(matches!(
            validate_for_create(&pr(0, "  ")),
            Err(Error::InvalidPullRequest(_))
        ));
    }

    #[test]
    fn test_update_requires_id_and_title() {
        assert!(validate_for_update(&pr(3, "t")).is_ok());
        assert!(validate_for_update(&pr(0, "t")).is_err());
        assert!(validate_for_update(&pr(3, "")).is_err());
    }

    #[test]
    fn test_single_match() {
        assert!(single_match("feat", vec![]).unwrap_err().is_not_found());
        assert_eq!(single_match("feat", vec![pr(1, "t")]).unwrap().id, 1);

        let err = single_match("feat", vec![pr(1, "t"), pr(2, "t")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "found multiple pull requests for source branch: feat, urls: https://example.com/1, https://example.com/2"
        );
    }
}
