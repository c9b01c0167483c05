//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, single_match, validate_for_create, validate_for_update};
use crate::types::{Platform, PlatformConfig, PullRequest, Repo, markdown_url};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `host` selects a GitHub Enterprise instance (`https://{host}/api/v3`).
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let base_uri = host.as_ref().map(|h| format!("https://{h}/api/v3"));
        Self::build(token, owner, repo, host, base_uri.as_deref())
    }

    /// Create a service talking to an explicit API root
    pub fn with_base_uri(token: &str, owner: String, repo: String, base_uri: &str) -> Result<Self> {
        Self::build(token, owner, repo, None, Some(base_uri))
    }

    fn build(
        token: &str,
        owner: String,
        repo: String,
        host: Option<String>,
        base_uri: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }
        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig {
                platform: Platform::GitHub,
                owner,
                repo,
                host,
            },
        })
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    let web_url = pr
        .html_url
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    PullRequest {
        id: pr.number,
        source_branch: pr.head.ref_field.clone(),
        target_branch: pr.base.ref_field.clone(),
        title: pr.title.clone().unwrap_or_default(),
        description: pr.body.clone().unwrap_or_default(),
        markdown_web_url: markdown_url(&web_url),
        web_url,
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_repo(&self) -> Result<Repo> {
        debug!(repo = %self.config.repo_path(), "getting repository");
        let repository = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .get()
            .await?;

        let default_branch = repository.default_branch.ok_or_else(|| {
            Error::GitHubApi(format!(
                "repository {} reported no default branch",
                self.config.repo_path()
            ))
        })?;
        Ok(Repo { default_branch })
    }

    async fn get_pull_request(&self, source_branch: &str) -> Result<PullRequest> {
        debug!(source_branch, "finding open PR");
        let head = format!("{}:{}", &self.config.owner, source_branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let found = single_match(source_branch, prs.items.iter().map(pr_from_octocrab).collect())?;
        debug!(pr_number = found.id, "found open PR");
        Ok(found)
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<PullRequest> {
        validate_for_create(pr)?;
        debug!(head = %pr.source_branch, base = %pr.target_branch, "creating PR");

        let created = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(&pr.title, &pr.source_branch, &pr.target_branch)
            .body(&pr.description)
            .send()
            .await
            .map_err(|e| {
                Error::GitHubApi(format!(
                    "failed to create pull request for {}: {e}",
                    pr.source_branch
                ))
            })?;

        let result = pr_from_octocrab(&created);
        debug!(pr_number = result.id, "created PR");
        Ok(result)
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<PullRequest> {
        validate_for_update(pr)?;
        debug!(pr_number = pr.id, base = %pr.target_branch, "updating PR");

        let updated = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .update(pr.id)
            .title(&pr.title)
            .body(&pr.description)
            .base(&pr.target_branch)
            .send()
            .await
            .map_err(|e| {
                Error::GitHubApi(format!("failed to update pull request #{}: {e}", pr.id))
            })?;

        debug!(pr_number = pr.id, "updated PR");
        Ok(pr_from_octocrab(&updated))
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
