//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, single_match, validate_for_create, validate_for_update};
use crate::types::{Platform, PlatformConfig, PullRequest, Repo, markdown_url};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    api_base: String,
    config: PlatformConfig,
    project_path: String,
}

#[derive(Deserialize)]
struct Project {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<MergeRequest> for PullRequest {
    fn from(mr: MergeRequest) -> Self {
        Self {
            id: mr.iid,
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
            title: mr.title,
            description: mr.description.unwrap_or_default(),
            markdown_web_url: markdown_url(&mr.web_url),
            web_url: mr.web_url,
        }
    }
}

#[derive(Serialize)]
struct CreateMrPayload<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct UpdateMrPayload<'a> {
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl GitLabService {
    /// Create a new GitLab service
    pub fn new(token: String, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let host = host.unwrap_or_else(|| "gitlab.com".to_string());
        let project_path = format!("{owner}/{repo}");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        let config_host = if host == "gitlab.com" {
            None
        } else {
            Some(host.clone())
        };

        Ok(Self {
            client,
            token,
            api_base: format!("https://{host}/api/v4"),
            config: PlatformConfig {
                platform: Platform::GitLab,
                owner,
                repo,
                host: config_host,
            },
            project_path,
        })
    }

    /// Point the service at a different API root (e.g. `http://127.0.0.1:1234/api/v4`)
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn encoded_project(&self) -> String {
        urlencoding::encode(&self.project_path).into_owned()
    }

    fn merge_requests_url(&self) -> String {
        self.api_url(&format!(
            "/projects/{}/merge_requests",
            self.encoded_project()
        ))
    }
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn get_repo(&self) -> Result<Repo> {
        debug!(project = %self.project_path, "getting project");
        let url = self.api_url(&format!("/projects/{}", self.encoded_project()));

        let project: Project = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let default_branch = project.default_branch.ok_or_else(|| {
            Error::GitLabApi(format!(
                "project {} reported no default branch",
                self.project_path
            ))
        })?;
        Ok(Repo { default_branch })
    }

    async fn get_pull_request(&self, source_branch: &str) -> Result<PullRequest> {
        debug!(source_branch, "finding open MR");

        let mrs: Vec<MergeRequest> = self
            .client
            .get(self.merge_requests_url())
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("source_branch", source_branch), ("state", "opened")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let found = single_match(source_branch, mrs.into_iter().map(Into::into).collect())?;
        debug!(mr_iid = found.id, "found open MR");
        Ok(found)
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<PullRequest> {
        validate_for_create(pr)?;
        debug!(head = %pr.source_branch, base = %pr.target_branch, "creating MR");

        let payload = CreateMrPayload {
            source_branch: &pr.source_branch,
            target_branch: &pr.target_branch,
            title: &pr.title,
            description: &pr.description,
        };

        let mr: MergeRequest = self
            .client
            .post(self.merge_requests_url())
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                Error::GitLabApi(format!(
                    "failed to create merge request for {}: {e}",
                    pr.source_branch
                ))
            })?
            .json()
            .await?;

        let created: PullRequest = mr.into();
        debug!(mr_iid = created.id, "created MR");
        Ok(created)
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<PullRequest> {
        validate_for_update(pr)?;
        debug!(mr_iid = pr.id, base = %pr.target_branch, "updating MR");
        let url = format!("{}/{}", self.merge_requests_url(), pr.id);

        let payload = UpdateMrPayload {
            target_branch: &pr.target_branch,
            title: &pr.title,
            description: &pr.description,
        };

        let mr: MergeRequest = self
            .client
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(format!("failed to update merge request !{}: {e}", pr.id)))?
            .json()
            .await?;

        debug!(mr_iid = pr.id, "updated MR");
        Ok(mr.into())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
