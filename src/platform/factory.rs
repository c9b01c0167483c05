//! Platform service construction

use super::{GitHubService, GitLabService, PlatformService};
use crate::error::Result;
use crate::types::{Platform, PlatformConfig};
use std::sync::Arc;

/// Build the service for `config`, authenticated with `token`
pub fn create_platform_service(
    config: &PlatformConfig,
    token: &str,
) -> Result<Arc<dyn PlatformService>> {
    let service: Arc<dyn PlatformService> = match config.platform {
        Platform::GitHub => Arc::new(GitHubService::new(
            token,
            config.owner.clone(),
            config.repo.clone(),
            config.host.clone(),
        )?),
        Platform::GitLab => Arc::new(GitLabService::new(
            token.to_string(),
            config.owner.clone(),
            config.repo.clone(),
            config.host.clone(),
        )?),
    };
    Ok(service)
}
