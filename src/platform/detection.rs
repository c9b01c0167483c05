//! Remote URL parsing and platform detection

use crate::types::{Platform, PlatformConfig};
use url::Url;

const GITHUB_COM: &str = "github.com";
const GITLAB_COM: &str = "gitlab.com";

/// Host and `owner/.../repo` path parsed from a remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// Hostname without port or credentials
    pub host: String,
    /// Owner (user, organization, or nested GitLab group path)
    pub owner: String,
    /// Repository name without `.git`
    pub repo: String,
}

/// Parse an ssh, scp-style, or http(s) remote URL
///
/// Returns `None` for local paths and URLs without an owner segment.
pub fn parse_repo_info(remote_url: &str) -> Option<RepoInfo> {
    let remote_url = remote_url.trim();
    let (host, path) = if remote_url.contains("://") {
        let url = Url::parse(remote_url).ok()?;
        (url.host_str()?.to_string(), url.path().to_string())
    } else {
        // scp-like: [user@]host:path
        let (authority, path) = remote_url.split_once(':')?;
        let host = authority.rsplit('@').next()?;
        if host.is_empty() || host.contains('/') {
            return None;
        }
        (host.to_string(), path.to_string())
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.rsplit_once('/')?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some(RepoInfo {
        host: host.to_lowercase(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Detect the platform for a remote URL using `GH_HOST` / `GITLAB_HOST`
pub fn detect_platform(remote_url: &str) -> Option<PlatformConfig> {
    let gh_host = std::env::var("GH_HOST").ok();
    let gitlab_host = std::env::var("GITLAB_HOST").ok();
    detect_platform_with_hosts(remote_url, gh_host.as_deref(), gitlab_host.as_deref())
}

/// Detect the platform given explicit self-hosted host names
pub fn detect_platform_with_hosts(
    remote_url: &str,
    gh_host: Option<&str>,
    gitlab_host: Option<&str>,
) -> Option<PlatformConfig> {
    let info = parse_repo_info(remote_url)?;
    let matches = |configured: Option<&str>| {
        configured.is_some_and(|h| normalize_host(h) == info.host)
    };

    let platform = if info.host == GITHUB_COM || matches(gh_host) {
        Platform::GitHub
    } else if info.host == GITLAB_COM || matches(gitlab_host) || info.host.contains("gitlab") {
        Platform::GitLab
    } else {
        return None;
    };

    let host = match (platform, info.host.as_str()) {
        (Platform::GitHub, GITHUB_COM) | (Platform::GitLab, GITLAB_COM) => None,
        _ => Some(info.host),
    };

    Some(PlatformConfig {
        platform,
        owner: info.owner,
        repo: info.repo,
        host,
    })
}

fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_lowercase()
}
