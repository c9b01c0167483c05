//! Default-branch cache
//!
//! Looking up the default branch costs a host round trip on every command,
//! yet it almost never changes. Entries live in
//! `<cache dir>/git-stack/<repo dir>/default-branch.toml` and expire after
//! [`DEFAULT_TTL_DAYS`].

use crate::config::RepoConfig;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Entries older than this are ignored
pub const DEFAULT_TTL_DAYS: i64 = 14;

const CACHE_FILE: &str = "default-branch.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CacheEntry {
    default_branch: String,
    fetched_at: DateTime<Utc>,
}

/// File-backed cache for one repository
#[derive(Debug, Clone)]
pub struct DefaultBranchCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DefaultBranchCache {
    /// Cache rooted at `dir` with the given time-to-live
    pub const fn new(dir: PathBuf, ttl: Duration) -> Self {
        Self { dir, ttl }
    }

    /// Standard location for the repository at `workdir`
    pub fn for_repository(workdir: &Path) -> Result<Self> {
        let base = dirs::cache_dir()
            .ok_or_else(|| Error::Cache("cannot determine cache directory".to_string()))?;
        let name = workdir
            .file_name()
            .map_or_else(|| "repo".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(
            base.join(crate::config::APP_DIR).join(name),
            Duration::days(DEFAULT_TTL_DAYS),
        ))
    }

    fn path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE)
    }

    /// Cached branch if present and younger than the TTL at `now`
    pub fn get(&self, now: DateTime<Utc>) -> Result<Option<String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Cache(format!("failed to read {}: {e}", path.display())))?;
        let entry: CacheEntry = toml::from_str(&content)
            .map_err(|e| Error::Cache(format!("failed to parse {}: {e}", path.display())))?;

        if now.signed_duration_since(entry.fetched_at) > self.ttl {
            debug!(fetched_at = %entry.fetched_at, "default branch cache expired");
            return Ok(None);
        }
        Ok(Some(entry.default_branch))
    }

    /// Store `branch` as fetched at `now`
    pub fn put(&self, branch: &str, now: DateTime<Utc>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Cache(format!("failed to create {}: {e}", self.dir.display())))?;
        let entry = CacheEntry {
            default_branch: branch.to_string(),
            fetched_at: now,
        };
        let content = toml::to_string(&entry)
            .map_err(|e| Error::Cache(format!("failed to serialize cache entry: {e}")))?;
        let path = self.path();
        fs::write(&path, content)
            .map_err(|e| Error::Cache(format!("failed to write {}: {e}", path.display())))
    }
}

/// Default branch known without asking the host: config override, then a
/// fresh cache entry
///
/// Cache problems are logged and treated as a miss.
pub fn known_default_branch(
    repo_config: Option<&RepoConfig>,
    cache: &DefaultBranchCache,
    now: DateTime<Utc>,
) -> Option<String> {
    if let Some(branch) = repo_config.and_then(|c| c.default_branch.as_deref()) {
        debug!(branch, "default branch from config");
        return Some(branch.to_string());
    }

    match cache.get(now) {
        Ok(Some(branch)) => {
            debug!(branch = %branch, "default branch from cache");
            Some(branch)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable default branch cache");
            None
        }
    }
}

/// Ask the host for the default branch and remember it
///
/// A failed cache write is logged and otherwise ignored.
pub async fn fetch_default_branch(
    cache: &DefaultBranchCache,
    platform: &dyn PlatformService,
) -> Result<String> {
    let repo = platform.get_repo().await?;
    if let Err(e) = cache.put(&repo.default_branch, Utc::now()) {
        warn!(error = %e, "failed to cache default branch");
    }
    debug!(branch = %repo.default_branch, "default branch from host");
    Ok(repo.default_branch)
}

/// Resolve the default branch: config override, then cache, then host
///
/// `connect` is only called on a miss, so commands that never need the host
/// otherwise do not authenticate just to learn the default branch.
pub async fn resolve_default_branch<F, Fut>(
    repo_config: Option<&RepoConfig>,
    cache: &DefaultBranchCache,
    connect: F,
) -> Result<String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<dyn PlatformService>>>,
{
    if let Some(branch) = known_default_branch(repo_config, cache, Utc::now()) {
        return Ok(branch);
    }
    let platform = connect().await?;
    fetch_default_branch(cache, platform.as_ref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache(temp: &TempDir) -> DefaultBranchCache {
        DefaultBranchCache::new(temp.path().join("repo"), Duration::days(DEFAULT_TTL_DAYS))
    }

    #[test]
    fn test_empty_cache_misses() {
        let temp = TempDir::new().unwrap();
        assert_eq!(cache(&temp).get(Utc::now()).unwrap(), None);
    }

    #[test]
    fn test_fresh_entry_hits() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);
        let now = Utc::now();
        cache.put("main", now).unwrap();

        assert_eq!(
            cache.get(now + Duration::days(13)).unwrap().as_deref(),
            Some("main")
        );
    }

    #[test]
    fn test_stale_entry_misses() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);
        let now = Utc::now();
        cache.put("main", now).unwrap();

        assert_eq!(cache.get(now + Duration::days(15)).unwrap(), None);
    }

    #[test]
    fn test_config_override_beats_cache() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);
        let now = Utc::now();
        cache.put("main", now).unwrap();

        let repo = RepoConfig {
            default_branch: Some("trunk".to_string()),
            ..Default::default()
        };
        assert_eq!(
            known_default_branch(Some(&repo), &cache, now).as_deref(),
            Some("trunk")
        );
        assert_eq!(known_default_branch(None, &cache, now).as_deref(), Some("main"));
    }

    #[test]
    fn test_corrupt_entry_is_error() {
        let temp = TempDir::new().unwrap();
        let cache = cache(&temp);
        fs::create_dir_all(temp.path().join("repo")).unwrap();
        fs::write(temp.path().join("repo").join(CACHE_FILE), "nonsense = [").unwrap();

        assert!(matches!(cache.get(Utc::now()), Err(Error::Cache(_))));
        assert_eq!(known_default_branch(None, &cache, Utc::now()), None);
    }
}
