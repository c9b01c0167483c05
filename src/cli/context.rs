//! Shared command context for CLI commands
//!
//! Opens the repository, loads config, selects the remote and detects the
//! platform. Nothing here talks to the network; the platform service and the
//! default branch are resolved on demand.

use crate::cli::style::Theme;
use git_stack::auth::resolve_token;
use git_stack::cache::{DefaultBranchCache, resolve_default_branch};
use git_stack::concurrent::{CancellationToken, blocking, run2};
use git_stack::config::{Config, RepoConfig, load_config};
use git_stack::error::{Error, Result};
use git_stack::git::{CommitGraphReader, Git2Repository, GitWriter, select_remote};
use git_stack::platform::{PlatformService, create_platform_service, detect_platform};
use git_stack::stack::{Stacks, infer_stacks};
use git_stack::types::PlatformConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Shared context for CLI commands
pub struct CommandContext {
    /// The git repository
    pub repo: Arc<Git2Repository>,
    /// Output theme
    pub theme: Theme,
    /// Selected remote name
    pub remote_name: String,
    /// Detected platform and repository
    pub platform_config: PlatformConfig,
    /// Per-repository settings, if configured
    pub repo_config: Option<RepoConfig>,
    cache: DefaultBranchCache,
    token: CancellationToken,
}

impl CommandContext {
    /// Open the repository at `path` and resolve local settings
    pub fn new(path: &Path, remote: Option<&str>) -> Result<Self> {
        let repo = Git2Repository::open(path)?;
        let config: Config = load_config()?;

        let remotes = repo.remotes()?;
        let mut remote_name = select_remote(&remotes, remote)?;
        let mut platform_config = detect_for(&remotes, &remote_name)?;

        let repo_config = config.repository(&platform_config.repo_path()).cloned();

        // A configured remote applies unless one was given on the command line
        if remote.is_none()
            && let Some(configured) = repo_config.as_ref().and_then(|c| c.remote.as_deref())
            && configured != remote_name
        {
            remote_name = select_remote(&remotes, Some(configured))?;
            platform_config = detect_for(&remotes, &remote_name)?;
        }

        debug!(remote = %remote_name, platform = %platform_config.platform, repo = %platform_config.repo_path(), "command context ready");

        Ok(Self {
            cache: DefaultBranchCache::for_repository(repo.workdir())?,
            repo: Arc::new(repo),
            theme: Theme::from_name(config.theme),
            remote_name,
            platform_config,
            repo_config,
            token: CancellationToken::new(),
        })
    }

    /// Cancellation token shared by this command's task groups
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Authenticate and build the platform service
    pub async fn platform(&self) -> Result<Arc<dyn PlatformService>> {
        let (token, source) = resolve_token(&self.platform_config, self.repo_config.as_ref()).await?;
        debug!(%source, "resolved access token");
        create_platform_service(&self.platform_config, &token)
    }

    /// Default branch from config or cache, falling back to the host
    ///
    /// Without a `platform` one is only built if the host must be asked.
    pub async fn default_branch(
        &self,
        platform: Option<&Arc<dyn PlatformService>>,
    ) -> Result<String> {
        resolve_default_branch(self.repo_config.as_ref(), &self.cache, || async {
            match platform {
                Some(platform) => Ok(Arc::clone(platform)),
                None => self.platform().await,
            }
        })
        .await
    }

    /// Read HEAD and the commit graph concurrently, then infer stacks
    pub async fn load_stacks(&self, default_branch: &str) -> Result<Stacks> {
        let head_repo = Arc::clone(&self.repo);
        let graph_repo = Arc::clone(&self.repo);
        let root = default_branch.to_string();
        let fallback = format!("{}/{default_branch}", self.remote_name);

        let (head, (root, graph)) = run2(
            &self.token,
            move |token| async move { blocking(&token, move || head_repo.read_head()).await },
            move |token| async move {
                blocking(&token, move || match graph_repo.read_graph(&root) {
                    Ok(graph) => Ok((root, graph)),
                    // No local copy of the default branch: use the remote's
                    Err(Error::GraphRead(_)) => {
                        let graph = graph_repo.read_graph(&fallback)?;
                        Ok((fallback, graph))
                    }
                    Err(e) => Err(e),
                })
                .await
            },
        )
        .await?;

        let mut stacks = infer_stacks(&root, &graph);
        stacks.mark_current(&head);
        debug!(
            stacks = stacks.inferred_stacks.len(),
            errors = stacks.errors.len(),
            "inferred stacks"
        );
        Ok(stacks)
    }
}

fn detect_for(remotes: &[git_stack::types::GitRemote], name: &str) -> Result<PlatformConfig> {
    let remote = remotes
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| Error::RemoteNotFound(name.to_string()))?;
    detect_platform(&remote.url).ok_or(Error::NoSupportedRemotes)
}
