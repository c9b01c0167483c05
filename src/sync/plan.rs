//! Sync planning - pure decisions from pre-fetched pull request state
//!
//! Lookups happen up front (in parallel, see [`fetch_existing`]); everything
//! else here is plain data so the decisions can be tested without a host.

use crate::concurrent::{CancellationToken, run_all, task};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::stack::Stack;
use crate::types::PullRequest;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of read-only host lookups in flight at once
pub const DEFAULT_CONCURRENCY: usize = 3;

/// What the host knows about one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Exactly one open pull request
    Found(PullRequest),
    /// No open pull request
    Missing,
    /// The lookup itself failed (transport error, several open requests, ...)
    Failed(String),
}

/// A single phase-one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    /// Open a new pull request
    Create {
        /// Source branch
        branch: String,
        /// Branch below it (or the default branch)
        target: String,
        /// Title for the new request
        title: String,
    },
    /// Point an existing pull request at a new target branch
    Retarget {
        /// Source branch
        branch: String,
        /// The request as the host reported it
        pull_request: PullRequest,
        /// New target branch
        target: String,
    },
    /// Existing request already targets the right branch
    Keep {
        /// Source branch
        branch: String,
        /// The request as the host reported it
        pull_request: PullRequest,
    },
    /// Nothing can be done for this branch
    Fail {
        /// Source branch
        branch: String,
        /// Why the lookup failed
        reason: String,
    },
}

impl SyncStep {
    /// Source branch this step acts on
    pub fn branch(&self) -> &str {
        match self {
            Self::Create { branch, .. }
            | Self::Retarget { branch, .. }
            | Self::Keep { branch, .. }
            | Self::Fail { branch, .. } => branch,
        }
    }
}

impl std::fmt::Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create { branch, target, .. } => write!(f, "create {branch} -> {target}"),
            Self::Retarget {
                branch,
                pull_request,
                target,
            } => write!(
                f,
                "retarget {branch}: {} -> {target}",
                pull_request.target_branch
            ),
            Self::Keep { branch, .. } => write!(f, "keep {branch}"),
            Self::Fail { branch, reason } => write!(f, "cannot sync {branch}: {reason}"),
        }
    }
}

/// Ordered phase-one steps for one stack, bottom branch first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Name of the stack (top branch)
    pub stack_name: String,
    /// One step per branch, bottom to top
    pub steps: Vec<SyncStep>,
}

impl SyncPlan {
    /// Number of requests that would be opened
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, SyncStep::Create { .. }))
            .count()
    }

    /// Number of requests that would change target
    #[must_use]
    pub fn retarget_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, SyncStep::Retarget { .. }))
            .count()
    }

    /// True when phase one has no host writes to make
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.steps.iter().all(|s| matches!(s, SyncStep::Keep { .. }))
    }
}

/// Decide phase-one steps (PURE)
///
/// `lookups` must be aligned with `stack.all_branches()`.
#[must_use]
pub fn create_sync_plan(stack: &Stack, lookups: &[Lookup]) -> SyncPlan {
    let steps = stack
        .all_branches()
        .iter()
        .zip(lookups)
        .map(|(branch, lookup)| {
            let target = stack
                .target_of(&branch.name)
                .unwrap_or_else(|| stack.base())
                .to_string();

            match lookup {
                Lookup::Missing => SyncStep::Create {
                    branch: branch.name.clone(),
                    target,
                    title: branch
                        .title_hint
                        .as_deref()
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or(&branch.name)
                        .to_string(),
                },
                Lookup::Found(pr) if pr.target_branch != target => SyncStep::Retarget {
                    branch: branch.name.clone(),
                    pull_request: pr.clone(),
                    target,
                },
                Lookup::Found(pr) => SyncStep::Keep {
                    branch: branch.name.clone(),
                    pull_request: pr.clone(),
                },
                Lookup::Failed(reason) => SyncStep::Fail {
                    branch: branch.name.clone(),
                    reason: reason.clone(),
                },
            }
        })
        .collect();

    SyncPlan {
        stack_name: stack.name().to_string(),
        steps,
    }
}

/// Look up the open request for every branch, bounded by `limit`
///
/// Per-branch failures are folded into [`Lookup::Failed`] so one bad branch
/// does not cancel the others. Only cancellation of `token` is returned as
/// an error.
pub async fn fetch_existing(
    stack: &Stack,
    platform: Arc<dyn PlatformService>,
    token: &CancellationToken,
    limit: usize,
) -> Result<Vec<Lookup>> {
    let tasks = stack
        .all_branches()
        .iter()
        .map(|branch| {
            let name = branch.name.clone();
            let platform = Arc::clone(&platform);
            task(move |token: CancellationToken| async move {
                token.check()?;
                let lookup = match platform.get_pull_request(&name).await {
                    Ok(pr) => Lookup::Found(pr),
                    Err(e) if e.is_not_found() => Lookup::Missing,
                    Err(e) => Lookup::Failed(e.to_string()),
                };
                debug!(branch = %name, ?lookup, "looked up pull request");
                Ok(lookup)
            })
        })
        .collect();

    run_all(token, limit, tasks).await
}
