//! Sync execution - effectful operations
//!
//! Phase one walks the plan bottom to top, creating and retargeting pull
//! requests one at a time. Any failure there skips every branch above it and
//! phase two is not attempted. Phase two then rewrites each request's
//! navigation block, again one request at a time; its failures are recorded
//! per branch.

use super::description::{format_description, stack_heading};
use super::plan::{SyncPlan, SyncStep};
use super::progress::ProgressCallback;
use crate::concurrent::CancellationToken;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::PullRequest;
use std::sync::Arc;
use tracing::{debug, warn};

/// What phase one did for a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// A new request was opened
    Created,
    /// An existing request now targets the branch below
    Retargeted,
    /// Existing request already correct
    Unchanged,
    /// This branch failed; carries the reason
    Failed(String),
    /// Not attempted because a branch below failed
    Skipped,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Retargeted => write!(f, "retargeted"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Per-branch result of a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOutcome {
    /// Source branch
    pub branch: String,
    /// Phase-one result
    pub action: SyncAction,
    /// Latest known state of the request, if one exists
    pub pull_request: Option<PullRequest>,
    /// Phase two rewrote the description
    pub description_updated: bool,
    /// Phase two failed for this branch
    pub description_error: Option<String>,
}

impl BranchOutcome {
    fn new(branch: &str, action: SyncAction, pull_request: Option<PullRequest>) -> Self {
        Self {
            branch: branch.to_string(),
            action,
            pull_request,
            description_updated: false,
            description_error: None,
        }
    }
}

/// First error that stopped or degraded a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError {
    /// Branch the error belongs to
    pub branch: String,
    /// Rendered error
    pub message: String,
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.branch, self.message)
    }
}

/// Outcome of syncing one stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One entry per branch, bottom to top
    pub outcomes: Vec<BranchOutcome>,
    /// First error encountered, if any
    pub error: Option<SyncError>,
}

impl SyncReport {
    /// No branch failed in either phase
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Outcome for a branch
    pub fn outcome(&self, branch: &str) -> Option<&BranchOutcome> {
        self.outcomes.iter().find(|o| o.branch == branch)
    }

    /// Number of branches with this phase-one action
    #[must_use]
    pub fn count(&self, action: &SyncAction) -> usize {
        self.outcomes.iter().filter(|o| &o.action == action).count()
    }

    fn record_error(&mut self, branch: &str, message: &str) {
        if self.error.is_none() {
            self.error = Some(SyncError {
                branch: branch.to_string(),
                message: message.to_string(),
            });
        }
    }
}

/// Execute a sync plan (EFFECTFUL)
pub async fn execute_sync(
    plan: &SyncPlan,
    platform: Arc<dyn PlatformService>,
    token: &CancellationToken,
    progress: &dyn ProgressCallback,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    let mut halted = false;

    for step in &plan.steps {
        let branch = step.branch();
        if halted {
            report
                .outcomes
                .push(BranchOutcome::new(branch, SyncAction::Skipped, None));
            continue;
        }

        let outcome = match token.check() {
            Err(e) => BranchOutcome::new(branch, SyncAction::Failed(e.to_string()), None),
            Ok(()) => apply_step(step, platform.as_ref(), progress).await,
        };

        if let SyncAction::Failed(reason) = &outcome.action {
            warn!(branch, reason = %reason, "sync stopped");
            report.record_error(branch, reason);
            halted = true;
        }
        progress.on_outcome(&outcome).await;
        report.outcomes.push(outcome);
    }

    if halted {
        return Ok(report);
    }

    update_descriptions(&mut report, platform.as_ref(), token, progress).await?;
    Ok(report)
}

async fn apply_step(
    step: &SyncStep,
    platform: &dyn PlatformService,
    progress: &dyn ProgressCallback,
) -> BranchOutcome {
    match step {
        SyncStep::Create {
            branch,
            target,
            title,
        } => {
            progress
                .on_message(&format!("Opening pull request for {branch} onto {target}"))
                .await;
            let draft = PullRequest::draft(branch, target, title);
            match platform.create_pull_request(&draft).await {
                Ok(pr) => BranchOutcome::new(branch, SyncAction::Created, Some(pr)),
                Err(e) => BranchOutcome::new(branch, SyncAction::Failed(e.to_string()), None),
            }
        }
        SyncStep::Retarget {
            branch,
            pull_request,
            target,
        } => {
            progress
                .on_message(&format!(
                    "Retargeting {branch}: {} -> {target}",
                    pull_request.target_branch
                ))
                .await;
            let mut changed = pull_request.clone();
            changed.target_branch.clone_from(target);
            match platform.update_pull_request(&changed).await {
                Ok(pr) => BranchOutcome::new(branch, SyncAction::Retargeted, Some(pr)),
                Err(e) => BranchOutcome::new(
                    branch,
                    SyncAction::Failed(e.to_string()),
                    Some(pull_request.clone()),
                ),
            }
        }
        SyncStep::Keep {
            branch,
            pull_request,
        } => BranchOutcome::new(branch, SyncAction::Unchanged, Some(pull_request.clone())),
        SyncStep::Fail { branch, reason } => {
            BranchOutcome::new(branch, SyncAction::Failed(reason.clone()), None)
        }
    }
}

/// Phase two: splice the navigation block into every description
///
/// Writes go out one at a time, bottom to top. A failed update is recorded
/// on its branch and the remaining branches are still attempted.
async fn update_descriptions(
    report: &mut SyncReport,
    platform: &dyn PlatformService,
    token: &CancellationToken,
    progress: &dyn ProgressCallback,
) -> Result<()> {
    // Display order: top of the stack first
    let listed: Vec<PullRequest> = report
        .outcomes
        .iter()
        .rev()
        .filter_map(|o| o.pull_request.clone())
        .collect();
    if listed.is_empty() {
        return Ok(());
    }

    let heading = stack_heading(platform.config().platform);
    progress
        .on_message(&format!("Updating {} descriptions", listed.len()))
        .await;

    for current in listed.iter().rev() {
        let description = format_description(current, &listed, heading);
        if description == current.description {
            continue;
        }
        token.check()?;

        let mut changed = current.clone();
        changed.description = description;
        let result = platform.update_pull_request(&changed).await;

        let branch = current.source_branch.as_str();
        let Some(outcome) = report.outcomes.iter_mut().find(|o| o.branch == branch) else {
            continue;
        };
        match result {
            Ok(pr) => {
                debug!(branch, "description updated");
                outcome.pull_request = Some(pr);
                outcome.description_updated = true;
            }
            Err(e) => {
                let message = e.to_string();
                warn!(branch, error = %message, "description update failed");
                outcome.description_error = Some(message.clone());
                report.record_error(branch, &message);
            }
        }
    }

    Ok(())
}
