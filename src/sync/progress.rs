//! Progress reporting hooks for sync

use super::BranchOutcome;
use async_trait::async_trait;

/// Receives status updates while a plan executes
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Free-form status line
    async fn on_message(&self, message: &str);

    /// A branch finished phase one
    async fn on_outcome(&self, outcome: &BranchOutcome);
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}

    async fn on_outcome(&self, _outcome: &BranchOutcome) {}
}
