//! Stack synchronization with the hosting platform
//!
//! Three stages, mirroring how the rest of the crate separates pure logic
//! from effects:
//!
//! 1. **Fetch** ([`fetch_existing`]) - look up every branch's open request
//!    concurrently.
//! 2. **Plan** ([`create_sync_plan`]) - decide create / retarget / keep per
//!    branch. Pure.
//! 3. **Execute** ([`execute_sync`]) - apply phase one bottom to top, then
//!    rewrite navigation blocks.

pub mod description;
mod execute;
mod plan;
mod progress;

pub use description::{
    BEGIN_MARKER, END_MARKER, format_description, render_navigation, splice_navigation,
    stack_heading,
};
pub use execute::{BranchOutcome, SyncAction, SyncError, SyncReport, execute_sync};
pub use plan::{DEFAULT_CONCURRENCY, Lookup, SyncPlan, SyncStep, create_sync_plan, fetch_existing};
pub use progress::{NoopProgress, ProgressCallback};

use crate::concurrent::CancellationToken;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::stack::Stack;
use std::sync::Arc;
use tracing::info;

/// Plan the sync of one stack
pub async fn plan_sync(
    stack: &Stack,
    platform: Arc<dyn PlatformService>,
    token: &CancellationToken,
) -> Result<SyncPlan> {
    let lookups = fetch_existing(stack, platform, token, DEFAULT_CONCURRENCY).await?;
    Ok(create_sync_plan(stack, &lookups))
}

/// Bring the host's pull requests in line with one stack
///
/// Returns `Err` only for cancellation or internal failures; per-branch host
/// errors are reported through [`SyncReport`].
pub async fn sync_stack(
    stack: &Stack,
    platform: Arc<dyn PlatformService>,
    token: &CancellationToken,
    progress: &dyn ProgressCallback,
) -> Result<SyncReport> {
    info!(stack = stack.name(), branches = stack.len(), "syncing stack");
    let plan = plan_sync(stack, Arc::clone(&platform), token).await?;
    execute_sync(&plan, platform, token, progress).await
}
