//! Git plumbing adapter
//!
//! The inference engine only ever sees a [`CommitGraph`] snapshot; everything
//! that touches the repository goes through these traits so the core can be
//! exercised against hand-built graphs.

mod repository;

pub use repository::Git2Repository;

use crate::error::Result;
use crate::types::{CommitGraph, GitRemote};

/// Read access to the commit/ref graph
///
/// Implementations block on I/O; run them through
/// [`concurrent::blocking`](crate::concurrent::blocking) from async code.
pub trait CommitGraphReader: Send + Sync {
    /// Read every commit reachable from a local branch but not from `root_ref`,
    /// plus the `root_ref` tip itself, newest first
    ///
    /// Fails with [`Error::GraphRead`](crate::error::Error::GraphRead) when the
    /// repository or `root_ref` cannot be resolved.
    fn read_graph(&self, root_ref: &str) -> Result<CommitGraph>;

    /// Full hash of the commit at HEAD
    fn read_head(&self) -> Result<String>;

    /// Name of the checked-out branch, `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;
}

/// Mutating git operations
pub trait GitWriter: Send + Sync {
    /// Force-push (with lease) a local branch to the same name on `remote`
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Record a `fixup!` commit targeting `commit`, staging tracked changes
    /// first when `add_all` is set; returns git's output
    fn commit_fixup(&self, commit: &str, add_all: bool) -> Result<String>;

    /// Squash pending fixup commits in place, keeping the fork point from `onto`
    fn rebase_autosquash(&self, onto: &str) -> Result<String>;

    /// Check out a local branch
    fn checkout_branch(&self, branch: &str) -> Result<()>;

    /// Configured remotes
    fn remotes(&self) -> Result<Vec<GitRemote>>;
}

/// Pick a remote: the requested one, else `origin`, else the first
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    use crate::error::Error;

    if let Some(name) = requested {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.name.clone())
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    remotes
        .iter()
        .find(|r| r.name == "origin")
        .or_else(|| remotes.first())
        .map(|r| r.name.clone())
        .ok_or(Error::NoSupportedRemotes)
}
