//! git-stack: stacked pull requests inferred from plain git branches
//!
//! Branches are never registered anywhere. Every command reads the commit
//! graph, infers which branches form linear stacks on top of the default
//! branch, and (for `push`) brings GitHub or GitLab in line: one pull request
//! per branch, each targeting the branch below it, each carrying a generated
//! navigation block in its description.
//!
//! # Architecture
//!
//! - [`git`] - read the commit graph, push branches
//! - [`stack`] - pure inference from a [`types::CommitGraph`] to [`stack::Stacks`]
//! - [`sync`] - plan and apply pull request changes for one stack
//! - [`platform`] - GitHub (octocrab) and GitLab (REST) adapters
//! - [`concurrent`] - bounded, cancellable task groups
//! - [`config`], [`cache`], [`auth`] - user settings, default-branch cache, tokens

pub mod auth;
pub mod cache;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod git;
pub mod platform;
pub mod stack;
pub mod sync;
pub mod types;

pub use error::{Error, Result};
