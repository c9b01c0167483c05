//! Core types for git-stack

use serde::{Deserialize, Serialize};

/// A commit from the graph snapshot
///
/// Produced once per invocation by a [`CommitGraphReader`] and never mutated.
///
/// [`CommitGraphReader`]: crate::git::CommitGraphReader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit hash (hex)
    pub hash: String,
    /// Parent hashes, first parent first
    pub parents: Vec<String>,
    /// Local branch names whose tip is this commit
    pub branches: Vec<String>,
    /// First line of the commit message
    pub summary: String,
}

impl Commit {
    /// Create a commit with no summary
    pub fn new(hash: impl Into<String>, parents: &[&str], branches: &[&str]) -> Self {
        Self {
            hash: hash.into(),
            parents: parents.iter().map(ToString::to_string).collect(),
            branches: branches.iter().map(ToString::to_string).collect(),
            summary: String::new(),
        }
    }

    /// Set the summary line
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Snapshot of the commit graph relevant to stack inference
///
/// Contains every commit reachable from a local branch but not from the
/// default branch, plus the default branch tip itself. Parents that are not
/// part of `commits` were hidden by the reader because they are ancestors of
/// the default branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitGraph {
    /// Commits, newest first
    pub commits: Vec<Commit>,
}

impl CommitGraph {
    /// Build a graph from a list of commits
    pub const fn new(commits: Vec<Commit>) -> Self {
        Self { commits }
    }
}

/// A local branch: name plus tip commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// Tip commit hash
    pub tip: String,
    /// Summary of the oldest commit belonging to this branch (PR title hint)
    pub title_hint: Option<String>,
}

/// Repository metadata owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// Default branch name (e.g., "main")
    pub default_branch: String,
}

/// A pull request / merge request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number / MR iid (0 when not yet created)
    pub id: u64,
    /// Head branch name
    pub source_branch: String,
    /// Base branch name
    pub target_branch: String,
    /// PR/MR title
    pub title: String,
    /// PR/MR body
    pub description: String,
    /// Canonical web URL
    pub web_url: String,
    /// URL form that the host renders as a rich link in markdown
    pub markdown_web_url: String,
}

impl PullRequest {
    /// A not-yet-created pull request
    pub fn draft(
        source_branch: impl Into<String>,
        target_branch: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Markdown-safe form of a web URL
pub fn markdown_url(web_url: &str) -> String {
    format!("{web_url}+")
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user, organization, or GitLab group path)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}

impl PlatformConfig {
    /// `owner/repo` path, the key used for per-repository config
    pub fn repo_path(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
