//! Error types for git-stack

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// All errors produced by git-stack
#[derive(Debug, Error)]
pub enum Error {
    /// Low-level libgit2 failure
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// The commit graph could not be read (unknown root ref, no repository, ...)
    #[error("failed to read commit graph: {0}")]
    GraphRead(String),

    /// A git subprocess (push) failed
    #[error("git command failed: {0}")]
    GitCommand(String),

    /// HEAD is not within any inferred stack
    #[error("no current stack: HEAD is not on a tracked stack")]
    NoCurrentStack,

    /// A branch name was not found among the inferred stacks
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// No open pull request exists for the source branch
    #[error("no open pull request for source branch: {branch}")]
    PullRequestNotFound {
        /// Source branch that was looked up
        branch: String,
    },

    /// More than one open pull request exists for the source branch
    #[error("found multiple pull requests for source branch: {branch}, urls: {}", .urls.join(", "))]
    MultiplePullRequests {
        /// Source branch that was looked up
        branch: String,
        /// Web URLs of every matching pull request
        urls: Vec<String>,
    },

    /// A pull request payload failed validation before reaching the host
    #[error("invalid pull request: {0}")]
    InvalidPullRequest(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Generic platform error (used by test doubles and factories)
    #[error("platform error: {0}")]
    Platform(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication could not be resolved
    #[error("authentication error: {0}")]
    Auth(String),

    /// Config file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// Default-branch cache could not be read or written
    #[error("cache error: {0}")]
    Cache(String),

    /// No GitHub/GitLab remote could be recognised
    #[error("no supported remotes found (GitHub or GitLab)")]
    NoSupportedRemotes,

    /// Named remote does not exist
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// Operation observed cancellation of its task group
    #[error("operation cancelled")]
    Cancelled,

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the host reported that no pull request exists
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PullRequestNotFound { .. })
    }

    /// True when the error only reflects cancellation by a sibling task
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("task failed to complete: {err}"))
    }
}
