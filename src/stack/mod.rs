//! Stack model
//!
//! A [`Stack`] is an ordered chain of local branches, bottom (closest to the
//! default branch) first. [`Stacks`] is the forest produced by
//! [`infer_stacks`]: every well-formed stack plus the structural problems
//! found along the way.

mod infer;

pub use infer::infer_stacks;

use crate::error::{Error, Result};
use crate::types::Branch;
use thiserror::Error as ThisError;

/// Minimum length accepted for an abbreviated commit hash
const MIN_ABBREV_LEN: usize = 7;

/// An ordered chain of branches rooted at the default branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    base: String,
    branches: Vec<Branch>,
    commits: Vec<String>,
    current: bool,
}

impl Stack {
    pub(crate) const fn new(base: String, branches: Vec<Branch>, commits: Vec<String>) -> Self {
        Self {
            base,
            branches,
            commits,
            current: false,
        }
    }

    /// Display name: the top-most branch
    pub fn name(&self) -> &str {
        self.branches.last().map_or("", |b| b.name.as_str())
    }

    /// Default branch this stack is rooted on
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Branches bottom to top
    pub fn all_branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Branches available for interactive selection (same set, bottom to top)
    pub fn local_branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Branch names bottom to top
    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }

    /// Number of branches
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Always false for inferred stacks
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Commits spanned by the stack, top tip first, merge-base excluded
    pub fn commits(&self) -> &[String] {
        &self.commits
    }

    /// Whether HEAD was inside this stack when the flags were computed
    pub const fn current(&self) -> bool {
        self.current
    }

    /// True iff `commit` lies within the stack's commit range
    ///
    /// Accepts abbreviated hashes of at least seven characters.
    pub fn is_current(&self, commit: &str) -> bool {
        if commit.is_empty() {
            return false;
        }
        self.commits.iter().any(|c| {
            c == commit || (commit.len() >= MIN_ABBREV_LEN && c.starts_with(commit))
        })
    }

    /// Whether the stack contains a branch with this name
    pub fn contains(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b.name == branch)
    }

    /// The branch called `name`
    pub fn branch(&self, name: &str) -> Result<&Branch> {
        self.branches
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))
    }

    /// Branch a pull request for `branch` should target: the one below it,
    /// or the default branch for the bottom-most
    pub fn target_of(&self, branch: &str) -> Option<&str> {
        let index = self.branches.iter().position(|b| b.name == branch)?;
        Some(if index == 0 {
            self.base.as_str()
        } else {
            self.branches[index - 1].name.as_str()
        })
    }
}

/// A branch that could not be placed unambiguously
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StackError {
    /// Several branches point at the same commit
    #[error("branches {} point at the same commit {}, cannot determine their order", .branches.join(", "), short(.commit))]
    AmbiguousBranch {
        /// Shared tip commit
        commit: String,
        /// Every branch at that commit, sorted
        branches: Vec<String>,
    },

    /// History ends without reaching the default branch
    #[error("branch {branch} does not descend from default branch {default_branch}")]
    Unreachable {
        /// Offending branch
        branch: String,
        /// Default branch name
        default_branch: String,
    },

    /// One branch is the nearest tracked ancestor of several branches
    #[error("branch {parent} has multiple child branches ({}), continuing the stack with {chosen}", .children.join(", "))]
    AmbiguousParent {
        /// The shared parent
        parent: String,
        /// All children, sorted
        children: Vec<String>,
        /// Child kept in the stack
        chosen: String,
    },

    /// Built on a branch that itself could not be placed
    #[error("branch {branch} is built on {ancestor}, which could not be placed in a stack")]
    Orphaned {
        /// Offending branch
        branch: String,
        /// Name(s) at the nearest tracked ancestor commit
        ancestor: String,
    },
}

impl StackError {
    /// Branches this error removed from the stacks
    pub fn unplaced_branches(&self) -> Vec<&str> {
        match self {
            Self::AmbiguousBranch { branches, .. } => branches.iter().map(String::as_str).collect(),
            Self::Unreachable { branch, .. } | Self::Orphaned { branch, .. } => vec![branch.as_str()],
            Self::AmbiguousParent {
                children, chosen, ..
            } => children
                .iter()
                .filter(|c| *c != chosen)
                .map(String::as_str)
                .collect(),
        }
    }

}

fn short(commit: &str) -> &str {
    commit.get(..MIN_ABBREV_LEN).unwrap_or(commit)
}

/// Result of stack inference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stacks {
    /// Well-formed stacks
    pub inferred_stacks: Vec<Stack>,
    /// Structural problems, in discovery order
    pub errors: Vec<StackError>,
}

impl Stacks {
    /// Set each stack's current flag from the commit at HEAD
    pub fn mark_current(&mut self, head: &str) {
        for stack in &mut self.inferred_stacks {
            stack.current = stack.is_current(head);
        }
    }

    /// The stack containing HEAD
    pub fn get_current(&self) -> Result<&Stack> {
        self.inferred_stacks
            .iter()
            .find(|s| s.current)
            .ok_or(Error::NoCurrentStack)
    }

    /// The stack a branch belongs to
    pub fn find_by_branch(&self, branch: &str) -> Result<&Stack> {
        self.inferred_stacks
            .iter()
            .find(|s| s.contains(branch))
            .ok_or_else(|| Error::BranchNotFound(branch.to_string()))
    }

    /// True if any structural problems were found
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
