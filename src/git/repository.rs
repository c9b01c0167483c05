//! `git2`-backed implementation of the git traits

use super::{CommitGraphReader, GitWriter};
use crate::error::{Error, Result};
use crate::types::{Commit, CommitGraph, GitRemote};
use git2::{BranchType, Oid, Repository, Sort};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// A git repository on disk
///
/// Holds only the path: `git2::Repository` is not `Sync`, so each call opens
/// its own handle and concurrent reads never share one.
#[derive(Debug, Clone)]
pub struct Git2Repository {
    path: PathBuf,
}

impl Git2Repository {
    /// Discover the repository containing `path`
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|e| Error::GraphRead(format!("not a git repository: {e}")))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::GraphRead("repository has no working directory".to_string()))?
            .to_path_buf();
        Ok(Self { path: workdir })
    }

    /// Root of the working tree
    pub fn workdir(&self) -> &Path {
        &self.path
    }

    fn repo(&self) -> Result<Repository> {
        Repository::open(&self.path)
            .map_err(|e| Error::GraphRead(format!("failed to open {}: {e}", self.path.display())))
    }
}

/// Local branch tips keyed by commit, names sorted for stable output
fn local_branch_tips(repo: &Repository) -> Result<HashMap<Oid, Vec<String>>> {
    let mut tips: HashMap<Oid, Vec<String>> = HashMap::new();
    for entry in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = entry?;
        let Some(name) = branch.name()?.map(ToString::to_string) else {
            continue;
        };
        let Ok(commit) = branch.get().peel_to_commit() else {
            continue;
        };
        tips.entry(commit.id()).or_default().push(name);
    }
    for names in tips.values_mut() {
        names.sort();
    }
    Ok(tips)
}

impl CommitGraphReader for Git2Repository {
    fn read_graph(&self, root_ref: &str) -> Result<CommitGraph> {
        let repo = self.repo()?;
        let root = repo
            .revparse_single(root_ref)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| Error::GraphRead(format!("cannot resolve {root_ref}: {e}")))?;

        let tips = local_branch_tips(&repo)?;

        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push(root.id())?;
        for tip in tips.keys() {
            walk.push(*tip)?;
        }
        for parent in root.parent_ids() {
            walk.hide(parent)?;
        }

        let mut commits = Vec::new();
        for oid in walk {
            let oid = oid.map_err(|e| Error::GraphRead(e.to_string()))?;
            let commit = repo.find_commit(oid)?;
            let mut branches = tips.get(&oid).cloned().unwrap_or_default();
            // The root must carry the name inference treats as trunk
            if oid == root.id() && !branches.iter().any(|b| b == root_ref) {
                branches.push(root_ref.to_string());
            }
            commits.push(Commit {
                hash: oid.to_string(),
                parents: commit.parent_ids().map(|p| p.to_string()).collect(),
                branches,
                summary: commit.summary().unwrap_or_default().to_string(),
            });
        }

        debug!(root_ref, commits = commits.len(), "read commit graph");
        Ok(CommitGraph::new(commits))
    }

    fn read_head(&self) -> Result<String> {
        let repo = self.repo()?;
        let head = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| Error::GraphRead(format!("cannot resolve HEAD: {e}")))?;
        Ok(head.id().to_string())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let repo = self.repo()?;
        let head = repo
            .head()
            .map_err(|e| Error::GraphRead(format!("cannot resolve HEAD: {e}")))?;
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(ToString::to_string))
    }
}

impl Git2Repository {
    /// Run the git CLI in the working tree, returning trimmed stdout
    fn run_git(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
        let output = Command::new("git")
            .current_dir(&self.path)
            .args(args)
            .envs(envs.iter().copied())
            .output()
            .map_err(|e| Error::GitCommand(format!("failed to run git {}: {e}", args[0])))?;

        if !output.status.success() {
            return Err(Error::GitCommand(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitWriter for Git2Repository {
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        debug!(remote, branch, "pushing branch");
        // libgit2 does not honour credential helpers the way the git CLI does
        let refspec = format!("{branch}:{branch}");
        self.run_git(&["push", "--force-with-lease", remote, &refspec], &[])?;
        Ok(())
    }

    fn commit_fixup(&self, commit: &str, add_all: bool) -> Result<String> {
        debug!(commit, add_all, "creating fixup commit");
        let mut args = vec!["commit", "--fixup", commit];
        if add_all {
            args.push("-a");
        }
        self.run_git(&args, &[])
    }

    fn rebase_autosquash(&self, onto: &str) -> Result<String> {
        debug!(onto, "rebasing with autosquash");
        // Accept the generated todo list as is
        self.run_git(
            &["rebase", "-i", "--keep-base", "--autosquash", onto],
            &[("GIT_SEQUENCE_EDITOR", "true")],
        )
    }

    fn checkout_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "checking out branch");
        self.run_git(&["checkout", branch], &[])?;
        Ok(())
    }

    fn remotes(&self) -> Result<Vec<GitRemote>> {
        let repo = self.repo()?;
        let names = repo.remotes()?;
        let mut remotes = Vec::new();
        for name in names.iter().flatten() {
            let remote = repo.find_remote(name)?;
            if let Some(url) = remote.url() {
                remotes.push(GitRemote {
                    name: name.to_string(),
                    url: url.to_string(),
                });
            }
        }
        Ok(remotes)
    }
}
