//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::MockPlatformService;

use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use git_stack::types::{Commit, CommitGraph, Platform, PlatformConfig, PullRequest, markdown_url};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// GitHub config for `test/repo`
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        platform: Platform::GitHub,
        owner: "test".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}

/// GitLab config for `group/project`
pub fn gitlab_config() -> PlatformConfig {
    PlatformConfig {
        platform: Platform::GitLab,
        owner: "group".to_string(),
        repo: "project".to_string(),
        host: None,
    }
}

/// An open request as the host would report it
pub fn make_pr(id: u64, branch: &str, target: &str) -> PullRequest {
    let web_url = format!("https://github.com/test/repo/pull/{id}");
    PullRequest {
        id,
        source_branch: branch.to_string(),
        target_branch: target.to_string(),
        title: format!("Commit for {branch}"),
        description: String::new(),
        markdown_web_url: markdown_url(&web_url),
        web_url,
    }
}

/// Graph with `main` and one commit per branch stacked linearly on it
///
/// Commit hashes are `c-{branch}`, summaries `Commit for {branch}`. The
/// graph is listed newest first, as a reader would produce it.
pub fn make_linear_stack(branches: &[&str]) -> CommitGraph {
    let mut commits = vec![Commit::new("c-main", &[], &["main"])];
    let mut parent = "c-main".to_string();
    for name in branches {
        let hash = format!("c-{name}");
        commits.push(
            Commit::new(hash.clone(), &[parent.as_str()], &[*name])
                .with_summary(format!("Commit for {name}")),
        );
        parent = hash;
    }
    commits.reverse();
    CommitGraph::new(commits)
}

/// A real git repository in a temporary directory, `main` checked out
pub struct TempGitRepo {
    dir: TempDir,
    repo: Repository,
    counter: std::cell::Cell<u32>,
}

impl TempGitRepo {
    /// Initialize with one commit on `main`
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        // Identity for commits made through the git CLI
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        config.set_bool("commit.gpgsign", false).unwrap();
        let this = Self {
            dir,
            repo,
            counter: std::cell::Cell::new(0),
        };
        this.commit("Initial commit");
        this
    }

    /// Working directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit a new file on the checked-out branch
    pub fn commit(&self, message: &str) -> Oid {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        let file = format!("file-{n}.txt");
        fs::write(self.path().join(&file), message).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(&file)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Create `name` at HEAD and check it out
    pub fn branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).unwrap();
        self.checkout(name);
    }

    /// Check out an existing branch
    pub fn checkout(&self, name: &str) {
        self.repo.set_head(&format!("refs/heads/{name}")).unwrap();
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
            .unwrap();
    }

    /// Detach HEAD at the current commit
    pub fn detach(&self) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.set_head_detached(head.id()).unwrap();
    }

    /// Overwrite a file in the working tree without staging it
    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).unwrap();
    }

    /// Summaries of the commits on HEAD that are not on `base`, newest first
    pub fn summaries_since(&self, base: &str) -> Vec<String> {
        let base = self.repo.revparse_single(base).unwrap().id();
        let mut walk = self.repo.revwalk().unwrap();
        walk.push_head().unwrap();
        walk.hide(base).unwrap();
        walk.map(|oid| {
            let commit = self.repo.find_commit(oid.unwrap()).unwrap();
            commit.summary().unwrap_or_default().to_string()
        })
        .collect()
    }

    /// Add a remote
    pub fn add_remote(&self, name: &str, url: &str) {
        self.repo.remote(name, url).unwrap();
    }
}
