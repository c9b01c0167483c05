//! Mock platform service for testing
//!
//! Behaves like a tiny in-memory host: created requests are stored and later
//! lookups see them, so multi-step sync scenarios can be exercised end to end.

#![allow(dead_code)]

use async_trait::async_trait;
use git_stack::error::{Error, Result};
use git_stack::platform::PlatformService;
use git_stack::types::{PlatformConfig, PullRequest, Repo, markdown_url};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Simple mock platform service for testing
///
/// This manually implements `PlatformService` rather than using mockall,
/// because mockall has issues with methods returning references.
///
/// Features:
/// - Auto-incrementing request ids
/// - Open requests stored per source branch
/// - Call tracking for verification
/// - Per-branch error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    default_branch: Mutex<String>,
    next_id: AtomicU64,
    open_prs: Mutex<HashMap<String, Vec<PullRequest>>>,
    // Call tracking
    get_repo_calls: AtomicUsize,
    get_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<PullRequest>>,
    update_pr_calls: Mutex<Vec<PullRequest>>,
    // Overlap tracking for lookups and update calls
    lookup_delay: Mutex<Option<Duration>>,
    lookups_in_flight: AtomicUsize,
    peak_lookups_in_flight: AtomicUsize,
    update_delay: Mutex<Option<Duration>>,
    updates_in_flight: AtomicUsize,
    peak_updates_in_flight: AtomicUsize,
    // Error injection, keyed by source branch
    error_on_get_pr: Mutex<HashMap<String, String>>,
    error_on_create_pr: Mutex<HashMap<String, String>>,
    error_on_update_pr: Mutex<HashMap<String, String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            default_branch: Mutex::new("main".to_string()),
            next_id: AtomicU64::new(1),
            open_prs: Mutex::new(HashMap::new()),
            get_repo_calls: AtomicUsize::new(0),
            get_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_pr_calls: Mutex::new(Vec::new()),
            lookup_delay: Mutex::new(None),
            lookups_in_flight: AtomicUsize::new(0),
            peak_lookups_in_flight: AtomicUsize::new(0),
            update_delay: Mutex::new(None),
            updates_in_flight: AtomicUsize::new(0),
            peak_updates_in_flight: AtomicUsize::new(0),
            error_on_get_pr: Mutex::new(HashMap::new()),
            error_on_create_pr: Mutex::new(HashMap::new()),
            error_on_update_pr: Mutex::new(HashMap::new()),
        }
    }

    // === Setup methods ===

    /// Default branch reported by `get_repo`
    pub fn set_default_branch(&self, branch: &str) {
        *self.default_branch.lock().unwrap() = branch.to_string();
    }

    /// Seed an open request; its id also advances the id counter
    pub fn set_pr(&self, pr: PullRequest) {
        self.next_id.fetch_max(pr.id + 1, Ordering::SeqCst);
        self.open_prs
            .lock()
            .unwrap()
            .insert(pr.source_branch.clone(), vec![pr]);
    }

    /// Seed several open requests for the same branch
    pub fn set_duplicate_prs(&self, branch: &str, prs: Vec<PullRequest>) {
        self.open_prs
            .lock()
            .unwrap()
            .insert(branch.to_string(), prs);
    }

    /// Make every `get_pull_request` take this long
    pub fn set_lookup_delay(&self, delay: Duration) {
        *self.lookup_delay.lock().unwrap() = Some(delay);
    }

    /// Make every `update_pull_request` take this long
    pub fn set_update_delay(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = Some(delay);
    }

    // === Error injection methods ===

    /// Make `get_pull_request` fail for `branch`
    pub fn fail_get_pr(&self, branch: &str, msg: &str) {
        self.error_on_get_pr
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    /// Make `create_pull_request` fail for `branch`
    pub fn fail_create_pr(&self, branch: &str, msg: &str) {
        self.error_on_create_pr
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    /// Make `update_pull_request` fail for `branch`
    pub fn fail_update_pr(&self, branch: &str, msg: &str) {
        self.error_on_update_pr
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    // === Inspection methods ===

    /// Current state of the open request for `branch`
    pub fn pr(&self, branch: &str) -> Option<PullRequest> {
        self.open_prs
            .lock()
            .unwrap()
            .get(branch)
            .and_then(|prs| prs.first().cloned())
    }

    /// Number of `get_repo` calls
    pub fn get_repo_call_count(&self) -> usize {
        self.get_repo_calls.load(Ordering::SeqCst)
    }

    /// Branches passed to `get_pull_request`
    pub fn get_pr_calls(&self) -> Vec<String> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Payloads passed to `create_pull_request`, in call order
    pub fn create_pr_calls(&self) -> Vec<PullRequest> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Payloads passed to `update_pull_request`, in call order
    pub fn update_pr_calls(&self) -> Vec<PullRequest> {
        self.update_pr_calls.lock().unwrap().clone()
    }

    /// Update payloads for one branch
    pub fn update_pr_calls_for(&self, branch: &str) -> Vec<PullRequest> {
        self.update_pr_calls()
            .into_iter()
            .filter(|pr| pr.source_branch == branch)
            .collect()
    }

    /// Most `get_pull_request` calls observed running at the same time
    pub fn peak_lookups_in_flight(&self) -> usize {
        self.peak_lookups_in_flight.load(Ordering::SeqCst)
    }

    /// Most `update_pull_request` calls observed running at the same time
    pub fn peak_updates_in_flight(&self) -> usize {
        self.peak_updates_in_flight.load(Ordering::SeqCst)
    }

    /// Whether any host write happened
    pub fn has_writes(&self) -> bool {
        !self.create_pr_calls().is_empty() || !self.update_pr_calls().is_empty()
    }

    fn web_url(&self, id: u64) -> String {
        format!(
            "https://github.com/{}/{}/pull/{id}",
            self.config.owner, self.config.repo
        )
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_repo(&self) -> Result<Repo> {
        self.get_repo_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Repo {
            default_branch: self.default_branch.lock().unwrap().clone(),
        })
    }

    async fn get_pull_request(&self, source_branch: &str) -> Result<PullRequest> {
        self.get_pr_calls
            .lock()
            .unwrap()
            .push(source_branch.to_string());

        let running = self.lookups_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_lookups_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = *self.lookup_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.lookups_in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(msg) = self.error_on_get_pr.lock().unwrap().get(source_branch) {
            return Err(Error::Platform(msg.clone()));
        }

        let prs = self
            .open_prs
            .lock()
            .unwrap()
            .get(source_branch)
            .cloned()
            .unwrap_or_default();
        match prs.len() {
            0 => Err(Error::PullRequestNotFound {
                branch: source_branch.to_string(),
            }),
            1 => Ok(prs[0].clone()),
            _ => Err(Error::MultiplePullRequests {
                branch: source_branch.to_string(),
                urls: prs.into_iter().map(|pr| pr.web_url).collect(),
            }),
        }
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(pr.clone());

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().get(&pr.source_branch) {
            return Err(Error::Platform(msg.clone()));
        }
        if pr.title.is_empty() {
            return Err(Error::InvalidPullRequest(
                "pull request title cannot be empty".to_string(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let web_url = self.web_url(id);
        let created = PullRequest {
            id,
            markdown_web_url: markdown_url(&web_url),
            web_url,
            ..pr.clone()
        };
        self.open_prs
            .lock()
            .unwrap()
            .insert(created.source_branch.clone(), vec![created.clone()]);
        Ok(created)
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<PullRequest> {
        self.update_pr_calls.lock().unwrap().push(pr.clone());

        let running = self.updates_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_updates_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.updates_in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(msg) = self.error_on_update_pr.lock().unwrap().get(&pr.source_branch) {
            return Err(Error::Platform(msg.clone()));
        }
        if pr.id == 0 {
            return Err(Error::InvalidPullRequest(
                "pull request ID must be set".to_string(),
            ));
        }

        self.open_prs
            .lock()
            .unwrap()
            .insert(pr.source_branch.clone(), vec![pr.clone()]);
        Ok(pr.clone())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
