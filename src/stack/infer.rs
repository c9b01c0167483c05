//! Stack inference - pure functions from a commit graph to [`Stacks`]
//!
//! No I/O happens here. Each tracked branch walks its first-parent ancestry
//! until it meets either another tracked branch (its parent) or the trunk
//! (bottom of a stack). The parent pointers form a forest rooted at the
//! default branch; each chain hanging off the trunk becomes one [`Stack`].

use super::{Stack, StackError, Stacks};
use crate::types::{Branch, Commit, CommitGraph};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Where a branch's ancestry walk stopped
#[derive(Debug, Clone, Copy)]
enum ParentRef<'g> {
    /// Reached a commit on the default branch
    Trunk,
    /// Reached a commit carrying other tracked branch name(s)
    Commit(&'g str),
}

/// Outcome of one branch's ancestry walk
#[derive(Debug)]
struct Placement<'g> {
    parent: ParentRef<'g>,
    /// Commits owned by the branch, tip first
    segment: Vec<&'g Commit>,
}

/// Lookup tables built once per graph
struct GraphIndex<'g> {
    commits: HashMap<&'g str, &'g Commit>,
    trunk: HashSet<&'g str>,
    /// Tracked branch name -> tip commit
    tips: BTreeMap<&'g str, &'g Commit>,
    /// Tip commit -> tracked branch names at it (sorted)
    names_at: HashMap<&'g str, Vec<&'g str>>,
}

impl<'g> GraphIndex<'g> {
    fn new(default_branch: &str, graph: &'g CommitGraph) -> Self {
        let commits: HashMap<&str, &Commit> = graph
            .commits
            .iter()
            .map(|c| (c.hash.as_str(), c))
            .collect();

        // Everything reachable from the default branch tip is trunk
        let mut trunk = HashSet::new();
        let mut pending: Vec<&str> = graph
            .commits
            .iter()
            .filter(|c| c.branches.iter().any(|b| b == default_branch))
            .map(|c| c.hash.as_str())
            .collect();
        while let Some(hash) = pending.pop() {
            if !trunk.insert(hash) {
                continue;
            }
            if let Some(commit) = commits.get(hash).copied() {
                pending.extend(commit.parents.iter().map(String::as_str));
            }
        }

        let mut tips = BTreeMap::new();
        let mut names_at: HashMap<&str, Vec<&str>> = HashMap::new();
        for commit in &graph.commits {
            if trunk.contains(commit.hash.as_str()) {
                continue;
            }
            for name in &commit.branches {
                tips.insert(name.as_str(), commit);
                names_at
                    .entry(commit.hash.as_str())
                    .or_default()
                    .push(name.as_str());
            }
        }
        for names in names_at.values_mut() {
            names.sort_unstable();
            names.dedup();
        }

        Self {
            commits,
            trunk,
            tips,
            names_at,
        }
    }

    /// Commits hidden by the reader are ancestors of the default branch
    fn is_trunk(&self, hash: &str) -> bool {
        self.trunk.contains(hash) || !self.commits.contains_key(hash)
    }

    /// Walk first parents from `tip` to the nearest tracked commit or trunk
    ///
    /// Returns `None` when history runs out (or loops) first.
    fn walk(&self, tip: &'g Commit) -> Option<Placement<'g>> {
        let mut segment = vec![tip];
        let mut seen = HashSet::from([tip.hash.as_str()]);
        let mut current = tip;

        loop {
            let parent = current.parents.first()?;
            if self.is_trunk(parent) {
                return Some(Placement {
                    parent: ParentRef::Trunk,
                    segment,
                });
            }
            let commit = *self.commits.get(parent.as_str())?;
            if self.names_at.contains_key(commit.hash.as_str()) {
                return Some(Placement {
                    parent: ParentRef::Commit(commit.hash.as_str()),
                    segment,
                });
            }
            if !seen.insert(commit.hash.as_str()) {
                return None;
            }
            segment.push(commit);
            current = commit;
        }
    }
}

/// Infer every stack in `graph`
///
/// Deterministic for a given graph: all tie-breaks use branch name order.
/// Malformed branches are reported in [`Stacks::errors`] and never abort the
/// pass. Current flags are left unset; see [`Stacks::mark_current`].
pub fn infer_stacks(default_branch: &str, graph: &CommitGraph) -> Stacks {
    let index = GraphIndex::new(default_branch, graph);
    let mut errors = Vec::new();
    let mut reported: BTreeSet<&str> = BTreeSet::new();

    // Several names on one tip: none of them has a defined position
    let mut shared_tips: Vec<(&str, &Vec<&str>)> = index
        .names_at
        .iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(hash, names)| (*hash, names))
        .collect();
    shared_tips.sort_by(|a, b| a.1.cmp(b.1));
    for (hash, names) in shared_tips {
        reported.extend(names.iter().copied());
        errors.push(StackError::AmbiguousBranch {
            commit: hash.to_string(),
            branches: names.iter().map(ToString::to_string).collect(),
        });
    }

    let mut placements: BTreeMap<&str, Placement> = BTreeMap::new();
    for (name, tip) in &index.tips {
        if reported.contains(name) {
            continue;
        }
        if let Some(placement) = index.walk(*tip) {
            placements.insert(*name, placement);
        } else {
            reported.insert(*name);
            errors.push(StackError::Unreachable {
                branch: (*name).to_string(),
                default_branch: default_branch.to_string(),
            });
        }
    }

    // Parent pointers; children lists come out sorted since placements is ordered
    let mut roots = Vec::new();
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, placement) in &placements {
        match placement.parent {
            ParentRef::Trunk => roots.push(*name),
            ParentRef::Commit(hash) => {
                if let Some([parent]) = index.names_at.get(hash).map(Vec::as_slice) {
                    children.entry(*parent).or_default().push(*name);
                }
            }
        }
    }

    let mut stacks = Vec::new();
    let mut placed: BTreeSet<&str> = BTreeSet::new();
    for root in roots {
        let mut chain = vec![root];
        let mut current = root;
        loop {
            match children.get(current).map(Vec::as_slice).unwrap_or_default() {
                [] => break,
                [only] => {
                    chain.push(*only);
                    current = *only;
                }
                all @ [chosen, rest @ ..] => {
                    errors.push(StackError::AmbiguousParent {
                        parent: current.to_string(),
                        children: all.iter().map(ToString::to_string).collect(),
                        chosen: (*chosen).to_string(),
                    });
                    reported.extend(rest.iter().copied());
                    chain.push(*chosen);
                    current = *chosen;
                }
            }
        }
        placed.extend(chain.iter().copied());
        stacks.push(build_stack(default_branch, &chain, &placements));
    }

    // Anything left hangs off a branch that could not be placed
    for (name, placement) in &placements {
        if placed.contains(name) || reported.contains(name) {
            continue;
        }
        let ancestor = match placement.parent {
            ParentRef::Commit(hash) => index
                .names_at
                .get(hash)
                .map(|names| names.join(", "))
                .unwrap_or_default(),
            ParentRef::Trunk => default_branch.to_string(),
        };
        errors.push(StackError::Orphaned {
            branch: (*name).to_string(),
            ancestor,
        });
    }

    debug!(
        stacks = stacks.len(),
        errors = errors.len(),
        "inferred stacks"
    );

    Stacks {
        inferred_stacks: stacks,
        errors,
    }
}

fn build_stack(default_branch: &str, chain: &[&str], placements: &BTreeMap<&str, Placement>) -> Stack {
    let mut branches = Vec::with_capacity(chain.len());
    let mut commits = Vec::new();

    for name in chain {
        let Some(placement) = placements.get(name) else {
            continue;
        };
        let tip = placement.segment.first().map(|c| c.hash.clone()).unwrap_or_default();
        let title_hint = placement
            .segment
            .last()
            .map(|c| c.summary.trim())
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);
        branches.push(Branch {
            name: (*name).to_string(),
            tip,
            title_hint,
        });
    }

    for name in chain.iter().rev() {
        if let Some(placement) = placements.get(name) {
            commits.extend(placement.segment.iter().map(|c| c.hash.clone()));
        }
    }

    Stack::new(default_branch.to_string(), branches, commits)
}
