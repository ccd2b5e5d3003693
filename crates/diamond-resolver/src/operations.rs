//! Conflict resolution over a candidate tree.
//!
//! Every outer iteration makes three breadth-first passes:
//!
//! 1. reject everything below a rejected node and track the versions that
//!    remain visible for each package id,
//! 2. mark ids that sit below a disputed id (one with several visible
//!    versions) as ambiguous,
//! 3. accept the highest visible version of every id that is not ambiguous
//!    and reject the others.
//!
//! Iterations repeat until no node is left `Acceptable` or patience runs out.
//!
//! ```text
//! a1->b1->d1->x1
//! a1->c1->d2->z1
//!
//! first iteration:  d1/d2 are disputed, x1 and z1 are ambiguous, d1 is rejected
//! second iteration: x1 is no longer visible, z1 is not ambiguous and is accepted
//! ```

use std::collections::{BTreeSet, HashMap};

use diamond_core::config::{ResolveConfig, ResolverConfig, DEFAULT_PATIENCE};
use diamond_core::library::package_key;
use diamond_core::version::{ComparableVersion, VersionRange};
use diamond_util::errors::DiamondError;

use crate::conflict::{ConflictReport, VersionConflict};
use crate::graph::{for_each_with_state, walk_with_state, Disposition, GraphNode};
use crate::tracker::Tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Walking,
    Ambiguous,
    Rejected,
}

/// Outcome of the fixed-point loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: bool,
    /// Outer iterations that ran; zero when the tree was already decided.
    pub iterations: u32,
}

/// Resolution outcome plus post-resolution diagnostics.
#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    pub resolved: bool,
    pub iterations: u32,
    pub conflicts: ConflictReport,
    /// Ids that still have an undecided node, sorted.
    pub unresolved: Vec<String>,
}

impl AnalyzeResult {
    pub fn is_success(&self) -> bool {
        self.resolved && self.conflicts.is_empty()
    }

    /// Turn a failed analysis into an error naming the packages involved.
    pub fn ensure_resolved(&self) -> Result<(), DiamondError> {
        if !self.resolved {
            return Err(DiamondError::Resolution {
                message: format!(
                    "no consistent version of {} after {} iterations",
                    self.unresolved.join(", "),
                    self.iterations
                ),
            });
        }
        if !self.conflicts.is_empty() {
            return Err(DiamondError::Resolution {
                message: format!(
                    "{}\n{}",
                    self.conflicts.ids().join(", "),
                    self.conflicts.to_string().trim_end()
                ),
            });
        }
        Ok(())
    }
}

/// Conflict resolver configured with a patience budget.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolveConfig,
}

impl Resolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            config: config.resolve.clone(),
        }
    }

    pub fn with_patience(patience: u32) -> Self {
        Self {
            config: ResolveConfig {
                patience,
                ..ResolveConfig::default()
            },
        }
    }

    pub fn patience(&self) -> u32 {
        self.config.patience
    }

    /// Decide every node, returning `false` if patience runs out first.
    pub fn try_resolve_conflicts<T>(&self, root: &mut GraphNode<T>) -> bool {
        self.resolve(root).resolved
    }

    pub fn resolve<T>(&self, root: &mut GraphNode<T>) -> Resolution {
        resolve(root, self.config.patience)
    }

    /// Resolve, then report requests that the accepted versions violate.
    pub fn analyze<T>(&self, root: &mut GraphNode<T>) -> AnalyzeResult {
        let resolution = self.resolve(root);
        let conflicts = if self.config.detect_conflicts {
            detect_conflicts(root)
        } else {
            ConflictReport::new()
        };
        let unresolved: BTreeSet<String> = root
            .iter()
            .filter(|n| n.disposition() == Disposition::Acceptable)
            .map(|n| n.id().to_string())
            .collect();

        AnalyzeResult {
            resolved: resolution.resolved,
            iterations: resolution.iterations,
            conflicts,
            unresolved: unresolved.into_iter().collect(),
        }
    }
}

/// [`resolve`] with the default patience, reporting only success.
pub fn try_resolve_conflicts<T>(root: &mut GraphNode<T>) -> bool {
    resolve(root, DEFAULT_PATIENCE).resolved
}

/// Run outer iterations until every node is decided or `patience`
/// iterations have run.
pub fn resolve<T>(root: &mut GraphNode<T>, patience: u32) -> Resolution {
    let mut incomplete = has_undecided(root);
    let mut iterations = 0;
    let mut tracker = Tracker::new();

    while incomplete && iterations < patience {
        iterations += 1;
        run_passes(root, &mut tracker);
        incomplete = has_undecided(root);
        tracing::debug!(iteration = iterations, incomplete, "Conflict resolution pass finished");
        tracker.clear();
    }

    if incomplete {
        tracing::warn!(
            "Conflict resolution gave up after {iterations} iterations with undecided packages"
        );
    } else {
        tracing::info!("Conflict resolution converged after {iterations} iterations");
    }

    Resolution {
        resolved: !incomplete,
        iterations,
    }
}

fn run_passes<T>(root: &mut GraphNode<T>, tracker: &mut Tracker) {
    for_each_with_state(root, true, &mut *tracker, track_visible);
    for_each_with_state(root, WalkState::Walking, &mut *tracker, mark_ambiguous);
    for_each_with_state(root, true, &mut *tracker, accept_or_reject);
}

fn has_undecided<T>(root: &GraphNode<T>) -> bool {
    root.iter()
        .any(|n| n.disposition() == Disposition::Acceptable)
}

fn track_visible<T>(node: &mut GraphNode<T>, visible: bool, tracker: &mut Tracker) -> bool {
    if !visible || node.disposition() == Disposition::Rejected {
        node.reject();
        return false;
    }

    tracker.track(&node.item);
    true
}

fn mark_ambiguous<T>(node: &mut GraphNode<T>, state: WalkState, tracker: &mut Tracker) -> WalkState {
    if node.disposition() == Disposition::Rejected {
        return WalkState::Rejected;
    }

    if state == WalkState::Walking && tracker.is_disputed(&node.item) {
        return WalkState::Ambiguous;
    }

    if state == WalkState::Ambiguous {
        tracker.mark_ambiguous(&node.item);
    }

    state
}

fn accept_or_reject<T>(node: &mut GraphNode<T>, visible: bool, tracker: &mut Tracker) -> bool {
    if !visible || node.disposition() == Disposition::Rejected {
        return false;
    }

    if tracker.is_ambiguous(&node.item) {
        return false;
    }

    if node.disposition() == Disposition::Acceptable {
        if tracker.is_best_version(&node.item) {
            node.accept();
            tracing::trace!("Accepted {}", node.library());
        } else {
            node.reject();
            tracing::trace!("Rejected {}", node.library());
        }
    }

    node.disposition() == Disposition::Accepted
}

/// Find requests below accepted nodes whose range excludes the version
/// accepted for the same id.
pub fn detect_conflicts<T>(root: &GraphNode<T>) -> ConflictReport {
    let mut accepted: HashMap<String, (ComparableVersion, Vec<String>)> = HashMap::new();
    walk_with_state(root, Vec::new(), |node, path: &Vec<String>| {
        let mut path = path.clone();
        path.push(node.library().to_string());
        if node.disposition() == Disposition::Accepted {
            accepted
                .entry(package_key(node.id()))
                .or_insert_with(|| (node.library().version.clone(), path.clone()));
        }
        path
    });

    let mut report = ConflictReport::new();
    walk_with_state(root, Vec::new(), |node, path: &Vec<String>| {
        let mut path = path.clone();
        path.push(node.library().to_string());
        if node.disposition() != Disposition::Accepted {
            return path;
        }

        for child in &node.children {
            if child.disposition() == Disposition::Accepted {
                continue;
            }
            let Some((version, selected)) = accepted.get(&package_key(child.id())) else {
                continue;
            };
            if !child.key.allows(version) {
                let requested = child.key.range.clone().unwrap_or_else(VersionRange::all);
                let mut conflicting = path.clone();
                conflicting.push(child.library().to_string());
                report.add(VersionConflict {
                    id: child.id().to_string(),
                    requested: requested.to_string(),
                    resolved: version.to_string(),
                    selected: selected.clone(),
                    conflicting,
                });
            }
        }
        path
    });

    if !report.is_empty() {
        tracing::warn!("{} version conflicts after resolution", report.len());
    }
    report
}
