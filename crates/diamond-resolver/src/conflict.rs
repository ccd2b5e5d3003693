//! Version conflict reporting.

use std::fmt;

const NODE_ARROW: &str = " -> ";

/// A report of all version conflicts found after resolution.
#[derive(Debug, Default, Clone)]
pub struct ConflictReport {
    pub conflicts: Vec<VersionConflict>,
}

/// A dependency whose range does not admit the version that was accepted
/// for its id elsewhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    pub id: String,
    /// The range the conflicting request asked for.
    pub requested: String,
    pub resolved: String,
    /// Path to the accepted node, root first (`A 1.0`, `B 2.0`, `D 2.0`).
    pub selected: Vec<String>,
    /// Path to the request that the accepted version violates.
    pub conflicting: Vec<String>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: VersionConflict) {
        self.conflicts.push(conflict);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Distinct ids involved in a conflict, in first-seen order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for c in &self.conflicts {
            if !ids.contains(&c.id.as_str()) {
                ids.push(&c.id);
            }
        }
        ids
    }
}

impl VersionConflict {
    pub fn selected_path(&self) -> String {
        self.selected.join(NODE_ARROW)
    }

    pub fn conflicting_path(&self) -> String {
        self.conflicting.join(NODE_ARROW)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} requires {} but {} was selected via {}",
            self.id,
            self.conflicting_path(),
            self.requested,
            self.resolved,
            self.selected_path()
        )
    }
}
