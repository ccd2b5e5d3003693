//! Per-iteration bookkeeping of the versions seen for each package id.

use std::collections::{HashMap, HashSet};

use diamond_core::library::package_key;
use diamond_core::version::ComparableVersion;

use crate::graph::GraphItem;

#[derive(Debug, Default)]
struct Entry {
    seen: HashSet<ComparableVersion>,
    ambiguous: bool,
}

/// Records, per package id, the distinct versions met during one outer
/// iteration of the resolver and whether the id sits below an unresolved
/// dispute. Ids are matched ignoring ASCII case.
#[derive(Debug, Default)]
pub struct Tracker {
    entries: HashMap<String, Entry>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate. Adding the same id and version twice is a no-op.
    pub fn track<T>(&mut self, item: &GraphItem<T>) {
        self.entries
            .entry(package_key(&item.key.name))
            .or_default()
            .seen
            .insert(item.key.version.clone());
    }

    /// More than one distinct version of this id has been tracked.
    pub fn is_disputed<T>(&self, item: &GraphItem<T>) -> bool {
        self.entry(item).is_some_and(|e| e.seen.len() > 1)
    }

    /// Flag the whole id, not just this version, as ambiguous.
    pub fn mark_ambiguous<T>(&mut self, item: &GraphItem<T>) {
        self.entries
            .entry(package_key(&item.key.name))
            .or_default()
            .ambiguous = true;
    }

    pub fn is_ambiguous<T>(&self, item: &GraphItem<T>) -> bool {
        self.entry(item).is_some_and(|e| e.ambiguous)
    }

    /// The item's version is at least every version tracked for its id.
    pub fn is_best_version<T>(&self, item: &GraphItem<T>) -> bool {
        self.entry(item)
            .map_or(true, |e| e.seen.iter().all(|v| item.key.version >= *v))
    }

    /// Distinct versions tracked for `id`.
    pub fn versions(&self, id: &str) -> usize {
        self.entries.get(&package_key(id)).map_or(0, |e| e.seen.len())
    }

    pub fn highest(&self, id: &str) -> Option<&ComparableVersion> {
        self.entries.get(&package_key(id)).and_then(|e| e.seen.iter().max())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry<T>(&self, item: &GraphItem<T>) -> Option<&Entry> {
        self.entries.get(&package_key(&item.key.name))
    }
}
