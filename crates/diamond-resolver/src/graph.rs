//! Candidate tree model and breadth-first traversal.
//!
//! The tree is a flattened DAG: the same package id may appear at unrelated
//! positions, once per candidate version, and every node owns its subtree.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};

use diamond_core::library::{package_key, Library, LibraryRange};
use diamond_core::metadata::{PackageInfo, RegistrationInfo};

use crate::evaluate::Solution;

/// Resolution verdict for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Disposition {
    #[default]
    Acceptable,
    Accepted,
    Rejected,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Disposition::Acceptable => "acceptable",
            Disposition::Accepted => "accepted",
            Disposition::Rejected => "rejected",
        })
    }
}

/// A candidate: library identity plus caller-supplied payload.
///
/// Equality and hashing only look at `key`.
#[derive(Debug, Clone)]
pub struct GraphItem<T> {
    pub key: Library,
    pub data: T,
}

impl<T> GraphItem<T> {
    pub fn new(key: Library, data: T) -> Self {
        Self { key, data }
    }
}

impl<T> PartialEq for GraphItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for GraphItem<T> {}

impl<T> Hash for GraphItem<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// A position in the candidate tree.
#[derive(Debug, Clone)]
pub struct GraphNode<T> {
    /// The request that produced this node.
    pub key: LibraryRange,
    pub item: GraphItem<T>,
    pub children: Vec<GraphNode<T>>,
    disposition: Disposition,
}

impl<T> GraphNode<T> {
    /// A node requested with no range constraint.
    pub fn new(item: GraphItem<T>) -> Self {
        let key = LibraryRange::new(item.key.name.clone(), None);
        Self::with_key(key, item)
    }

    pub fn with_key(key: LibraryRange, item: GraphItem<T>) -> Self {
        Self {
            key,
            item,
            children: Vec::new(),
            disposition: Disposition::Acceptable,
        }
    }

    pub fn with_child(mut self, child: GraphNode<T>) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: GraphNode<T>) {
        self.children.push(child);
    }

    pub fn id(&self) -> &str {
        &self.item.key.name
    }

    pub fn library(&self) -> &Library {
        &self.item.key
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Mark the node accepted. Only an `Acceptable` node changes.
    pub fn accept(&mut self) -> bool {
        self.transition(Disposition::Accepted)
    }

    /// Mark the node rejected. Only an `Acceptable` node changes.
    pub fn reject(&mut self) -> bool {
        self.transition(Disposition::Rejected)
    }

    fn transition(&mut self, to: Disposition) -> bool {
        if self.disposition != Disposition::Acceptable {
            return false;
        }
        self.disposition = to;
        true
    }

    /// Breadth-first iterator over this node and all descendants.
    pub fn iter(&self) -> BreadthFirst<'_, T> {
        BreadthFirst {
            queue: VecDeque::from([self]),
        }
    }

    /// Follow a chain of child ids, taking the first match at each step.
    /// Ids match ignoring ASCII case.
    pub fn path(&self, ids: &[&str]) -> Option<&GraphNode<T>> {
        let mut node = self;
        for id in ids {
            node = node.children.iter().find(|c| c.id().eq_ignore_ascii_case(id))?;
        }
        Some(node)
    }

    pub fn path_mut(&mut self, ids: &[&str]) -> Option<&mut GraphNode<T>> {
        let mut node = self;
        for id in ids {
            node = node.children.iter_mut().find(|c| c.id().eq_ignore_ascii_case(id))?;
        }
        Some(node)
    }

    /// Id and version of every accepted node.
    pub fn accepted_solution(&self) -> Solution {
        self.iter()
            .filter(|n| n.disposition == Disposition::Accepted)
            .map(|n| (n.id().to_string(), n.item.key.version.clone()))
            .collect()
    }

    /// Build the metadata tree equivalent to this candidate tree.
    ///
    /// Children sharing an id (ignoring case) become one dependency whose
    /// registration lists each sibling candidate as a package.
    pub fn to_registration(&self) -> RegistrationInfo {
        RegistrationInfo::new(self.id()).with_package(self.to_package())
    }

    fn to_package(&self) -> PackageInfo {
        let mut grouped: BTreeMap<String, Vec<&GraphNode<T>>> = BTreeMap::new();
        for child in &self.children {
            grouped.entry(package_key(child.id())).or_default().push(child);
        }

        let mut package = PackageInfo::new(&self.item.key.version.original);
        for candidates in grouped.into_values() {
            let Some(first) = candidates.first() else {
                continue;
            };
            let mut registration = RegistrationInfo::new(first.id());
            for candidate in &candidates {
                registration = registration.with_package(candidate.to_package());
            }
            let range = first.key.range.clone();
            package = package.depends_on_range(registration, range);
        }
        package
    }
}

/// Queue-based breadth-first walk over a borrowed tree.
pub struct BreadthFirst<'a, T> {
    queue: VecDeque<&'a GraphNode<T>>,
}

impl<'a, T> Iterator for BreadthFirst<'a, T> {
    type Item = &'a GraphNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children.iter());
        Some(node)
    }
}

/// Breadth-first fold with a per-path accumulator.
///
/// `visit` receives each node with the state produced by its parent (or
/// `seed` for the root) and returns the state handed to the node's children.
///
/// There is no early exit. A visitor prunes by returning a state that its
/// calls for the descendants treat as terminal, so every node of a pruned
/// subtree is still dequeued and visited on each walk:
///
/// ```
/// use diamond_core::library::Library;
/// use diamond_resolver::graph::{for_each_with_state, GraphItem, GraphNode};
///
/// let leaf = |name: &str| GraphNode::new(GraphItem::new(Library::new(name, "1.0"), ()));
/// let mut root = leaf("root").with_child(leaf("skip").with_child(leaf("below")));
///
/// let mut calls = 0;
/// let mut kept: Vec<String> = Vec::new();
/// for_each_with_state(&mut root, true, &mut kept, |n, live, kept: &mut Vec<String>| {
///     calls += 1;
///     if !live || n.id() == "skip" {
///         return false;
///     }
///     kept.push(n.id().to_string());
///     true
/// });
/// assert_eq!(kept, ["root"]);
/// assert_eq!(calls, 3);
/// ```
pub fn for_each_with_state<T, S, C, F>(root: &mut GraphNode<T>, seed: S, context: &mut C, mut visit: F)
where
    S: Clone,
    F: FnMut(&mut GraphNode<T>, S, &mut C) -> S,
{
    let mut queue: VecDeque<(&mut GraphNode<T>, S)> = VecDeque::new();
    queue.push_back((root, seed));
    while let Some((node, state)) = queue.pop_front() {
        let inner = visit(&mut *node, state, context);
        for child in node.children.iter_mut() {
            queue.push_back((child, inner.clone()));
        }
    }
}

/// Read-only counterpart of [`for_each_with_state`].
pub fn walk_with_state<T, S, F>(root: &GraphNode<T>, seed: S, mut visit: F)
where
    S: Clone,
    F: FnMut(&GraphNode<T>, &S) -> S,
{
    let mut queue: VecDeque<(&GraphNode<T>, S)> = VecDeque::new();
    queue.push_back((root, seed));
    while let Some((node, state)) = queue.pop_front() {
        let inner = visit(node, &state);
        for child in &node.children {
            queue.push_back((child, inner.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, version: &str) -> GraphNode<()> {
        GraphNode::new(GraphItem::new(Library::new(name, version), ()))
    }

    #[test]
    fn items_compare_by_key_only() {
        let a = GraphItem::new(Library::new("A", "1.0"), "first");
        let b = GraphItem::new(Library::new("A", "1.0.0"), "second");
        assert_eq!(a, b);
    }

    #[test]
    fn disposition_transitions_are_one_way() {
        let mut n = node("A", "1.0");
        assert_eq!(n.disposition(), Disposition::Acceptable);
        assert!(n.accept());
        assert!(!n.reject());
        assert_eq!(n.disposition(), Disposition::Accepted);

        let mut m = node("B", "1.0");
        assert!(m.reject());
        assert!(!m.accept());
        assert_eq!(m.disposition(), Disposition::Rejected);
    }

    #[test]
    fn breadth_first_order() {
        let tree = node("root", "1.0")
            .with_child(node("A", "1.0").with_child(node("C", "1.0")))
            .with_child(node("B", "1.0"));
        let order: Vec<&str> = tree.iter().map(|n| n.id()).collect();
        assert_eq!(order, ["root", "A", "B", "C"]);
    }

    #[test]
    fn path_lookup() {
        let mut tree = node("root", "1.0")
            .with_child(node("A", "1.0").with_child(node("C", "1.0")))
            .with_child(node("B", "1.0").with_child(node("C", "2.0")));
        assert_eq!(tree.path(&["B", "C"]).unwrap().library().to_string(), "C 2.0");
        assert!(tree.path(&["A", "B"]).is_none());
        assert_eq!(tree.path(&[]).unwrap().id(), "root");

        tree.path_mut(&["A", "C"]).unwrap().reject();
        assert_eq!(tree.path(&["A", "C"]).unwrap().disposition(), Disposition::Rejected);
        assert_eq!(tree.path(&["b", "c"]).unwrap().library().to_string(), "C 2.0");
    }

    #[test]
    fn registration_groups_ids_ignoring_case() {
        let tree = node("root", "1.0")
            .with_child(node("Newtonsoft.Json", "12.0"))
            .with_child(node("newtonsoft.json", "13.0"));
        let reg = tree.to_registration();
        let deps: Vec<_> = reg.packages[0].dependencies().collect();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id, "Newtonsoft.Json");
        assert_eq!(deps[0].registration.packages.len(), 2);
    }

    #[test]
    fn state_flows_from_parent_to_children() {
        let mut tree = node("root", "1.0")
            .with_child(node("A", "1.0").with_child(node("C", "1.0")))
            .with_child(node("B", "1.0"));
        let mut depths: Vec<(String, usize)> = Vec::new();
        for_each_with_state(&mut tree, 0usize, &mut depths, |node, depth, seen| {
            seen.push((node.id().to_string(), depth));
            depth + 1
        });
        assert_eq!(
            depths,
            [
                ("root".to_string(), 0),
                ("A".to_string(), 1),
                ("B".to_string(), 1),
                ("C".to_string(), 2)
            ]
        );
    }

    #[test]
    fn registration_groups_sibling_candidates() {
        let tree = node("root", "1.0")
            .with_child(node("C", "1.0"))
            .with_child(node("C", "2.0"))
            .with_child(node("D", "1.0"));
        let reg = tree.to_registration();
        assert_eq!(reg.id, "root");
        let deps: Vec<_> = reg.packages[0].dependencies().collect();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].id, "C");
        assert_eq!(deps[0].registration.packages.len(), 2);
        assert_eq!(deps[1].registration.packages.len(), 1);
    }
}
