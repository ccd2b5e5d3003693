//! Property tests for conflict resolution over generated candidate trees.

use std::collections::{BTreeMap, BTreeSet};

use diamond_core::library::{package_key, Library};
use diamond_core::version::ComparableVersion;
use diamond_resolver::graph::{Disposition, GraphItem, GraphNode};
use diamond_resolver::operations::resolve;
use proptest::prelude::*;

const IDS: [&str; 6] = ["A", "B", "C", "D", "E", "c"];

fn node(name: &str, version: u32) -> GraphNode<()> {
    GraphNode::new(GraphItem::new(Library::new(name, &format!("{version}.0")), ()))
}

/// Strategy for small trees below a fixed `root 1.0` node.
fn tree_strategy() -> impl Strategy<Value = GraphNode<()>> {
    let leaf = (0..IDS.len(), 1..4u32).prop_map(|(id, v)| node(IDS[id], v));
    let subtree = leaf.prop_recursive(4, 48, 3, |inner| {
        (0..IDS.len(), 1..4u32, prop::collection::vec(inner, 0..4)).prop_map(|(id, v, children)| {
            children.into_iter().fold(node(IDS[id], v), |n, c| n.with_child(c))
        })
    });
    prop::collection::vec(subtree, 0..4)
        .prop_map(|children| children.into_iter().fold(node("root", 1), |n, c| n.with_child(c)))
}

fn dispositions(root: &GraphNode<()>) -> Vec<Disposition> {
    root.iter().map(|n| n.disposition()).collect()
}

proptest! {
    /// A resolved tree accepts exactly one version per accepted id, ignoring case
    #[test]
    fn one_version_per_accepted_id(mut root in tree_strategy()) {
        if !resolve(&mut root, 100).resolved {
            return Ok(());
        }

        let mut accepted: BTreeMap<String, BTreeSet<&ComparableVersion>> = BTreeMap::new();
        for n in root.iter().filter(|n| n.disposition() == Disposition::Accepted) {
            accepted.entry(package_key(n.id())).or_default().insert(&n.library().version);
        }
        for (id, versions) in &accepted {
            prop_assert_eq!(versions.len(), 1, "{} accepted more than once", id);
        }
    }

    /// Decided nodes keep their disposition across iterations
    #[test]
    fn decisions_are_final(mut root in tree_strategy()) {
        let mut before = dispositions(&root);
        for _ in 0..20 {
            let step = resolve(&mut root, 1);
            let after = dispositions(&root);
            for (old, new) in before.iter().zip(&after) {
                if *old != Disposition::Acceptable {
                    prop_assert_eq!(old, new);
                }
            }
            if step.iterations == 0 {
                break;
            }
            before = after;
        }
    }

    /// Resolving an already resolved tree is a no-op
    #[test]
    fn resolution_is_idempotent(mut root in tree_strategy()) {
        if !resolve(&mut root, 100).resolved {
            return Ok(());
        }
        let snapshot = dispositions(&root);

        let second = resolve(&mut root, 100);
        prop_assert!(second.resolved);
        prop_assert_eq!(second.iterations, 0);
        prop_assert_eq!(snapshot, dispositions(&root));
    }

    /// The root is always accepted in the first iteration
    #[test]
    fn root_is_accepted(mut root in tree_strategy()) {
        resolve(&mut root, 1);
        prop_assert_eq!(root.disposition(), Disposition::Accepted);
    }
}
