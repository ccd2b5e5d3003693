//! Satisfiability check of a proposed solution against a metadata tree.
//!
//! The tree is read as an AND/OR formula: a registration is satisfied when
//! any of its packages is, and a package is satisfied when it is the chosen
//! version of its id and every one of its dependencies is satisfied.

use std::collections::BTreeMap;
use std::ops::Index;

use diamond_core::library::package_key;
use diamond_core::metadata::{PackageInfo, RegistrationInfo};
use diamond_core::version::ComparableVersion;

/// Chosen version per package id.
///
/// Ids are matched ignoring ASCII case; the first spelling inserted is kept
/// for iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    entries: BTreeMap<String, (String, ComparableVersion)>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version for `id`, returning the version it replaces.
    pub fn insert(&mut self, id: impl Into<String>, version: ComparableVersion) -> Option<ComparableVersion> {
        let id = id.into();
        match self.entries.get_mut(&package_key(&id)) {
            Some((_, existing)) => Some(std::mem::replace(existing, version)),
            None => {
                self.entries.insert(package_key(&id), (id, version));
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ComparableVersion> {
        self.entries.get(&package_key(id)).map(|(_, v)| v)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.entries.contains_key(&package_key(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComparableVersion)> {
        self.entries.values().map(|(id, v)| (id.as_str(), v))
    }
}

impl Index<&str> for Solution {
    type Output = ComparableVersion;

    fn index(&self, id: &str) -> &ComparableVersion {
        match self.get(id) {
            Some(version) => version,
            None => panic!("no version chosen for `{id}`"),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, ComparableVersion)> for Solution {
    fn from_iter<I: IntoIterator<Item = (S, ComparableVersion)>>(iter: I) -> Self {
        let mut solution = Solution::new();
        for (id, version) in iter {
            solution.insert(id, version);
        }
        solution
    }
}

/// Check that `solution` satisfies the tree rooted at `root`.
///
/// The root registration is unconstrained: any of its packages may be the
/// chosen one, whatever the solution maps its id to. Every registration
/// below it must have its id in the solution.
pub fn satisfy(root: &RegistrationInfo, solution: &Solution) -> bool {
    satisfy_registration(root, solution, true)
}

fn satisfy_registration(
    registration: &RegistrationInfo,
    solution: &Solution,
    unconstrained: bool,
) -> bool {
    if registration.is_leaf() {
        return true;
    }

    registration
        .packages
        .iter()
        .any(|package| satisfy_package(&registration.id, package, solution, unconstrained))
}

fn satisfy_package(
    id: &str,
    package: &PackageInfo,
    solution: &Solution,
    unconstrained: bool,
) -> bool {
    let chosen = unconstrained || solution.get(id) == Some(&package.version);
    chosen
        && package
            .dependencies()
            .all(|dep| satisfy_registration(&dep.registration, solution, false))
}
