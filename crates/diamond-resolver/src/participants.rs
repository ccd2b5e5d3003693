//! Projection of a metadata tree into per-id candidate lists.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use diamond_core::library::package_key;
use diamond_core::metadata::RegistrationInfo;
use diamond_core::version::ComparableVersion;

/// Every version seen per package id, highest first.
pub type Participants = BTreeMap<String, Vec<ComparableVersion>>;

/// Collect the distinct versions of every id reachable below `root`.
///
/// The root registration itself is not a participant. Ids that differ only
/// in ASCII case are merged under the first spelling met.
pub fn get_participants(root: &RegistrationInfo) -> Participants {
    let mut seen: BTreeMap<String, (String, BTreeSet<ComparableVersion>)> = BTreeMap::new();
    let mut queue: VecDeque<&RegistrationInfo> = VecDeque::new();

    for package in &root.packages {
        queue.extend(package.dependencies().map(|d| &d.registration));
    }

    while let Some(registration) = queue.pop_front() {
        if registration.is_leaf() {
            continue;
        }
        let (_, versions) = seen
            .entry(package_key(&registration.id))
            .or_insert_with(|| (registration.id.clone(), BTreeSet::new()));
        for package in &registration.packages {
            versions.insert(package.version.clone());
            queue.extend(package.dependencies().map(|d| &d.registration));
        }
    }

    seen.into_values()
        .map(|(id, versions)| (id, versions.into_iter().rev().collect()))
        .collect()
}

/// Ordered candidate lists for a combinatorial search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub entries: Vec<(String, Vec<ComparableVersion>)>,
}

impl Plan {
    pub fn from_registration(root: &RegistrationInfo) -> Self {
        Self::from(get_participants(root))
    }

    /// Number of distinct assignments, saturating at `u128::MAX`.
    pub fn combinations(&self) -> u128 {
        self.entries
            .iter()
            .fold(1u128, |acc, (_, versions)| acc.saturating_mul(versions.len() as u128))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<Participants> for Plan {
    fn from(participants: Participants) -> Self {
        Self {
            entries: participants.into_iter().collect(),
        }
    }
}
