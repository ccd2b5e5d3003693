use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::{ComparableVersion, VersionRange};

/// Lookup key for a package id. Ids are matched ignoring ASCII case.
pub fn package_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// The `(id, version)` identity of a package.
///
/// Ordering is by name first, then version. The derived comparisons keep
/// the spelling; resolver bookkeeping goes through [`package_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    pub version: ComparableVersion,
}

impl Library {
    pub fn new(name: impl Into<String>, version: &str) -> Self {
        Self {
            name: name.into(),
            version: ComparableVersion::parse(version),
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// A request for a package: an id plus the versions it accepts.
///
/// `range: None` accepts any version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRange {
    pub name: String,
    #[serde(default)]
    pub range: Option<VersionRange>,
}

impl LibraryRange {
    pub fn new(name: impl Into<String>, range: Option<VersionRange>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    pub fn allows(&self, version: &ComparableVersion) -> bool {
        self.range.as_ref().map_or(true, |r| r.satisfies(version))
    }
}

impl fmt::Display for LibraryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range {
            Some(range) => write!(f, "{} ({range})", self.name),
            None => f.write_str(&self.name),
        }
    }
}
