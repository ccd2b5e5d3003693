//! Package metadata tree as published by a feed.
//!
//! A [`RegistrationInfo`] lists every candidate version of one package id;
//! each [`PackageInfo`] carries dependency groups whose edges point at the
//! registrations of the dependencies. The tree is read-only input for the
//! satisfiability checker and the participant projection.

use serde::{Deserialize, Serialize};

use crate::version::{ComparableVersion, VersionRange};
use diamond_util::errors::DiamondError;

/// All known candidate versions of one package id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInfo {
    pub id: String,
    #[serde(default)]
    pub packages: Vec<PackageInfo>,
}

/// One concrete version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub version: ComparableVersion,
    #[serde(default)]
    pub dependency_groups: Vec<DependencyGroupInfo>,
}

/// Dependencies declared for one target framework (or for all of them).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroupInfo {
    #[serde(default)]
    pub target_framework: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyInfo>,
}

/// A dependency edge: the requested id and range, plus the registration
/// listing the candidates for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInfo {
    pub id: String,
    #[serde(default)]
    pub range: Option<VersionRange>,
    pub registration: RegistrationInfo,
}

impl RegistrationInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            packages: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: PackageInfo) -> Self {
        self.packages.push(package);
        self
    }

    /// A registration with no candidates places no constraint.
    pub fn is_leaf(&self) -> bool {
        self.packages.is_empty()
    }

    /// Parse a registration tree from its JSON form.
    pub fn from_json(content: &str) -> Result<Self, DiamondError> {
        serde_json::from_str(content).map_err(|e| DiamondError::Metadata {
            message: format!("Failed to parse registration: {e}"),
        })
    }

    pub fn to_json(&self) -> Result<String, DiamondError> {
        serde_json::to_string_pretty(self).map_err(|e| DiamondError::Metadata {
            message: format!("Failed to serialize registration: {e}"),
        })
    }
}

impl PackageInfo {
    pub fn new(version: &str) -> Self {
        Self {
            version: ComparableVersion::parse(version),
            dependency_groups: Vec::new(),
        }
    }

    /// Add a dependency on `registration` to the framework-agnostic group.
    pub fn depends_on(self, registration: RegistrationInfo) -> Self {
        self.depends_on_range(registration, None)
    }

    pub fn depends_on_range(
        mut self,
        registration: RegistrationInfo,
        range: Option<VersionRange>,
    ) -> Self {
        let dependency = DependencyInfo {
            id: registration.id.clone(),
            range,
            registration,
        };
        match self
            .dependency_groups
            .iter_mut()
            .find(|g| g.target_framework.is_none())
        {
            Some(group) => group.dependencies.push(dependency),
            None => self.dependency_groups.push(DependencyGroupInfo {
                target_framework: None,
                dependencies: vec![dependency],
            }),
        }
        self
    }

    pub fn with_group(mut self, group: DependencyGroupInfo) -> Self {
        self.dependency_groups.push(group);
        self
    }

    /// Every dependency across all groups.
    pub fn dependencies(&self) -> impl Iterator<Item = &DependencyInfo> {
        self.dependency_groups
            .iter()
            .flat_map(|g| g.dependencies.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_uses_single_default_group() {
        let pkg = PackageInfo::new("1.0")
            .depends_on(RegistrationInfo::new("B"))
            .depends_on(RegistrationInfo::new("C"));
        assert_eq!(pkg.dependency_groups.len(), 1);
        let ids: Vec<&str> = pkg.dependencies().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["B", "C"]);
    }

    #[test]
    fn leaf_registration() {
        assert!(RegistrationInfo::new("X").is_leaf());
        assert!(!RegistrationInfo::new("X")
            .with_package(PackageInfo::new("1.0"))
            .is_leaf());
    }

    #[test]
    fn parse_json_tree() {
        let json = r#"
{
  "id": "root",
  "packages": [
    {
      "version": "1.0",
      "dependencyGroups": [
        {
          "targetFramework": "net8.0",
          "dependencies": [
            {
              "id": "A",
              "range": "[1.0,2.0)",
              "registration": {
                "id": "A",
                "packages": [{ "version": "1.0" }, { "version": "1.5" }]
              }
            }
          ]
        }
      ]
    }
  ]
}
"#;
        let reg = RegistrationInfo::from_json(json).unwrap();
        assert_eq!(reg.id, "root");
        let dep = reg.packages[0].dependencies().next().unwrap();
        assert_eq!(dep.id, "A");
        assert_eq!(dep.range.as_ref().unwrap().to_string(), "[1.0, 2.0)");
        assert_eq!(dep.registration.packages.len(), 2);
        assert_eq!(
            reg.packages[0].dependency_groups[0].target_framework.as_deref(),
            Some("net8.0")
        );
    }

    #[test]
    fn json_survives_serialization() {
        let reg = RegistrationInfo::new("root").with_package(
            PackageInfo::new("1.0").depends_on_range(
                RegistrationInfo::new("A").with_package(PackageInfo::new("2.0")),
                Some(VersionRange::parse("[2.0]").unwrap()),
            ),
        );
        let json = reg.to_json().unwrap();
        assert_eq!(RegistrationInfo::from_json(&json).unwrap(), reg);
    }

    #[test]
    fn malformed_json_is_metadata_error() {
        let err = RegistrationInfo::from_json("{ \"packages\": [] }").unwrap_err();
        assert!(matches!(err, DiamondError::Metadata { .. }));
    }
}
