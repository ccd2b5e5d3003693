//! Brute-force resolution: enumerate plan combinations and keep the first
//! one the satisfiability check accepts.
//!
//! Combinations are visited in preference order. Every id starts at its
//! highest version and the last id in the plan varies fastest.

use diamond_core::config::SearchConfig;
use diamond_core::metadata::RegistrationInfo;
use diamond_util::errors::DiamondError;

use crate::evaluate::{satisfy, Solution};
use crate::participants::Plan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Solution),
    /// Every combination was evaluated and none satisfied the tree.
    Unsatisfiable { tried: u64 },
    /// The combination limit was reached first.
    BudgetExhausted { tried: u64 },
}

impl SearchOutcome {
    pub fn into_result(self) -> Result<Solution, DiamondError> {
        match self {
            SearchOutcome::Found(solution) => Ok(solution),
            SearchOutcome::Unsatisfiable { tried } => Err(DiamondError::Search {
                message: format!("no combination satisfies the dependency tree ({tried} tried)"),
            }),
            SearchOutcome::BudgetExhausted { tried } => Err(DiamondError::Search {
                message: format!("combination limit reached after {tried} candidates"),
            }),
        }
    }
}

/// Search with the limit from `[search]` configuration.
pub fn exhaustive_with_config(root: &RegistrationInfo, config: &SearchConfig) -> SearchOutcome {
    exhaustive(root, config.max_combinations)
}

pub fn exhaustive(root: &RegistrationInfo, max_combinations: u64) -> SearchOutcome {
    let plan = Plan::from_registration(root);
    tracing::debug!(
        "Searching {} ids, {} combinations",
        plan.len(),
        plan.combinations()
    );
    search_plan(root, &plan, max_combinations)
}

/// Walk the combinations of `plan` in preference order.
pub fn search_plan(root: &RegistrationInfo, plan: &Plan, max_combinations: u64) -> SearchOutcome {
    if plan.entries.iter().any(|(_, versions)| versions.is_empty()) {
        return SearchOutcome::Unsatisfiable { tried: 0 };
    }

    let mut indices = vec![0usize; plan.len()];
    let mut tried = 0u64;

    loop {
        if tried >= max_combinations {
            tracing::warn!("Search stopped after {tried} combinations without a solution");
            return SearchOutcome::BudgetExhausted { tried };
        }

        let solution: Solution = plan
            .entries
            .iter()
            .zip(&indices)
            .map(|((id, versions), &i)| (id.clone(), versions[i].clone()))
            .collect();
        tried += 1;

        if satisfy(root, &solution) {
            tracing::debug!("Found a solution after {tried} combinations");
            return SearchOutcome::Found(solution);
        }

        let mut pos = indices.len();
        loop {
            if pos == 0 {
                return SearchOutcome::Unsatisfiable { tried };
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < plan.entries[pos].1.len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamond_core::metadata::PackageInfo;
    use diamond_core::version::ComparableVersion;

    fn reg(id: &str, packages: Vec<PackageInfo>) -> RegistrationInfo {
        packages
            .into_iter()
            .fold(RegistrationInfo::new(id), |r, p| r.with_package(p))
    }

    #[test]
    fn prefers_highest_versions() {
        let root = reg(
            "root",
            vec![PackageInfo::new("1.0").depends_on(reg(
                "X",
                vec![PackageInfo::new("1.0"), PackageInfo::new("2.0")],
            ))],
        );
        let SearchOutcome::Found(solution) = exhaustive(&root, 100) else {
            panic!("expected a solution");
        };
        assert_eq!(solution["X"], ComparableVersion::parse("2.0"));
    }

    #[test]
    fn backs_off_to_a_compatible_combination() {
        // A 2.0 needs C 2.0, B 1.0 only offers C 1.0; A 1.0 also accepts C 1.0.
        let c = |v: &str| reg("C", vec![PackageInfo::new(v)]);
        let root = reg(
            "root",
            vec![PackageInfo::new("1.0")
                .depends_on(reg(
                    "A",
                    vec![
                        PackageInfo::new("2.0").depends_on(c("2.0")),
                        PackageInfo::new("1.0").depends_on(c("1.0")),
                    ],
                ))
                .depends_on(reg("B", vec![PackageInfo::new("1.0").depends_on(c("1.0"))]))],
        );

        let solution = exhaustive(&root, 100).into_result().unwrap();
        assert_eq!(solution["A"], ComparableVersion::parse("1.0"));
        assert_eq!(solution["C"], ComparableVersion::parse("1.0"));
        assert!(satisfy(&root, &solution));
    }

    #[test]
    fn unsatisfiable_tree() {
        let c = |v: &str| reg("C", vec![PackageInfo::new(v)]);
        let root = reg(
            "root",
            vec![PackageInfo::new("1.0")
                .depends_on(reg("A", vec![PackageInfo::new("1.0").depends_on(c("2.0"))]))
                .depends_on(reg("B", vec![PackageInfo::new("1.0").depends_on(c("1.0"))]))],
        );
        assert_eq!(exhaustive(&root, 100), SearchOutcome::Unsatisfiable { tried: 2 });
        assert!(exhaustive(&root, 100).into_result().is_err());
    }

    #[test]
    fn budget_is_respected() {
        let c = |v: &str| reg("C", vec![PackageInfo::new(v)]);
        let root = reg(
            "root",
            vec![PackageInfo::new("1.0")
                .depends_on(reg("A", vec![PackageInfo::new("1.0").depends_on(c("2.0"))]))
                .depends_on(reg("B", vec![PackageInfo::new("1.0").depends_on(c("1.0"))]))],
        );
        assert_eq!(exhaustive(&root, 1), SearchOutcome::BudgetExhausted { tried: 1 });
        let err = exhaustive(&root, 1).into_result().unwrap_err();
        assert!(err.to_string().contains("combination limit"));
    }
}
