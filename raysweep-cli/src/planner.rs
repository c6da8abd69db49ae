//! Sweep Planner
//!
//! Selects which configurations of a `ConfigSpace` a sweep visits.
//!
//! Filtering options:
//! - Regex pattern matching on the experiment name
//!
//! Ordering: the configuration space's own nesting order. Configurations are
//! produced lazily, one per step, so each run gets a freshly built value.

use raysweep_core::{ConfigSpace, Configuration, ExperimentName};
use regex::Regex;

/// Execution plan over a configuration space
pub struct SweepPlan<'a> {
    space: &'a ConfigSpace,
    filter: Option<Regex>,
}

impl<'a> SweepPlan<'a> {
    /// Configurations visited, in sweep order
    pub fn iter(&self) -> impl Iterator<Item = Configuration> + '_ {
        self.space.iter().filter(|config| self.selects(config))
    }

    /// Number of configurations visited
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the plan visits nothing
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Underlying space
    pub fn space(&self) -> &'a ConfigSpace {
        self.space
    }

    fn selects(&self, config: &Configuration) -> bool {
        let Some(re) = &self.filter else {
            return true;
        };
        // An unnameable configuration is kept so the runner reports it
        match ExperimentName::for_configuration(config) {
            Ok(name) => re.is_match(name.as_str()),
            Err(_) => true,
        }
    }
}

/// Build execution plan from a configuration space
pub fn build_plan(space: &ConfigSpace, filter: Option<Regex>) -> SweepPlan<'_> {
    SweepPlan { space, filter }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        let space = ConfigSpace::renderer_default();
        let plan = build_plan(&space, None);
        assert_eq!(plan.len(), 3);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_name_filter() {
        let space = ConfigSpace::renderer(
            &["sponza", "hairball"],
            &[256, 1024],
            &[1],
            &[0, 1],
            &[0, 1],
        );
        let plan = build_plan(&space, Some(Regex::new("^Early_.*_Depth1024$").unwrap()));

        let names: Vec<_> = plan
            .iter()
            .map(|c| ExperimentName::for_configuration(&c).unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Early_NoDelay_sponza_Depth1024",
                "Early_Delay_sponza_Depth1024",
                "Early_NoDelay_hairball_Depth1024",
                "Early_Delay_hairball_Depth1024",
            ]
        );
    }

    #[test]
    fn test_filter_matches_nothing() {
        let space = ConfigSpace::renderer_default();
        let plan = build_plan(&space, Some(Regex::new("san-miguel").unwrap()));
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }
}
