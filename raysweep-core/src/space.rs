//! Configuration Space
//!
//! Enumerates the Cartesian product of parameter domains in a fixed nesting
//! order (first domain outermost, last domain innermost), skipping any
//! combination matched by a declared `ExclusionRule`.
//!
//! ```text
//! domains:  framebuffer_size × scene_name × traversal_scheme × use_early × hit_delay
//!                  │
//!                  ▼
//!            odometer over value indices
//!                  │
//!                  ▼
//!     Configuration (field_order) ──► ExclusionRule? ──► yielded / skipped
//! ```

use crate::configuration::{
    Configuration, FRAMEBUFFER_HEIGHT, FRAMEBUFFER_WIDTH, HIT_DELAY, ParamValue, REQUIRED_FIELDS,
    SCENE_NAME, TRAVERSAL_SCHEME, USE_EARLY,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Axis name for the square framebuffer size (drives width and height)
pub const FRAMEBUFFER_SIZE: &str = "framebuffer_size";

/// Structural problems in a `ConfigSpace` declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpaceError {
    /// Axis assigns a key missing from `field_order`
    #[error("Domain '{domain}' assigns unknown field '{key}'")]
    UnknownKey { domain: String, key: String },

    /// Two axes assign the same key
    #[error("Field '{0}' is assigned by more than one domain")]
    DuplicateKey(String),

    /// A field no axis assigns
    #[error("Field '{0}' is not assigned by any domain")]
    UnassignedField(String),

    /// Rule condition on a key missing from `field_order`
    #[error("Exclusion rule '{rule}' references unknown field '{key}'")]
    UnknownRuleKey { rule: String, key: String },

    /// Axis repeats a value
    #[error("Domain '{domain}' lists value '{value}' more than once")]
    DuplicateValue { domain: String, value: ParamValue },

    /// Early-exit or hit-delay value other than 0 or 1
    #[error("Flag field '{field}' only accepts 0 or 1, got '{value}'")]
    InvalidFlag { field: String, value: ParamValue },
}

/// One sweep axis: a name, the configuration keys it assigns, and its values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDomain {
    /// Axis name
    pub name: String,
    /// Configuration keys set from this axis (usually just `name`)
    pub keys: Vec<String>,
    /// Admissible values, in sweep order
    pub values: Vec<ParamValue>,
}

impl ParameterDomain {
    /// Axis that assigns a single key of the same name
    pub fn new<V: Into<ParamValue>>(name: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::binding(name, [name], values)
    }

    /// Axis whose value is copied into several keys
    pub fn binding<K: AsRef<str>, V: Into<ParamValue>>(
        name: &str,
        keys: impl IntoIterator<Item = K>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.to_string(),
            keys: keys.into_iter().map(|k| k.as_ref().to_string()).collect(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A singleton domain behaves as a constant
    pub fn is_constant(&self) -> bool {
        self.values.len() == 1
    }
}

/// Declared predicate removing combinations from the sweep.
///
/// A configuration is excluded when every `key = value` condition matches.
/// A rule with no conditions excludes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRule {
    /// Rule identifier, used in logs
    pub name: String,
    /// Conditions that must all hold for exclusion
    #[serde(default)]
    pub when: BTreeMap<String, ParamValue>,
}

impl ExclusionRule {
    /// Empty rule
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            when: BTreeMap::new(),
        }
    }

    /// Add a condition
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.when.insert(key.to_string(), value.into());
        self
    }

    /// Hit-delay is only meaningful with early-exit: `use_early = 0, hit_delay = 1` is skipped.
    pub fn hit_delay_requires_early_exit() -> Self {
        Self::new("hit-delay-requires-early-exit")
            .with(USE_EARLY, 0)
            .with(HIT_DELAY, 1)
    }

    /// Whether this rule removes `config`
    pub fn excludes(&self, config: &Configuration) -> bool {
        !self.when.is_empty()
            && self
                .when
                .iter()
                .all(|(key, value)| config.get(key) == Some(value))
    }
}

fn is_flag_value(value: &ParamValue) -> bool {
    matches!(value, ParamValue::Int(0) | ParamValue::Int(1))
}

/// Declared sweep: field order, nested domains, and exclusion rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSpace {
    /// Key order of every yielded configuration
    pub field_order: Vec<String>,
    /// Domains, outermost first
    pub domains: Vec<ParameterDomain>,
    /// Combinations matching any rule are never yielded
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,
}

impl ConfigSpace {
    /// Space with no exclusion rules
    pub fn new(field_order: &[&str], domains: Vec<ParameterDomain>) -> Self {
        Self {
            field_order: field_order.iter().map(|s| s.to_string()).collect(),
            domains,
            exclusions: Vec::new(),
        }
    }

    /// Append an exclusion rule
    pub fn with_exclusion(mut self, rule: ExclusionRule) -> Self {
        self.exclusions.push(rule);
        self
    }

    /// Standard renderer sweep.
    ///
    /// Nesting is size, scene, scheme, early-exit, hit-delay; the size axis
    /// sets both framebuffer dimensions. The hit-delay rule is always applied.
    pub fn renderer<S: AsRef<str>>(
        scenes: &[S],
        sizes: &[i64],
        schemes: &[i64],
        early: &[i64],
        delay: &[i64],
    ) -> Self {
        let domains = vec![
            ParameterDomain::binding(
                FRAMEBUFFER_SIZE,
                [FRAMEBUFFER_WIDTH, FRAMEBUFFER_HEIGHT],
                sizes.iter().copied(),
            ),
            ParameterDomain::new(SCENE_NAME, scenes.iter().map(|s| s.as_ref())),
            ParameterDomain::new(TRAVERSAL_SCHEME, schemes.iter().copied()),
            ParameterDomain::new(USE_EARLY, early.iter().copied()),
            ParameterDomain::new(HIT_DELAY, delay.iter().copied()),
        ];
        Self::new(&REQUIRED_FIELDS, domains)
            .with_exclusion(ExclusionRule::hit_delay_requires_early_exit())
    }

    /// Default sweep: sponza at 256, depth-first, all early/delay variants.
    pub fn renderer_default() -> Self {
        Self::renderer(&["sponza"], &[256], &[1], &[0, 1], &[0, 1])
    }

    /// Check that domains and rules line up with `field_order`.
    ///
    /// Values within a domain must be distinct. The early-exit and hit-delay
    /// axes may only hold `0` or `1`.
    pub fn validate(&self) -> Result<(), SpaceError> {
        let mut assigned: HashMap<&str, &str> = HashMap::new();
        for domain in &self.domains {
            let mut seen = HashSet::new();
            if let Some(value) = domain.values.iter().find(|v| !seen.insert(*v)) {
                return Err(SpaceError::DuplicateValue {
                    domain: domain.name.clone(),
                    value: value.clone(),
                });
            }
            if let Some(field) = domain
                .keys
                .iter()
                .find(|k| k.as_str() == USE_EARLY || k.as_str() == HIT_DELAY)
            {
                if let Some(value) = domain.values.iter().find(|v| !is_flag_value(v)) {
                    return Err(SpaceError::InvalidFlag {
                        field: field.clone(),
                        value: value.clone(),
                    });
                }
            }
            for key in &domain.keys {
                if !self.field_order.contains(key) {
                    return Err(SpaceError::UnknownKey {
                        domain: domain.name.clone(),
                        key: key.clone(),
                    });
                }
                if assigned.insert(key, &domain.name).is_some() {
                    return Err(SpaceError::DuplicateKey(key.clone()));
                }
            }
        }
        if let Some(field) = self
            .field_order
            .iter()
            .find(|f| !assigned.contains_key(f.as_str()))
        {
            return Err(SpaceError::UnassignedField(field.clone()));
        }
        for rule in &self.exclusions {
            if let Some(key) = rule.when.keys().find(|k| !self.field_order.contains(k)) {
                return Err(SpaceError::UnknownRuleKey {
                    rule: rule.name.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Size of the raw product, before exclusions
    pub fn len_unfiltered(&self) -> usize {
        self.domains.iter().map(|d| d.values.len()).product()
    }

    /// First rule that excludes `config`, if any
    pub fn excluded_by(&self, config: &Configuration) -> Option<&ExclusionRule> {
        self.exclusions.iter().find(|r| r.excludes(config))
    }

    /// Iterate admissible configurations in stable nesting order
    pub fn iter(&self) -> ConfigIter<'_> {
        ConfigIter {
            space: self,
            indices: vec![0; self.domains.len()],
            done: self.domains.iter().any(|d| d.values.is_empty()),
        }
    }

    fn build(&self, indices: &[usize]) -> Configuration {
        let mut by_key: HashMap<&str, &ParamValue> = HashMap::new();
        for (domain, &idx) in self.domains.iter().zip(indices) {
            for key in &domain.keys {
                by_key.insert(key, &domain.values[idx]);
            }
        }
        Configuration::from_fields(self.field_order.iter().filter_map(|key| {
            by_key
                .get(key.as_str())
                .map(|value| (key.clone(), (*value).clone()))
        }))
    }
}

impl<'a> IntoIterator for &'a ConfigSpace {
    type Item = Configuration;
    type IntoIter = ConfigIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a `ConfigSpace`
#[derive(Debug, Clone)]
pub struct ConfigIter<'a> {
    space: &'a ConfigSpace,
    indices: Vec<usize>,
    done: bool,
}

impl ConfigIter<'_> {
    /// Step the odometer; innermost domain moves fastest.
    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.space.domains[pos].values.len() {
                return;
            }
            self.indices[pos] = 0;
        }
        self.done = true;
    }
}

impl Iterator for ConfigIter<'_> {
    type Item = Configuration;

    fn next(&mut self) -> Option<Configuration> {
        while !self.done {
            let config = self.space.build(&self.indices);
            self.advance();
            if self.space.excluded_by(&config).is_none() {
                return Some(config);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sweep_skips_delay_without_early() {
        let space = ConfigSpace::renderer_default();
        assert_eq!(space.len_unfiltered(), 4);

        let configs: Vec<_> = space.iter().collect();
        assert_eq!(configs.len(), 3);
        for config in &configs {
            let early = config.flag(USE_EARLY).unwrap();
            let delay = config.flag(HIT_DELAY).unwrap();
            assert!(early || !delay);
        }
    }

    #[test]
    fn test_nesting_order() {
        let space = ConfigSpace::renderer(&["a", "b"], &[256, 1024], &[0], &[1], &[0]);
        let order: Vec<_> = space
            .iter()
            .map(|c| {
                (
                    c.int(FRAMEBUFFER_WIDTH).unwrap(),
                    c.text(SCENE_NAME).unwrap(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                (256, "a".to_string()),
                (256, "b".to_string()),
                (1024, "a".to_string()),
                (1024, "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_enumeration_is_stable() {
        let space = ConfigSpace::renderer(
            &["sponza", "san-miguel", "hairball"],
            &[256, 1024],
            &[0, 1],
            &[0, 1],
            &[0, 1],
        );
        let first: Vec<_> = space.iter().collect();
        let second: Vec<_> = space.iter().collect();
        assert_eq!(first, second);
        // 3 scenes * 2 sizes * 2 schemes * 3 admissible early/delay pairs
        assert_eq!(first.len(), 36);
    }

    #[test]
    fn test_size_axis_sets_both_dimensions() {
        let space = ConfigSpace::renderer(&["sponza"], &[512], &[0], &[0], &[0]);
        let config = space.iter().next().unwrap();
        assert_eq!(config.int(FRAMEBUFFER_WIDTH).unwrap(), 512);
        assert_eq!(config.int(FRAMEBUFFER_HEIGHT).unwrap(), 512);
        let keys: Vec<_> = config.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, REQUIRED_FIELDS);
    }

    #[test]
    fn test_empty_domain_yields_nothing() {
        let space = ConfigSpace::renderer::<&str>(&[], &[256], &[0], &[0, 1], &[0, 1]);
        assert_eq!(space.iter().count(), 0);
    }

    #[test]
    fn test_extra_exclusion_rule() {
        let space = ConfigSpace::renderer_default().with_exclusion(
            ExclusionRule::new("no-plain-early")
                .with(USE_EARLY, 1)
                .with(HIT_DELAY, 0),
        );
        let configs: Vec<_> = space.iter().collect();
        assert_eq!(configs.len(), 2);
        assert!(configs.iter().all(|c| space.excluded_by(c).is_none()));
    }

    #[test]
    fn test_empty_rule_excludes_nothing() {
        let space = ConfigSpace::renderer_default().with_exclusion(ExclusionRule::new("noop"));
        assert_eq!(space.iter().count(), 3);
    }

    #[test]
    fn test_validate() {
        assert!(ConfigSpace::renderer_default().validate().is_ok());

        let missing = ConfigSpace::new(
            &[SCENE_NAME, FRAMEBUFFER_WIDTH],
            vec![ParameterDomain::new(SCENE_NAME, ["sponza"])],
        );
        assert_eq!(
            missing.validate(),
            Err(SpaceError::UnassignedField(FRAMEBUFFER_WIDTH.to_string()))
        );

        let unknown = ConfigSpace::renderer_default()
            .with_exclusion(ExclusionRule::new("typo").with("use_erly", 0));
        assert!(matches!(
            unknown.validate(),
            Err(SpaceError::UnknownRuleKey { .. })
        ));

        let duplicate = ConfigSpace::new(
            &[SCENE_NAME],
            vec![
                ParameterDomain::new(SCENE_NAME, ["a"]),
                ParameterDomain::new(SCENE_NAME, ["b"]),
            ],
        );
        assert_eq!(
            duplicate.validate(),
            Err(SpaceError::DuplicateKey(SCENE_NAME.to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_repeated_values() {
        let space = ConfigSpace::renderer(&["sponza", "sponza"], &[256], &[1], &[0, 1], &[0, 1]);
        assert_eq!(
            space.validate(),
            Err(SpaceError::DuplicateValue {
                domain: SCENE_NAME.to_string(),
                value: ParamValue::from("sponza"),
            })
        );

        let sizes = ConfigSpace::renderer(&["sponza"], &[256, 256], &[1], &[0], &[0]);
        assert!(matches!(
            sizes.validate(),
            Err(SpaceError::DuplicateValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_binary_flags() {
        // 2 would name as "Delay" yet slip past the hit-delay rule
        let space = ConfigSpace::renderer(&["sponza"], &[256], &[1], &[0, 2], &[0, 2]);
        assert_eq!(
            space.validate(),
            Err(SpaceError::InvalidFlag {
                field: USE_EARLY.to_string(),
                value: ParamValue::Int(2),
            })
        );

        let delay = ConfigSpace::renderer(&["sponza"], &[256], &[1], &[0, 1], &[0, 2]);
        assert!(matches!(
            delay.validate(),
            Err(SpaceError::InvalidFlag { ref field, .. }) if field == HIT_DELAY
        ));
    }
}
