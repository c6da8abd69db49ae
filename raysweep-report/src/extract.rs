//! Metric Extraction
//!
//! Scrapes scalar metrics out of captured renderer logs. Each `MarkerRule`
//! names a metric and the substring that identifies the line carrying it.
//! Only the first matching line counts; the first decimal literal on that
//! line is the value, rounded to two decimal places.
//!
//! A log without the marker is not an error: the metric reads as `0.0` with
//! `found == false`.

use crate::ReportError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Name of the default metric
pub const TREELETS_PER_RAY: &str = "treelets_per_ray";
/// Marker substring of the default metric
pub const TREELETS_PER_RAY_MARKER: &str = "Average treelets per ray";

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+").expect("decimal literal pattern is valid"));

/// Identifies one metric-bearing line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRule {
    /// Metric name
    pub name: String,
    /// Substring locating the line
    pub marker: String,
}

impl MarkerRule {
    /// New rule
    pub fn new(name: &str, marker: &str) -> Self {
        Self {
            name: name.to_string(),
            marker: marker.to_string(),
        }
    }

    /// `Average treelets per ray` (ray duplication)
    pub fn treelets_per_ray() -> Self {
        Self::new(TREELETS_PER_RAY, TREELETS_PER_RAY_MARKER)
    }
}

/// A named value pulled from a log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name
    pub name: String,
    /// Rounded value, `0.0` when not found
    pub value: f64,
    /// Whether the marker line produced a value
    pub found: bool,
}

impl Metric {
    fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: 0.0,
            found: false,
        }
    }
}

/// Metrics keyed by name
pub type MetricSet = BTreeMap<String, Metric>;

/// Rule-driven log scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricExtractor {
    rules: Vec<MarkerRule>,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new(vec![MarkerRule::treelets_per_ray()])
    }
}

impl MetricExtractor {
    /// Extractor over an explicit rule list
    pub fn new(rules: Vec<MarkerRule>) -> Self {
        Self { rules }
    }

    /// Configured rules
    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }

    /// Name of the first rule, i.e. the metric reported by default
    pub fn primary(&self) -> Option<&str> {
        self.rules.first().map(|r| r.name.as_str())
    }

    /// Apply the rule called `name` to `text`.
    ///
    /// An unknown rule name yields the `0.0` sentinel like an absent marker.
    pub fn extract(&self, name: &str, text: &str) -> Metric {
        match self.rules.iter().find(|r| r.name == name) {
            Some(rule) => scan(rule, text),
            None => Metric::missing(name),
        }
    }

    /// Apply the primary rule to `text`
    pub fn extract_primary(&self, text: &str) -> Option<Metric> {
        self.rules.first().map(|rule| scan(rule, text))
    }

    /// Apply every rule to `text`
    pub fn extract_all(&self, text: &str) -> MetricSet {
        self.rules
            .iter()
            .map(|rule| (rule.name.clone(), scan(rule, text)))
            .collect()
    }

    /// Read `path` and apply every rule.
    ///
    /// A missing file is an error; a file without markers is not.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<MetricSet, ReportError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.extract_all(&text))
    }
}

fn scan(rule: &MarkerRule, text: &str) -> Metric {
    let Some(line) = text.lines().find(|line| line.contains(&rule.marker)) else {
        return Metric::missing(&rule.name);
    };

    let parsed = DECIMAL
        .find(line)
        .and_then(|m| m.as_str().parse::<f64>().ok());

    match parsed {
        Some(value) => Metric {
            name: rule.name.clone(),
            value: round2(value),
            found: true,
        },
        None => {
            tracing::warn!(
                metric = %rule.name,
                line = %line.trim(),
                "marker line has no decimal value"
            );
            Metric::missing(&rule.name)
        }
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
