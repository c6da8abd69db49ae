//! Report Data Structures
//!
//! A `Report` is built from persisted logs only: the configuration space is
//! re-enumerated, each configuration is named, and the matching
//! `<name>_log.txt` is scanned. Nothing is re-run.

use crate::ReportError;
use crate::extract::{Metric, MetricExtractor};
use chrono::{DateTime, Utc};
use raysweep_core::{
    ConfigSpace, Configuration, ExperimentName, FRAMEBUFFER_WIDTH, HIT_DELAY, SCENE_NAME,
    TRAVERSAL_SCHEME, USE_EARLY,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete metric report for one output directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub entries: Vec<ReportEntry>,
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// Directory the logs were read from
    pub log_directory: String,
    /// Metric shown in the grid
    pub metric: String,
}

/// One configuration's extracted metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub name: ExperimentName,
    pub scene: String,
    pub framebuffer_width: i64,
    pub traversal_scheme: i64,
    pub use_early: bool,
    pub hit_delay: bool,
    /// Path of the scanned stdout capture
    pub log_file: String,
    /// Whether the log file existed
    pub log_present: bool,
    pub metrics: Vec<Metric>,
}

impl ReportEntry {
    /// Value of `metric`, `0.0` when absent
    pub fn value(&self, metric: &str) -> f64 {
        self.metrics
            .iter()
            .find(|m| m.name == metric)
            .map(|m| m.value)
            .unwrap_or(0.0)
    }

    /// Column label shared by every scene: `{Early}_{Delay}_{Scheme}`
    pub fn variant_label(&self) -> String {
        format!(
            "{}_{}_{}",
            if self.use_early { "Early" } else { "NoEarly" },
            if self.hit_delay { "Delay" } else { "NoDelay" },
            if self.traversal_scheme == 0 {
                "Breadth"
            } else {
                "Depth"
            }
        )
    }
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_configurations: usize,
    pub with_metric: usize,
    pub missing_marker: usize,
    pub missing_log: usize,
}

impl ReportSummary {
    /// Tally entries by whether their log and primary marker were found
    pub fn from_entries(entries: &[ReportEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            summary.total_configurations += 1;
            if !entry.log_present {
                summary.missing_log += 1;
            } else if entry.metrics.first().is_some_and(|m| m.found) {
                summary.with_metric += 1;
            } else {
                summary.missing_marker += 1;
            }
        }
        summary
    }
}

impl Report {
    /// Keep only entries matching `keep`, recomputing the summary
    pub fn retain(&mut self, keep: impl FnMut(&ReportEntry) -> bool) {
        self.entries.retain(keep);
        self.summary = ReportSummary::from_entries(&self.entries);
    }
}

/// Scan `log_dir` for every configuration of `space`.
///
/// A missing log file is recorded in the summary rather than failing the
/// report; an incomplete configuration fails it.
pub fn collect_report(
    space: &ConfigSpace,
    log_dir: impl AsRef<Path>,
    extractor: &MetricExtractor,
) -> Result<Report, ReportError> {
    let log_dir = log_dir.as_ref();
    let entries = space
        .iter()
        .map(|config| collect_entry(&config, log_dir, extractor))
        .collect::<Result<Vec<_>, _>>()?;
    let summary = ReportSummary::from_entries(&entries);

    tracing::debug!(
        total = summary.total_configurations,
        missing_log = summary.missing_log,
        "collected report"
    );

    Ok(Report {
        meta: ReportMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            log_directory: log_dir.display().to_string(),
            metric: extractor.primary().unwrap_or_default().to_string(),
        },
        entries,
        summary,
    })
}

fn collect_entry(
    config: &Configuration,
    log_dir: &Path,
    extractor: &MetricExtractor,
) -> Result<ReportEntry, ReportError> {
    let name = ExperimentName::for_configuration(config)?;
    let log_path = name.log_path(log_dir);

    let (log_present, metrics): (bool, Vec<Metric>) = match extractor.extract_file(&log_path) {
        Ok(set) => (true, set.into_values().collect()),
        Err(ReportError::Io { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::warn!(log = %log_path.display(), "log file not found");
            (false, Vec::new())
        }
        Err(e) => return Err(e),
    };

    // Keep rule order so the primary metric comes first
    let metrics = order_like(extractor, metrics);

    Ok(ReportEntry {
        scene: config.text(SCENE_NAME)?,
        framebuffer_width: config.int(FRAMEBUFFER_WIDTH)?,
        traversal_scheme: config.int(TRAVERSAL_SCHEME)?,
        use_early: config.flag(USE_EARLY)?,
        hit_delay: config.flag(HIT_DELAY)?,
        log_file: log_path.display().to_string(),
        log_present,
        metrics,
        name,
    })
}

fn order_like(extractor: &MetricExtractor, mut metrics: Vec<Metric>) -> Vec<Metric> {
    let rank = |m: &Metric| {
        extractor
            .rules()
            .iter()
            .position(|r| r.name == m.name)
            .unwrap_or(usize::MAX)
    };
    metrics.sort_by_key(rank);
    metrics
}
