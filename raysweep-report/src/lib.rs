#![warn(missing_docs)]
//! RaySweep Report - Metric Extraction and Reporting
//!
//! Reads the logs a sweep left behind and turns them into:
//! - JSON (machine-readable)
//! - CSV (spreadsheet / plotting input)
//! - Human-readable grids (scene × variant, one table per framebuffer size)

mod csv;
mod extract;
mod human;
mod json;
mod report;

pub use csv::generate_csv_report;
pub use extract::{
    MarkerRule, Metric, MetricExtractor, MetricSet, TREELETS_PER_RAY, TREELETS_PER_RAY_MARKER,
    round2,
};
pub use human::format_grid_report;
pub use json::generate_json_report;
pub use report::{Report, ReportEntry, ReportMeta, ReportSummary, collect_report};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// A log file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be named
    #[error(transparent)]
    Config(#[from] raysweep_core::ConfigError),

    /// JSON rendering failed
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Grid tables for the terminal
    #[default]
    Human,
    /// JSON with full report schema
    Json,
    /// CSV, one row per configuration
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render `report` in `format`
pub fn render_report(report: &Report, format: OutputFormat) -> Result<String, ReportError> {
    Ok(match format {
        OutputFormat::Human => format_grid_report(report),
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Csv => generate_csv_report(report),
    })
}
