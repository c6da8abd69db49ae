#![warn(missing_docs)]
//! # RaySweep
//!
//! Benchmark sweep harness for an external ray-tracing renderer.
//!
//! RaySweep enumerates renderer configurations, runs the renderer once per
//! configuration, and captures each run's output for later analysis:
//! - **Configuration Space**: Cartesian product of parameter domains with declared exclusion rules
//! - **Deterministic Naming**: `Early_NoDelay_sponza_Depth256` labels double as log file stems
//! - **Process Capture**: stdout and stderr persisted per run, even on crash or launch failure
//! - **Metric Extraction**: marker lines such as `Average treelets per ray` read back from logs
//! - **Reports**: human grid, JSON, and CSV output
//!
//! ## Quick Start
//!
//! ```ignore
//! use raysweep::prelude::*;
//!
//! let space = ConfigSpace::renderer(&["sponza"], &[256, 1024], &[1], &[0, 1], &[0, 1]);
//! let runner = Runner::new("./Arches-v2", "results", MissingBinaryPolicy::Warn);
//! for config in &space {
//!     let record = runner.run(&config)?;
//!     println!("{} -> {:?}", record.name, record.outcome);
//! }
//!
//! let report = collect_report(&space, "results", &MetricExtractor::default())?;
//! print!("{}", format_grid_report(&report));
//! ```

// Re-export core types
pub use raysweep_core::{
    ConfigError, ConfigIter, ConfigSpace, Configuration, ExclusionRule, ExperimentName,
    ParamValue, ParameterDomain, RendererCommand, SpaceError, experiment_name,
};

// Re-export report types
pub use raysweep_report::{
    MarkerRule, Metric, MetricExtractor, MetricSet, OutputFormat, Report, ReportEntry,
    ReportError, TREELETS_PER_RAY, collect_report, format_grid_report, generate_csv_report,
    generate_json_report, render_report,
};

// Re-export runner types
pub use raysweep_cli::{
    MissingBinaryPolicy, RunError, RunOutcome, RunRecord, Runner, SweepExecutor, SweepPlan,
    SweepResults, SweepStatus, build_plan,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ConfigSpace, Configuration, ExperimentName, MetricExtractor, MissingBinaryPolicy,
        RendererCommand, Runner, collect_report, format_grid_report,
    };
}

/// Run the RaySweep CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     raysweep::run()
/// }
/// ```
pub use raysweep_cli::run;
