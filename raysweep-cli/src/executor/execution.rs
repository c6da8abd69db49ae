//! Sweep Execution
//!
//! Drives the `Runner` over a `SweepPlan`, one configuration at a time.
//!
//! ## Data Flow
//!
//! ```text
//! SweepPlan (lazy, nesting order)
//!        │  one fresh Configuration per step
//!        ▼
//! ┌──────────────────┐
//! │  SweepExecutor   │  Runner::run, blocking, never overlapping
//! └────────┬─────────┘
//!          │
//!          ▼
//!  SweepEntry (name, command, status, duration)
//! ```
//!
//! Failures are isolated per configuration: an incomplete configuration or
//! an unwritable capture is recorded and the sweep moves on. The only thing
//! that stops a sweep early is a missing renderer under the `abort` policy.

use crate::planner::SweepPlan;
use crate::runner::{RunError, RunOutcome, RunRecord, Runner};
use indicatif::{ProgressBar, ProgressStyle};
use raysweep_core::{Configuration, ExperimentName};
use serde::Serialize;
use std::time::Instant;

/// Final status of one configuration in a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepStatus {
    /// Renderer exited with code 0
    Completed,
    /// Renderer exited with a non-zero code or a signal
    NonZeroExit,
    /// Renderer could not be started
    LaunchFailed,
    /// Configuration could not be named or serialized
    Invalid,
    /// Streams could not be written
    PersistFailed,
}

/// Result of visiting one configuration
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    /// Experiment name, `None` when the configuration is incomplete
    pub name: Option<ExperimentName>,
    /// Values the renderer was run with
    pub configuration: Configuration,
    /// Unquoted command, `None` when the run never got that far
    pub command_line: Option<String>,
    /// Final status
    pub status: SweepStatus,
    /// Exit code, when the process exited normally
    pub exit_code: Option<i32>,
    /// Launch or persistence error text
    pub message: Option<String>,
    /// Wall time of the run
    pub duration_ms: f64,
}

impl SweepEntry {
    fn from_record(configuration: Configuration, record: RunRecord) -> Self {
        let (status, exit_code, message) = match record.outcome {
            RunOutcome::Exited { code: 0 } => (SweepStatus::Completed, Some(0), None),
            RunOutcome::Exited { code } => (SweepStatus::NonZeroExit, Some(code), None),
            RunOutcome::Signaled => (
                SweepStatus::NonZeroExit,
                None,
                Some("terminated by signal".to_string()),
            ),
            RunOutcome::LaunchFailed { message } => {
                (SweepStatus::LaunchFailed, None, Some(message))
            }
        };
        Self {
            name: Some(record.name),
            configuration,
            command_line: Some(record.command_line),
            status,
            exit_code,
            message,
            duration_ms: record.duration_ms,
        }
    }

    fn from_error(configuration: Configuration, error: &RunError, duration_ms: f64) -> Self {
        let status = match error {
            RunError::Config(_) => SweepStatus::Invalid,
            _ => SweepStatus::PersistFailed,
        };
        Self {
            name: ExperimentName::for_configuration(&configuration).ok(),
            configuration,
            command_line: None,
            status,
            exit_code: None,
            message: Some(error.to_string()),
            duration_ms,
        }
    }
}

/// Results of a whole sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepResults {
    /// One entry per visited configuration, in sweep order
    pub entries: Vec<SweepEntry>,
    /// Wall time of the whole sweep
    pub total_duration_ms: f64,
}

impl SweepResults {
    /// Number of entries with `status`
    pub fn count(&self, status: SweepStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Whether any configuration failed to launch, name, or persist
    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| {
            matches!(
                e.status,
                SweepStatus::LaunchFailed | SweepStatus::Invalid | SweepStatus::PersistFailed
            )
        })
    }
}

/// Sequential sweep driver
pub struct SweepExecutor {
    runner: Runner,
    show_progress: bool,
}

impl SweepExecutor {
    /// Create an executor
    pub fn new(runner: Runner, show_progress: bool) -> Self {
        Self {
            runner,
            show_progress,
        }
    }

    /// Underlying runner
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Visit every configuration of `plan`, in order.
    ///
    /// Returns `Err` only when the missing-binary policy aborts the sweep.
    pub fn execute(&self, plan: &SweepPlan<'_>) -> Result<SweepResults, RunError> {
        let pb = if self.show_progress {
            ProgressBar::new(plan.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let start = Instant::now();
        let mut results = SweepResults::default();

        for config in plan.iter() {
            if let Ok(name) = ExperimentName::for_configuration(&config) {
                pb.set_message(name.to_string());
            }

            let run_start = Instant::now();
            let entry = match self.runner.run(&config) {
                Ok(record) => SweepEntry::from_record(config, record),
                Err(e @ RunError::MissingBinary(_)) => {
                    pb.abandon_with_message("Aborted");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "configuration skipped");
                    let elapsed = run_start.elapsed().as_secs_f64() * 1000.0;
                    SweepEntry::from_error(config, &e, elapsed)
                }
            };
            results.entries.push(entry);
            pb.inc(1);
        }

        pb.finish_with_message("Complete");
        results.total_duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        Ok(results)
    }
}
