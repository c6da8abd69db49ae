//! Sweep Executor
//!
//! Runs the renderer over a sweep plan and summarizes what happened.
//!
//! ## Pipeline Overview
//!
//! ```text
//! SweepPlan
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  One blocking Runner invocation per configuration
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  metadata   │  sweep_manifest.json (git, OS, renderer, outcomes)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable summary
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Sequential sweep driver
//! - [`metadata`] - Sweep manifest
//! - [`formatting`] - Human-readable output formatting

mod execution;
mod formatting;
mod metadata;

// Re-export public API
pub use execution::{SweepEntry, SweepExecutor, SweepResults, SweepStatus};
pub use formatting::{format_plan_entry, format_sweep_summary};
pub use metadata::{MANIFEST_FILE_NAME, SweepManifest, SweepMeta, build_sweep_meta, write_manifest};
