//! Sweep Manifest
//!
//! Records what a sweep attempted, next to the captured logs, so a later
//! report pass can tell "never ran" apart from "ran without the marker".
//!
//! ## Collected Data
//!
//! - **Git**: Current commit hash and branch name of the working directory
//! - **OS**: Operating system name and architecture
//! - **Renderer**: Binary path and whether it existed at sweep start
//! - **Timestamp**: UTC time the sweep finished

use super::execution::SweepResults;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Manifest file written into the output directory
pub const MANIFEST_FILE_NAME: &str = "sweep_manifest.json";

/// Sweep-level metadata
#[derive(Debug, Clone, Serialize)]
pub struct SweepMeta {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub os: String,
    pub arch: String,
    pub renderer: String,
    pub renderer_found: bool,
}

/// Everything a sweep attempted
#[derive(Debug, Clone, Serialize)]
pub struct SweepManifest<'a> {
    pub meta: SweepMeta,
    pub results: &'a SweepResults,
}

/// Build sweep metadata including git details
pub fn build_sweep_meta(renderer: &Path) -> SweepMeta {
    SweepMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        git_commit: git(&["rev-parse", "HEAD"]),
        git_branch: git(&["rev-parse", "--abbrev-ref", "HEAD"]),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        renderer: renderer.display().to_string(),
        renderer_found: renderer.exists(),
    }
}

fn git(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

/// Write `<output_dir>/sweep_manifest.json`, replacing any previous one
pub fn write_manifest(
    output_dir: &Path,
    meta: SweepMeta,
    results: &SweepResults,
) -> anyhow::Result<std::path::PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(MANIFEST_FILE_NAME);
    let json = serde_json::to_string_pretty(&SweepManifest { meta, results })?;
    std::fs::write(&path, json)?;
    Ok(path)
}
