//! Output Formatting
//!
//! Human-readable sweep summary with one line per configuration:
//! status icon, experiment name, exit code and wall time.

use super::execution::{SweepResults, SweepStatus};
use raysweep_core::RendererCommand;
use std::path::Path;

/// Format sweep results for terminal display
pub fn format_sweep_summary(results: &SweepResults, output_dir: &Path) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("RaySweep Runs\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for entry in &results.entries {
        let status_icon = match entry.status {
            SweepStatus::Completed => "✓",
            SweepStatus::NonZeroExit => "✗",
            SweepStatus::LaunchFailed => "💥",
            SweepStatus::Invalid | SweepStatus::PersistFailed => "⊘",
        };
        let name = entry
            .name
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "<unnamed>".to_string());
        let exit = entry
            .exit_code
            .map(|c| format!("exit {}", c))
            .unwrap_or_else(|| "no exit code".to_string());

        output.push_str(&format!(
            "  {} {}  ({}, {:.1} s)\n",
            status_icon,
            name,
            exit,
            entry.duration_ms / 1000.0
        ));
        if let Some(message) = &entry.message {
            output.push_str(&format!("      error: {}\n", message));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "{} runs: {} completed, {} non-zero exit, {} launch failures, {} skipped ({:.1} s)\n",
        results.entries.len(),
        results.count(SweepStatus::Completed),
        results.count(SweepStatus::NonZeroExit),
        results.count(SweepStatus::LaunchFailed),
        results.count(SweepStatus::Invalid) + results.count(SweepStatus::PersistFailed),
        results.total_duration_ms / 1000.0
    ));
    output.push_str(&format!("Logs written to: {}\n", output_dir.display()));

    output
}

/// Format the plan listing printed by `list` / `--dry-run`
pub fn format_plan_entry(name: &str, command: Option<&RendererCommand>) -> String {
    match command {
        Some(cmd) => format!("├── {}\n│   └── {}\n", name, cmd.command_line()),
        None => format!("├── {}\n", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::execution::SweepEntry;
    use raysweep_core::{Configuration, ExperimentName};

    #[test]
    fn test_summary_counts() {
        let config = Configuration::renderer("sponza", 256, 256, 1, true, false);
        let results = SweepResults {
            entries: vec![SweepEntry {
                name: Some(ExperimentName::for_configuration(&config).unwrap()),
                configuration: config,
                command_line: None,
                status: SweepStatus::NonZeroExit,
                exit_code: Some(3),
                message: None,
                duration_ms: 1500.0,
            }],
            total_duration_ms: 1500.0,
        };

        let text = format_sweep_summary(&results, Path::new("out"));
        assert!(text.contains("✗ Early_NoDelay_sponza_Depth256  (exit 3, 1.5 s)"));
        assert!(text.contains("1 runs: 0 completed, 1 non-zero exit"));
    }
}
