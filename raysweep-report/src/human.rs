//! Human-Readable Output
//!
//! One table per framebuffer width, scenes as rows and renderer variants
//! (early-exit / hit-delay / traversal scheme) as columns:
//!
//! ```text
//! Framebuffer Size: 256
//! scene        NoEarly_NoDelay_Depth  Early_NoDelay_Depth  Early_Delay_Depth
//! sponza                        2.35                 1.98               1.74
//! ```
//!
//! A cell shows `-` when the log file is missing and `n/a` when the log has
//! no marker line.

use crate::report::{Report, ReportEntry};
use std::collections::BTreeMap;

/// Format `report` as grid tables for terminal display
pub fn format_grid_report(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("RaySweep Results ({})\n", report.meta.metric));
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    let mut by_size: BTreeMap<i64, Vec<&ReportEntry>> = BTreeMap::new();
    for entry in &report.entries {
        by_size.entry(entry.framebuffer_width).or_default().push(entry);
    }

    for (size, entries) in by_size {
        let scenes = first_seen(entries.iter().map(|e| e.scene.clone()));
        let variants = first_seen(entries.iter().map(|e| e.variant_label()));

        let scene_width = scenes
            .iter()
            .map(String::len)
            .chain(std::iter::once("scene".len()))
            .max()
            .unwrap_or(5);

        output.push_str(&format!("Framebuffer Size: {}\n", size));
        output.push_str(&format!("{:<width$}", "scene", width = scene_width));
        for variant in &variants {
            output.push_str(&format!("  {:>w$}", variant, w = variant.len().max(6)));
        }
        output.push('\n');

        for scene in &scenes {
            output.push_str(&format!("{:<width$}", scene, width = scene_width));
            for variant in &variants {
                let cell = entries
                    .iter()
                    .find(|e| &e.scene == scene && &e.variant_label() == variant)
                    .map(|e| format_cell(e, &report.meta.metric))
                    .unwrap_or_default();
                output.push_str(&format!("  {:>w$}", cell, w = variant.len().max(6)));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    let s = &report.summary;
    output.push_str(&format!(
        "{} configurations: {} with metric, {} without marker, {} missing log\n",
        s.total_configurations, s.with_metric, s.missing_marker, s.missing_log
    ));

    output
}

fn format_cell(entry: &ReportEntry, metric: &str) -> String {
    if !entry.log_present {
        return "-".to_string();
    }
    match entry.metrics.iter().find(|m| m.name == metric) {
        Some(m) if m.found => format!("{:.2}", m.value),
        _ => "n/a".to_string(),
    }
}

fn first_seen(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
