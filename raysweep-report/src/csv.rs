//! CSV Output
//!
//! One row per configuration, primary metric first. Columns are stable so
//! the file can feed an external plotting script directly.

use crate::report::Report;

/// Generate a CSV report
pub fn generate_csv_report(report: &Report) -> String {
    let metric_names: Vec<&str> = report
        .entries
        .iter()
        .find(|e| !e.metrics.is_empty())
        .map(|e| e.metrics.iter().map(|m| m.name.as_str()).collect())
        .unwrap_or_else(|| vec![report.meta.metric.as_str()]);

    let mut output = String::from(
        "name,scene,framebuffer_width,traversal_scheme,use_early,hit_delay,log_present",
    );
    for name in &metric_names {
        output.push(',');
        output.push_str(&escape(name));
    }
    output.push('\n');

    for entry in &report.entries {
        output.push_str(&format!(
            "{},{},{},{},{},{},{}",
            escape(entry.name.as_str()),
            escape(&entry.scene),
            entry.framebuffer_width,
            entry.traversal_scheme,
            entry.use_early as u8,
            entry.hit_delay as u8,
            entry.log_present,
        ));
        for name in &metric_names {
            output.push_str(&format!(",{:.2}", entry.value(name)));
        }
        output.push('\n');
    }

    output
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
