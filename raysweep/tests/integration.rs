//! Integration tests for RaySweep
//!
//! These tests drive a small shell script standing in for the renderer, so
//! they exercise real process spawning and capture end to end.

#![cfg(unix)]

use raysweep::{
    ConfigSpace, Configuration, ExperimentName, MetricExtractor, MissingBinaryPolicy,
    RendererCommand, RunOutcome, Runner, SweepExecutor, SweepStatus, TREELETS_PER_RAY,
    build_plan, collect_report, format_grid_report,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// Writing a script while another test thread forks can leave the file busy
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Write an executable stand-in renderer into `dir`
fn fake_renderer(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-renderer.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A successful run persists both streams under the experiment name
#[test]
fn test_run_captures_both_streams() {
    let _lock = serial();
    let bin_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let binary = fake_renderer(
        bin_dir.path(),
        r#"echo "args: $*"
echo "Average treelets per ray: 2.3456"
echo "loading scene" >&2"#,
    );

    let runner = Runner::new(&binary, out_dir.path(), MissingBinaryPolicy::Warn);
    let config = Configuration::renderer("sponza", 256, 256, 1, true, false);
    let record = runner.run(&config).unwrap();

    assert_eq!(record.name.as_str(), "Early_NoDelay_sponza_Depth256");
    assert_eq!(record.outcome, RunOutcome::Exited { code: 0 });
    assert_eq!(
        files_in(out_dir.path()),
        vec![
            "Early_NoDelay_sponza_Depth256_err.txt",
            "Early_NoDelay_sponza_Depth256_log.txt",
        ]
    );

    let log = std::fs::read_to_string(&record.log_path).unwrap();
    assert!(log.contains(
        "args: -Dscene_name=sponza -Dframebuffer_width=256 -Dframebuffer_height=256 \
         -Dtraversal_scheme=1 -Duse_early=1 -Dhit_delay=0"
    ));
    let err = std::fs::read_to_string(&record.err_path).unwrap();
    assert_eq!(err, "loading scene\n");
}

/// Running the same configuration twice leaves exactly two files holding
/// only the second run's output
#[test]
fn test_rerun_overwrites_previous_output() {
    let _lock = serial();
    let bin_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let config = Configuration::renderer("hairball", 1024, 1024, 0, false, false);

    let first = fake_renderer(bin_dir.path(), r#"echo "first run with a much longer line""#);
    Runner::new(&first, out_dir.path(), MissingBinaryPolicy::Warn)
        .run(&config)
        .unwrap();

    let second = fake_renderer(bin_dir.path(), r#"echo "second run""#);
    let record = Runner::new(&second, out_dir.path(), MissingBinaryPolicy::Warn)
        .run(&config)
        .unwrap();

    assert_eq!(files_in(out_dir.path()).len(), 2);
    assert_eq!(
        std::fs::read_to_string(&record.log_path).unwrap(),
        "second run\n"
    );
    assert_eq!(std::fs::read_to_string(&record.err_path).unwrap(), "");
}

/// A renderer that fails still has its streams persisted
#[test]
fn test_nonzero_exit_still_persists() {
    let _lock = serial();
    let bin_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let binary = fake_renderer(
        bin_dir.path(),
        r#"echo "partial output"
echo "scene file not found" >&2
exit 3"#,
    );

    let runner = Runner::new(&binary, out_dir.path(), MissingBinaryPolicy::Warn);
    let config = Configuration::renderer("sponza", 256, 256, 1, false, false);
    let record = runner.run(&config).unwrap();

    assert_eq!(record.outcome, RunOutcome::Exited { code: 3 });
    assert_eq!(
        std::fs::read_to_string(&record.log_path).unwrap(),
        "partial output\n"
    );
    assert_eq!(
        std::fs::read_to_string(&record.err_path).unwrap(),
        "scene file not found\n"
    );
}

/// A missing renderer under the default policy produces an empty log and
/// the launch error in the err file
#[test]
fn test_launch_failure_is_recorded() {
    let _lock = serial();
    let out_dir = tempfile::tempdir().unwrap();
    let binary = out_dir.path().join("no-such-renderer");
    let runner = Runner::new(&binary, out_dir.path(), MissingBinaryPolicy::Warn);
    let config = Configuration::renderer("sponza", 256, 256, 1, true, true);

    let record = runner.run(&config).unwrap();
    assert!(matches!(record.outcome, RunOutcome::LaunchFailed { .. }));
    assert_eq!(std::fs::read_to_string(&record.log_path).unwrap(), "");
    let err = std::fs::read_to_string(&record.err_path).unwrap();
    assert!(err.contains("no-such-renderer"));
}

/// Sweep the default space, then read the metric back from the logs
#[test]
fn test_sweep_then_report() {
    let _lock = serial();
    let bin_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let binary = fake_renderer(
        bin_dir.path(),
        r#"echo "Rendering..."
echo "Average treelets per ray: 2.3456"
echo "Average treelets per ray: 9.99""#,
    );

    let space = ConfigSpace::renderer_default();
    let plan = build_plan(&space, None);
    let runner = Runner::new(&binary, out_dir.path(), MissingBinaryPolicy::Warn);
    let results = SweepExecutor::new(runner, false).execute(&plan).unwrap();

    assert_eq!(results.entries.len(), 3);
    assert_eq!(results.count(SweepStatus::Completed), 3);
    assert!(!results.has_failures());
    assert_eq!(files_in(out_dir.path()).len(), 6);

    let report = collect_report(&space, out_dir.path(), &MetricExtractor::default()).unwrap();
    assert_eq!(report.summary.with_metric, 3);
    for entry in &report.entries {
        assert_eq!(entry.value(TREELETS_PER_RAY), 2.35);
    }

    let grid = format_grid_report(&report);
    assert!(grid.contains("2.35"));
    assert!(!grid.contains("9.99"));
}

/// The default space visits three configurations in nesting order
#[test]
fn test_default_enumeration() {
    let names: Vec<_> = ConfigSpace::renderer_default()
        .iter()
        .map(|c| ExperimentName::for_configuration(&c).unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "NoEarly_NoDelay_sponza_Depth256",
            "Early_NoDelay_sponza_Depth256",
            "Early_Delay_sponza_Depth256",
        ]
    );
}

/// Command lines are stable across enumerations
#[test]
fn test_command_lines_are_stable() {
    let space = ConfigSpace::renderer(
        &["sponza", "hairball"],
        &[256, 1024],
        &[0, 1],
        &[0, 1],
        &[0, 1],
    );
    let build = || -> Vec<String> {
        space
            .iter()
            .map(|c| RendererCommand::build("renderer", &c).unwrap().command_line())
            .collect()
    };
    let first = build();
    assert_eq!(first.len(), 24);
    assert_eq!(first, build());
}
