//! Renderer Runner
//!
//! Executes one renderer invocation and persists both of its output streams
//! under the configuration's experiment name:
//!
//! ```text
//! Configuration ──► ExperimentName ──► RendererCommand
//!                                            │  spawn, wait (blocking)
//!                                            ▼
//!                                      CaptureGuard
//!                                   ├── <name>_log.txt  (stdout)
//!                                   └── <name>_err.txt  (stderr)
//! ```
//!
//! Both files are written on every path out of a run: clean exit, non-zero
//! exit, launch failure, and unwinding. A rerun truncates and overwrites.
//! Runs never overlap and there is no timeout; the renderer is assumed to own
//! the machine for its whole duration.

use raysweep_core::{ConfigError, Configuration, ExperimentName, RendererCommand};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that stop one configuration from being run or recorded
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration could not be named or serialized
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Binary absent under the `Abort` policy
    #[error("Renderer binary not found: {}", .0.display())]
    MissingBinary(PathBuf),

    /// Output directory could not be created
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A capture file could not be written
    #[error("Failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Behaviour when the renderer binary does not exist at its configured path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MissingBinaryPolicy {
    /// Log a warning and attempt the launch anyway (default)
    #[default]
    Warn,
    /// Refuse to run; the sweep stops
    Abort,
}

/// How the renderer process ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RunOutcome {
    /// Process exited with a code
    Exited { code: i32 },
    /// Process was terminated by a signal
    Signaled,
    /// Process could not be started
    LaunchFailed { message: String },
}

impl RunOutcome {
    fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => RunOutcome::Exited { code },
            None => RunOutcome::Signaled,
        }
    }

    /// Clean zero exit
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Exited { code: 0 })
    }
}

/// Captured streams of one run. Lives only until it is persisted.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Lossily decoded stdout
    pub stdout: String,
    /// Lossily decoded stderr, or the launch error text
    pub stderr: String,
    /// How the process ended
    pub outcome: RunOutcome,
}

/// What a completed run left behind
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// Experiment name, also the file stem
    pub name: ExperimentName,
    /// Unquoted display form of the command
    pub command_line: String,
    /// How the process ended
    pub outcome: RunOutcome,
    /// Wall time of the run
    pub duration_ms: f64,
    /// `<name>_log.txt`
    pub log_path: PathBuf,
    /// `<name>_err.txt`
    pub err_path: PathBuf,
}

/// Scoped owner of a run's two output files.
///
/// The guard starts out with empty captures. `finish` writes the real
/// streams; if the guard is dropped before that (e.g. during a panic),
/// whatever was captured so far is flushed so both files always exist.
pub struct CaptureGuard {
    log_path: PathBuf,
    err_path: PathBuf,
    stdout: String,
    stderr: String,
    persisted: bool,
}

impl CaptureGuard {
    /// Guard the output files of `name` inside `dir`
    pub fn new(name: &ExperimentName, dir: &Path) -> Self {
        Self {
            log_path: name.log_path(dir),
            err_path: name.err_path(dir),
            stdout: String::new(),
            stderr: String::new(),
            persisted: false,
        }
    }

    /// Record captured streams without writing them yet
    pub fn capture(&mut self, stdout: String, stderr: String) {
        self.stdout = stdout;
        self.stderr = stderr;
    }

    /// Write both files, truncating previous content
    pub fn finish(mut self) -> Result<(PathBuf, PathBuf), RunError> {
        self.persist()?;
        Ok((self.log_path.clone(), self.err_path.clone()))
    }

    fn persist(&mut self) -> Result<(), RunError> {
        // Mark first so a failed write is not retried from Drop
        self.persisted = true;
        // Both writes are attempted; the first failure is reported
        let log = write_file(&self.log_path, &self.stdout);
        let err = write_file(&self.err_path, &self.stderr);
        log.and(err)
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if !self.persisted {
            if let Err(e) = self.persist() {
                tracing::error!(error = %e, "failed to flush captured output");
            }
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), RunError> {
    std::fs::write(path, contents).map_err(|source| RunError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs the renderer once per configuration, synchronously
#[derive(Debug, Clone)]
pub struct Runner {
    binary: PathBuf,
    output_dir: PathBuf,
    policy: MissingBinaryPolicy,
}

impl Runner {
    /// Create a runner writing into `output_dir`
    pub fn new(
        binary: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        policy: MissingBinaryPolicy,
    ) -> Self {
        Self {
            binary: binary.into(),
            output_dir: output_dir.into(),
            policy,
        }
    }

    /// Renderer binary path
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Directory receiving the captures
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether the renderer binary exists at its configured path
    pub fn binary_exists(&self) -> bool {
        self.binary.exists()
    }

    /// Name and command for `config` without running anything
    pub fn prepare(
        &self,
        config: &Configuration,
    ) -> Result<(ExperimentName, RendererCommand), RunError> {
        let name = ExperimentName::for_configuration(config)?;
        let command = RendererCommand::build(&self.binary, config)?;
        Ok((name, command))
    }

    /// Run the renderer for `config` and persist its streams.
    ///
    /// A non-zero exit or a failed launch still yields `Ok`; only an
    /// incomplete configuration, the `Abort` policy, or an unwritable output
    /// directory produce an error.
    pub fn run(&self, config: &Configuration) -> Result<RunRecord, RunError> {
        let (name, command) = self.prepare(config)?;

        if !self.binary_exists() {
            match self.policy {
                MissingBinaryPolicy::Warn => {
                    tracing::warn!(
                        binary = %self.binary.display(),
                        "renderer binary not found, attempting anyway"
                    );
                }
                MissingBinaryPolicy::Abort => {
                    return Err(RunError::MissingBinary(self.binary.clone()));
                }
            }
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|source| RunError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let command_line = command.command_line();
        tracing::debug!(experiment = %name, command = %command_line, "launching renderer");

        let mut guard = CaptureGuard::new(&name, &self.output_dir);
        let start = Instant::now();
        let result = execute(&command);
        let duration = start.elapsed();

        if let RunOutcome::LaunchFailed { message } = &result.outcome {
            tracing::error!(experiment = %name, error = %message, "failed to launch renderer");
        } else if !result.outcome.is_success() {
            tracing::warn!(
                experiment = %name,
                outcome = ?result.outcome,
                "renderer exited abnormally"
            );
        }

        let outcome = result.outcome.clone();
        guard.capture(result.stdout, result.stderr);
        let (log_path, err_path) = guard.finish()?;

        tracing::info!("{} finished", name);

        Ok(RunRecord {
            name,
            command_line,
            outcome,
            duration_ms: duration_ms(duration),
            log_path,
            err_path,
        })
    }
}

/// Spawn, wait for exit, and collect both streams in full.
fn execute(command: &RendererCommand) -> ExecutionResult {
    let output = command
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|child| child.wait_with_output());

    match output {
        Ok(output) => ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            outcome: RunOutcome::from_status(output.status),
        },
        Err(e) => {
            let message = format!(
                "Failed to launch {}: {}",
                command.binary().display(),
                e
            );
            ExecutionResult {
                stdout: String::new(),
                stderr: format!("{}\n", message),
                outcome: RunOutcome::LaunchFailed { message },
            }
        }
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
