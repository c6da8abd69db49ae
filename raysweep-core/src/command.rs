//! Renderer Command Line
//!
//! Serializes a configuration as one `-D<key>=<value>` switch per field,
//! in the configuration's own field order. Values are passed through
//! verbatim: no quoting, no escaping.

use crate::configuration::{ConfigError, Configuration};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Invocation of the external renderer for one configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCommand {
    binary: PathBuf,
    switches: Vec<String>,
}

impl RendererCommand {
    /// Build the invocation. Fails if a required renderer field is missing.
    pub fn build(binary: impl Into<PathBuf>, config: &Configuration) -> Result<Self, ConfigError> {
        config.check_required()?;
        let switches = config
            .iter()
            .map(|(key, value)| format!("-D{}={}", key, value))
            .collect();
        Ok(Self {
            binary: binary.into(),
            switches,
        })
    }

    /// Renderer binary path
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// `-Dkey=value` switches in field order
    pub fn switches(&self) -> &[String] {
        &self.switches
    }

    /// Single-string form: binary followed by the switches, space separated
    pub fn command_line(&self) -> String {
        let mut line = self.binary.display().to_string();
        for switch in &self.switches {
            line.push(' ');
            line.push_str(switch);
        }
        line
    }

    /// Process builder with one argv entry per switch (no shell involved)
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(&self.switches);
        command
    }
}

impl fmt::Display for RendererCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}
