//! Configuration loading from raysweep.toml
//!
//! RaySweep configuration can be specified in a `raysweep.toml` file next to
//! the sweep outputs. The configuration is automatically discovered by
//! walking up from the current directory. CLI flags override file values.

use crate::runner::MissingBinaryPolicy;
use raysweep_core::{ConfigSpace, ExclusionRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by `RaySweepConfig::discover`
pub const CONFIG_FILE_NAME: &str = "raysweep.toml";

/// RaySweep configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RaySweepConfig {
    /// Renderer configuration
    #[serde(default)]
    pub renderer: RendererConfig,
    /// Sweep domains
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// External renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Path of the renderer executable
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// What to do when the binary is not found: "warn" or "abort"
    #[serde(default)]
    pub on_missing_binary: MissingBinaryPolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            on_missing_binary: MissingBinaryPolicy::default(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("../../build/src/arches-v2/Arches-v2")
}

/// Sweep domains. Every combination is run once, except combinations
/// removed by the built-in hit-delay rule or by `exclude`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Scene names
    #[serde(default = "default_scenes")]
    pub scenes: Vec<String>,
    /// Square framebuffer sizes (width = height)
    #[serde(default = "default_sizes")]
    pub sizes: Vec<i64>,
    /// Traversal schemes (0 = breadth-first, 1 = depth-first)
    #[serde(default = "default_schemes")]
    pub schemes: Vec<i64>,
    /// Early-exit values
    #[serde(default = "default_flags")]
    pub early: Vec<i64>,
    /// Hit-delay values
    #[serde(default = "default_flags")]
    pub delay: Vec<i64>,
    /// Additional exclusion rules
    #[serde(default)]
    pub exclude: Vec<ExclusionRule>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            scenes: default_scenes(),
            sizes: default_sizes(),
            schemes: default_schemes(),
            early: default_flags(),
            delay: default_flags(),
            exclude: Vec::new(),
        }
    }
}

fn default_scenes() -> Vec<String> {
    vec!["sponza".to_string()]
}
fn default_sizes() -> Vec<i64> {
    vec![256]
}
fn default_schemes() -> Vec<i64> {
    vec![1]
}
fn default_flags() -> Vec<i64> {
    vec![0, 1]
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `<name>_log.txt` / `<name>_err.txt`
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Report format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Write `sweep_manifest.json` after each sweep
    #[serde(default = "default_write_manifest")]
    pub write_manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            format: default_format(),
            write_manifest: default_write_manifest(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_format() -> String {
    "human".to_string()
}
fn default_write_manifest() -> bool {
    true
}

impl SweepConfig {
    /// Build the configuration space declared by this section
    pub fn to_space(&self) -> ConfigSpace {
        self.exclude.iter().cloned().fold(
            ConfigSpace::renderer(
                &self.scenes,
                &self.sizes,
                &self.schemes,
                &self.early,
                &self.delay,
            ),
            ConfigSpace::with_exclusion,
        )
    }
}

impl RaySweepConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            error = %e,
                            "ignoring unreadable configuration"
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# RaySweep Configuration

[renderer]
# Renderer executable; every run passes -D<key>=<value> switches to it
binary = "../../build/src/arches-v2/Arches-v2"
# Missing binary: "warn" (log and attempt anyway) or "abort" (stop the sweep)
on_missing_binary = "warn"

[sweep]
# Enumerated outer to inner: sizes, scenes, schemes, early, delay
scenes = ["sponza"]        # e.g. ["sponza", "san-miguel", "hairball"]
sizes = [256]              # e.g. [256, 1024]
schemes = [1]              # 0 = breadth-first, 1 = depth-first
early = [0, 1]
delay = [0, 1]
# hit_delay = 1 without use_early = 1 is always skipped.
# Additional exclusions (uncomment to enable):
# [[sweep.exclude]]
# name = "skip-breadth-delay"
# when = { traversal_scheme = 0, hit_delay = 1 }

[output]
# Directory for <name>_log.txt / <name>_err.txt
directory = "."
# Report format: human, json, csv
format = "human"
# Write sweep_manifest.json after each sweep
write_manifest = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raysweep_core::SpaceError;

    #[test]
    fn test_default_config() {
        let config = RaySweepConfig::default();
        assert_eq!(config.sweep.scenes, vec!["sponza"]);
        assert_eq!(config.sweep.early, vec![0, 1]);
        assert_eq!(config.renderer.on_missing_binary, MissingBinaryPolicy::Warn);
        assert_eq!(config.sweep.to_space().iter().count(), 3);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [renderer]
            binary = "/opt/arches/Arches-v2"
            on_missing_binary = "abort"

            [sweep]
            scenes = ["sponza", "hairball"]
            sizes = [256, 1024]
        "#;

        let config: RaySweepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.renderer.binary, PathBuf::from("/opt/arches/Arches-v2"));
        assert_eq!(config.renderer.on_missing_binary, MissingBinaryPolicy::Abort);
        // Defaults should still apply
        assert_eq!(config.sweep.schemes, vec![1]);
        assert_eq!(config.output.format, "human");
        assert_eq!(config.sweep.to_space().iter().count(), 12);
    }

    #[test]
    fn test_extra_exclusions() {
        let toml_str = r#"
            [sweep]
            schemes = [0, 1]

            [[sweep.exclude]]
            name = "skip-breadth-delay"
            when = { traversal_scheme = 0, hit_delay = 1 }
        "#;

        let config: RaySweepConfig = toml::from_str(toml_str).unwrap();
        let space = config.sweep.to_space();
        assert!(space.validate().is_ok());
        assert_eq!(space.exclusions.len(), 2);
        assert_eq!(space.iter().count(), 5);
    }

    #[test]
    fn test_sweep_values_checked() {
        let flags: RaySweepConfig =
            toml::from_str("[sweep]\nearly = [0, 2]\ndelay = [0, 2]").unwrap();
        assert!(matches!(
            flags.sweep.to_space().validate(),
            Err(SpaceError::InvalidFlag { .. })
        ));

        let scenes: RaySweepConfig =
            toml::from_str("[sweep]\nscenes = [\"sponza\", \"sponza\"]").unwrap();
        assert!(matches!(
            scenes.sweep.to_space().validate(),
            Err(SpaceError::DuplicateValue { .. })
        ));
    }

    #[test]
    fn test_default_toml_parses() {
        let config: RaySweepConfig = toml::from_str(&RaySweepConfig::default_toml()).unwrap();
        assert_eq!(config.sweep.sizes, vec![256]);
        assert!(config.output.write_manifest);
    }
}
