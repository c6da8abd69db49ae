//! Experiment Naming
//!
//! Every configuration gets a canonical name such as
//! `Early_NoDelay_sponza_Depth256`. The same name labels the run in logs and
//! is the stem of its two output files, so a later report pass can find the
//! logs of a configuration without any shared state.

use crate::configuration::{
    ConfigError, Configuration, FRAMEBUFFER_WIDTH, HIT_DELAY, SCENE_NAME, TRAVERSAL_SCHEME,
    USE_EARLY,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Suffix of the captured stdout file
pub const LOG_FILE_SUFFIX: &str = "_log.txt";
/// Suffix of the captured stderr file
pub const ERR_FILE_SUFFIX: &str = "_err.txt";

/// Deterministic identifier of a configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Derive the name of `config`
    pub fn for_configuration(config: &Configuration) -> Result<Self, ConfigError> {
        experiment_name(config)
    }

    /// Name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<name>_log.txt`
    pub fn log_file_name(&self) -> String {
        format!("{}{}", self.0, LOG_FILE_SUFFIX)
    }

    /// `<name>_err.txt`
    pub fn err_file_name(&self) -> String {
        format!("{}{}", self.0, ERR_FILE_SUFFIX)
    }

    /// Path of the stdout capture inside `dir`
    pub fn log_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(self.log_file_name())
    }

    /// Path of the stderr capture inside `dir`
    pub fn err_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(self.err_file_name())
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExperimentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build `{Early|NoEarly}_{Delay|NoDelay}_{scene}_{Breadth|Depth}{width}`.
///
/// All six renderer fields must be present, including the height, which
/// does not appear in the name.
pub fn experiment_name(config: &Configuration) -> Result<ExperimentName, ConfigError> {
    config.check_required()?;

    let early = if config.flag(USE_EARLY)? {
        "Early"
    } else {
        "NoEarly"
    };
    let delay = if config.flag(HIT_DELAY)? {
        "Delay"
    } else {
        "NoDelay"
    };
    let scheme = if config.int(TRAVERSAL_SCHEME)? == 0 {
        "Breadth"
    } else {
        "Depth"
    };
    let scene = config.text(SCENE_NAME)?;
    let width = config.int(FRAMEBUFFER_WIDTH)?;

    Ok(ExperimentName(format!(
        "{}_{}_{}_{}{}",
        early, delay, scene, scheme, width
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{FRAMEBUFFER_HEIGHT, ParamValue};

    #[test]
    fn test_name_format() {
        let config = Configuration::renderer("sponza", 256, 256, 1, true, false);
        let name = experiment_name(&config).unwrap();
        assert_eq!(name.as_str(), "Early_NoDelay_sponza_Depth256");
        assert_eq!(name.log_file_name(), "Early_NoDelay_sponza_Depth256_log.txt");
        assert_eq!(name.err_file_name(), "Early_NoDelay_sponza_Depth256_err.txt");
    }

    #[test]
    fn test_breadth_and_flags_off() {
        let config = Configuration::renderer("hairball", 1024, 1024, 0, false, false);
        assert_eq!(
            experiment_name(&config).unwrap().as_str(),
            "NoEarly_NoDelay_hairball_Breadth1024"
        );
    }

    #[test]
    fn test_any_nonzero_scheme_is_depth() {
        let config = Configuration::renderer("sponza", 256, 256, 7, true, true);
        assert_eq!(
            experiment_name(&config).unwrap().as_str(),
            "Early_Delay_sponza_Depth256"
        );
    }

    #[test]
    fn test_deterministic_for_equal_configs() {
        let a = Configuration::renderer("san-miguel", 256, 256, 1, true, true);
        let b = a.clone();
        assert_eq!(experiment_name(&a).unwrap(), experiment_name(&b).unwrap());
        assert_eq!(experiment_name(&a).unwrap(), experiment_name(&a).unwrap());
    }

    #[test]
    fn test_missing_height_is_an_error() {
        let config = Configuration::from_fields([
            (SCENE_NAME, ParamValue::from("sponza")),
            (FRAMEBUFFER_WIDTH, ParamValue::Int(256)),
            (TRAVERSAL_SCHEME, ParamValue::Int(1)),
            (USE_EARLY, ParamValue::Int(1)),
            (HIT_DELAY, ParamValue::Int(0)),
        ]);
        assert_eq!(
            experiment_name(&config),
            Err(ConfigError::MissingField(FRAMEBUFFER_HEIGHT.to_string()))
        );
    }

    #[test]
    fn test_paths() {
        let config = Configuration::renderer("sponza", 256, 256, 0, false, false);
        let name = experiment_name(&config).unwrap();
        assert_eq!(
            name.log_path("out"),
            Path::new("out").join("NoEarly_NoDelay_sponza_Breadth256_log.txt")
        );
    }
}
