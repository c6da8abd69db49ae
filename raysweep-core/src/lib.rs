#![warn(missing_docs)]
//! RaySweep Core - Sweep Definition
//!
//! This crate describes *what* a sweep runs, without touching the filesystem
//! or spawning anything:
//! - `ConfigSpace` enumerates renderer configurations (Cartesian product of
//!   parameter domains, minus declared exclusion rules)
//! - `Configuration` is the immutable key/value set handed to one renderer run
//! - `experiment_name` derives the deterministic label/file stem for a run
//! - `RendererCommand` serializes a configuration into `-Dkey=value` switches

mod command;
mod configuration;
mod naming;
mod space;

pub use command::RendererCommand;
pub use configuration::{
    ConfigError, Configuration, FRAMEBUFFER_HEIGHT, FRAMEBUFFER_WIDTH, HIT_DELAY,
    REQUIRED_FIELDS, ParamValue, SCENE_NAME, TRAVERSAL_SCHEME, USE_EARLY,
};
pub use naming::{ERR_FILE_SUFFIX, ExperimentName, LOG_FILE_SUFFIX, experiment_name};
pub use space::{
    ConfigIter, ConfigSpace, ExclusionRule, FRAMEBUFFER_SIZE, ParameterDomain, SpaceError,
};
