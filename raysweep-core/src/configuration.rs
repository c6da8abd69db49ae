//! Renderer Configuration
//!
//! A `Configuration` is an ordered, immutable set of `key = value` pairs.
//! The order is significant: it is the order in which switches are passed
//! to the renderer.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Scene to load (e.g. `sponza`)
pub const SCENE_NAME: &str = "scene_name";
/// Framebuffer width in pixels
pub const FRAMEBUFFER_WIDTH: &str = "framebuffer_width";
/// Framebuffer height in pixels
pub const FRAMEBUFFER_HEIGHT: &str = "framebuffer_height";
/// Traversal scheme: 0 = breadth-first, anything else = depth-first
pub const TRAVERSAL_SCHEME: &str = "traversal_scheme";
/// Early-exit flag (0/1)
pub const USE_EARLY: &str = "use_early";
/// Hit-delay flag (0/1)
pub const HIT_DELAY: &str = "hit_delay";

/// Keys every renderer configuration must carry, in canonical switch order.
pub const REQUIRED_FIELDS: [&str; 6] = [
    SCENE_NAME,
    FRAMEBUFFER_WIDTH,
    FRAMEBUFFER_HEIGHT,
    TRAVERSAL_SCHEME,
    USE_EARLY,
    HIT_DELAY,
];

/// Errors raised when a configuration is incomplete or mistyped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: expected {expected}, got {got}")]
    InvalidField {
        field: String,
        expected: &'static str,
        got: String,
    },
}

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value (sizes, schemes, flags)
    Int(i64),
    /// Free-form text (scene names)
    Text(String),
}

impl ParamValue {
    /// Integer payload, if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }

    /// Text payload, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Int(_) => None,
            ParamValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

/// Immutable, ordered renderer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Configuration {
    fields: Vec<(String, ParamValue)>,
}

impl Configuration {
    /// Build a configuration from ordered pairs.
    ///
    /// A key given twice keeps its first position and takes the last value.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let mut out: Vec<(String, ParamValue)> = Vec::new();
        for (key, value) in fields {
            let key = key.into();
            let value = value.into();
            match out.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        Self { fields: out }
    }

    /// Standard six-field renderer configuration, in canonical order.
    pub fn renderer(
        scene: &str,
        width: i64,
        height: i64,
        traversal_scheme: i64,
        use_early: bool,
        hit_delay: bool,
    ) -> Self {
        Self::from_fields([
            (SCENE_NAME, ParamValue::from(scene)),
            (FRAMEBUFFER_WIDTH, ParamValue::Int(width)),
            (FRAMEBUFFER_HEIGHT, ParamValue::Int(height)),
            (TRAVERSAL_SCHEME, ParamValue::Int(traversal_scheme)),
            (USE_EARLY, ParamValue::Int(use_early as i64)),
            (HIT_DELAY, ParamValue::Int(hit_delay as i64)),
        ])
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a value, failing with `MissingField` if absent
    pub fn require(&self, key: &str) -> Result<&ParamValue, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingField(key.to_string()))
    }

    /// Integer field
    pub fn int(&self, key: &str) -> Result<i64, ConfigError> {
        let value = self.require(key)?;
        value.as_int().ok_or_else(|| ConfigError::InvalidField {
            field: key.to_string(),
            expected: "integer",
            got: value.to_string(),
        })
    }

    /// Flag field (any non-zero integer is set)
    pub fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        Ok(self.int(key)? != 0)
    }

    /// Field rendered as text. Integers are accepted and formatted.
    pub fn text(&self, key: &str) -> Result<String, ConfigError> {
        self.require(key).map(ToString::to_string)
    }

    /// Fail with the first required renderer field that is absent.
    pub fn check_required(&self) -> Result<(), ConfigError> {
        REQUIRED_FIELDS
            .iter()
            .try_for_each(|key| self.require(key).map(|_| ()))
    }

    /// Iterate fields in configuration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the configuration has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Serialized as a map so manifests keep the switch order readable.
impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
