//! Build targets and the transform profiles they select.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::error::{ConfgenError, ConfgenResult, describe};
use crate::merge::{ArrayStrategy, merge_map};

/// Browsers supported by `modern` builds.
pub const MODERN_BROWSERS: &[&str] = &["Chrome >= 61", "Firefox >= 60", "Safari >= 10.1", "Edge >= 16"];

/// Browsers supported by `legacy` builds.
pub const LEGACY_BROWSERS: &[&str] = &["IE 11", "Chrome < 61", "Firefox < 60", "Safari < 10.1", "Edge < 16"];

/// Server runtime version assumed when a target does not name one.
pub const DEFAULT_NODE_VERSION: &str = "9";

/// A platform or runtime profile selected for a build.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Target {
    /// Evergreen browsers.
    Modern,
    /// Older browsers, including IE 11.
    Legacy,
    /// The server runtime at [`DEFAULT_NODE_VERSION`], alongside the
    /// [`MODERN_BROWSERS`].
    Node,
    /// A numeric minimum server runtime version, such as `8` or `10.13`.
    Runtime(String),
    /// Any other identifier. It still enables module resolution but has no
    /// transform profile.
    Other(String),
}

impl Target {
    /// Parse a target identifier. Numeric identifiers become
    /// [`Target::Runtime`].
    ///
    /// A blank identifier parses as [`Target::Other`]; use
    /// [`Target::parse_optional`] where blank means "no target".
    #[must_use]
    pub fn parse(identifier: &str) -> Self {
        match identifier {
            "modern" => Self::Modern,
            "legacy" => Self::Legacy,
            "node" => Self::Node,
            other if is_numeric(other) => Self::Runtime(other.trim().to_owned()),
            other => Self::Other(other.to_owned()),
        }
    }

    /// Parse an identifier, treating a blank one as no target.
    ///
    /// ```rust
    /// use rollup_confgen::Target;
    ///
    /// assert_eq!(Target::parse_optional("  "), None);
    /// assert_eq!(Target::parse_optional("node"), Some(Target::Node));
    /// ```
    #[must_use]
    pub fn parse_optional(identifier: &str) -> Option<Self> {
        if identifier.trim().is_empty() {
            None
        } else {
            Some(Self::parse(identifier))
        }
    }

    /// Interpret a JSON value as a target; `null` and blank strings mean no
    /// target.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedTarget`] for values that are neither
    /// strings, numbers nor `null`.
    pub fn from_value(value: &Value) -> ConfgenResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(identifier) => Ok(Self::parse_optional(identifier)),
            Value::Number(version) => Ok(Some(Self::Runtime(version.to_string()))),
            other => Err(ConfgenError::malformed_target(format!(
                "expected a string or number, found {}",
                describe(other)
            ))),
        }
    }

    /// Whether the target names a numeric runtime version.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }

    /// The transform profile for this target, if it has one.
    #[must_use]
    pub fn profile(&self) -> Option<TargetProfile> {
        match self {
            Self::Modern => Some(TargetProfile {
                runtime: Some(DEFAULT_NODE_VERSION.to_owned()),
                browsers: Some(MODERN_BROWSERS),
            }),
            Self::Legacy => Some(TargetProfile {
                runtime: Some(DEFAULT_NODE_VERSION.to_owned()),
                browsers: Some(LEGACY_BROWSERS),
            }),
            Self::Node => Some(TargetProfile {
                runtime: Some(DEFAULT_NODE_VERSION.to_owned()),
                browsers: Some(MODERN_BROWSERS),
            }),
            Self::Runtime(version) => Some(TargetProfile {
                runtime: Some(version.clone()),
                browsers: None,
            }),
            Self::Other(_) => None,
        }
    }
}

fn is_numeric(identifier: &str) -> bool {
    identifier
        .trim()
        .parse::<f64>()
        .is_ok_and(f64::is_finite)
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modern => f.write_str("modern"),
            Self::Legacy => f.write_str("legacy"),
            Self::Node => f.write_str("node"),
            Self::Runtime(identifier) | Self::Other(identifier) => f.write_str(identifier),
        }
    }
}

impl From<&str> for Target {
    fn from(identifier: &str) -> Self {
        Self::parse(identifier)
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Self::Runtime(version) = self
            && let Ok(number) = version.parse::<serde_json::Number>()
        {
            return number.serialize(serializer);
        }
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .map_err(D::Error::custom)?
            .ok_or_else(|| D::Error::custom("malformed target: expected a string or number, found null"))
    }
}

/// Transform parameters derived from a [`Target`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetProfile {
    /// Minimum server runtime version.
    pub runtime: Option<String>,
    /// Supported browser queries.
    pub browsers: Option<&'static [&'static str]>,
}

impl TargetProfile {
    /// Options for the environment preset driving syntax transforms.
    #[must_use]
    pub fn preset_options(&self) -> Value {
        let mut targets = Map::new();
        if let Some(runtime) = &self.runtime {
            targets.insert("node".to_owned(), Value::String(runtime.clone()));
        }
        if let Some(browsers) = self.browsers {
            targets.insert("browsers".to_owned(), json!(browsers));
        }
        json!({
            "targets": targets,
            "useBuiltIns": false,
            "loose": false,
            "modules": "auto",
            "debug": false,
            "include": [],
            "exclude": [],
        })
    }

    /// Full options for the transform stage, with `overrides` deep-merged
    /// on top (arrays concatenate).
    #[must_use]
    pub fn transform_options(&self, overrides: &Map<String, Value>) -> Value {
        let mut options = Map::new();
        options.insert("babelrc".to_owned(), Value::Bool(false));
        options.insert(
            "presets".to_owned(),
            json!([["@babel/preset-env", self.preset_options()]]),
        );
        options.insert("plugins".to_owned(), json!([]));
        options.insert("include".to_owned(), json!([]));
        options.insert("exclude".to_owned(), json!([]));
        options.insert("runtimeHelpers".to_owned(), Value::Bool(false));
        merge_map(&mut options, overrides.clone(), ArrayStrategy::Concat);
        Value::Object(options)
    }
}
