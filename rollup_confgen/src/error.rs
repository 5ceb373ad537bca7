//! Error types produced while generating bundler configurations.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::output::OutputFormat;

/// Boxed error returned by caller-supplied hooks and globals functions.
pub type HookError = Box<dyn Error + Send + Sync>;

/// Identifies which caller-supplied callback failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum HookKind {
    /// The `prepend_plugins` hook.
    PrependPlugins,
    /// The `insert_plugins` hook.
    InsertPlugins,
    /// The `append_plugins` hook.
    AppendPlugins,
    /// The `output` hook.
    Output,
    /// A function registered in a [`crate::Globals`] map.
    Globals,
}

impl HookKind {
    /// Returns the name the hook is registered under.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrependPlugins => "prepend_plugins",
            Self::InsertPlugins => "insert_plugins",
            Self::AppendPlugins => "append_plugins",
            Self::Output => "output",
            Self::Globals => "globals",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while building a generator or generating configs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfgenError {
    /// The package descriptor could not be read or parsed.
    #[error("package descriptor error in '{path}': {source}")]
    Package {
        /// Location of the descriptor that failed to load.
        path: Utf8PathBuf,
        /// Underlying I/O or parse failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// An operation needed a package descriptor but none is attached.
    #[error("no package descriptor is attached to this generator")]
    MissingPackage,

    /// No `input` is available to derive an output file name from.
    #[error("config has no `input` to derive an output file name from")]
    MissingInput,

    /// A user config or template is not an object, or a reserved field
    /// such as `type` or `pkg` has the wrong shape.
    #[error("malformed config: {reason}")]
    MalformedConfig {
        /// Explanation of the offending shape.
        reason: String,
    },

    /// The `output` field does not have a supported shape.
    #[error("malformed output: {reason}")]
    MalformedOutput {
        /// Explanation of the offending shape.
        reason: String,
    },

    /// The `plugins` field does not have a supported shape.
    #[error("malformed plugins: {reason}")]
    MalformedPlugins {
        /// Explanation of the offending shape.
        reason: String,
    },

    /// The `target` field is neither a string nor a number.
    #[error("malformed target: {reason}")]
    MalformedTarget {
        /// Explanation of the offending shape.
        reason: String,
    },

    /// An output requested a module format the bundler does not know.
    #[error("unknown output format '{format}'")]
    UnknownFormat {
        /// The format string as supplied.
        format: String,
    },

    /// An output descriptor ended up without a file path.
    #[error("output for format '{format}' resolved to an empty file path")]
    EmptyOutputFile {
        /// Format of the offending output.
        format: OutputFormat,
    },

    /// A caller-supplied hook returned an error.
    #[error("{hook} hook failed: {source}")]
    Hook {
        /// Which hook failed.
        hook: HookKind,
        /// Error returned by the hook.
        #[source]
        source: HookError,
    },

    /// JSON encoding or decoding failed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias sharing errors behind an [`Arc`], mirroring how generated
/// configs may be fanned out to several consumers.
pub type ConfgenResult<T> = Result<T, Arc<ConfgenError>>;

impl ConfgenError {
    /// Build a [`Self::Package`] error for `path`.
    pub fn package(path: &Utf8Path, err: impl Into<Box<dyn Error + Send + Sync>>) -> Arc<Self> {
        Arc::new(Self::Package {
            path: path.to_path_buf(),
            source: err.into(),
        })
    }

    /// Build a [`Self::MalformedConfig`] error.
    pub fn malformed_config(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::MalformedConfig {
            reason: reason.into(),
        })
    }

    /// Build a [`Self::MalformedOutput`] error.
    pub fn malformed_output(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::MalformedOutput {
            reason: reason.into(),
        })
    }

    /// Build a [`Self::MalformedPlugins`] error.
    pub fn malformed_plugins(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::MalformedPlugins {
            reason: reason.into(),
        })
    }

    /// Build a [`Self::MalformedTarget`] error.
    pub fn malformed_target(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::MalformedTarget {
            reason: reason.into(),
        })
    }

    /// Wrap a hook failure.
    #[must_use]
    pub fn hook(hook: HookKind, source: HookError) -> Arc<Self> {
        Arc::new(Self::Hook { hook, source })
    }
}

/// Short human description of a JSON value's shape, used in error messages.
pub(crate) const fn describe(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), "null")]
    #[case(json!(true), "a boolean")]
    #[case(json!(3), "a number")]
    #[case(json!("x"), "a string")]
    #[case(json!([]), "an array")]
    #[case(json!({}), "an object")]
    fn describes_value_shapes(#[case] value: serde_json::Value, #[case] expected: &str) {
        assert_eq!(describe(&value), expected);
    }

    #[test]
    fn hook_errors_name_the_hook() {
        let err = ConfgenError::hook(HookKind::InsertPlugins, "boom".into());
        assert_eq!(err.to_string(), "insert_plugins hook failed: boom");
    }

    #[test]
    fn package_errors_keep_the_path() {
        let err = ConfgenError::package(
            Utf8Path::new("app/package.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        match &*err {
            ConfgenError::Package { path, .. } => assert_eq!(path, "app/package.json"),
            other => panic!("expected Package, got {other:?}"),
        }
    }
}
