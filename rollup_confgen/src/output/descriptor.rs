//! Fully resolved output options.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OutputFormat;
use crate::error::{ConfgenError, ConfgenResult};
use crate::result_ext::ConfgenResultExt;

/// Source map setting: a toggle or a named mode such as `"inline"`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMap {
    /// Emit (or suppress) a separate map file.
    Enabled(bool),
    /// A bundler-specific mode (`"inline"`, `"hidden"`).
    Mode(String),
}

/// A resolved output. `file` is never empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// Module format.
    pub format: OutputFormat,
    /// Destination path.
    pub file: Utf8PathBuf,
    /// Comment prefixed to the bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Whether the bundler emits compact code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact: Option<bool>,
    /// Source map setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<SourceMap>,
    /// Format-specific options (`exports`, `name`, `globals`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputDescriptor {
    /// Build a descriptor from a resolved fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::UnknownFormat`] for unrecognised formats,
    /// [`ConfgenError::EmptyOutputFile`] when `file` is empty and
    /// [`ConfgenError::Json`] for any other shape mismatch.
    pub fn from_fragment(mut fragment: Map<String, Value>) -> ConfgenResult<Self> {
        if let Some(Value::String(format)) = fragment.get("format") {
            let canonical = format.parse::<OutputFormat>()?;
            fragment.insert("format".to_owned(), Value::String(canonical.as_str().to_owned()));
        }
        let descriptor: Self = serde_json::from_value(Value::Object(fragment)).into_confgen()?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the descriptor invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::EmptyOutputFile`] when `file` is empty.
    pub fn validate(&self) -> ConfgenResult<()> {
        if self.file.as_str().is_empty() {
            return Err(ConfgenError::EmptyOutputFile {
                format: self.format,
            }
            .into());
        }
        Ok(())
    }

    /// A format-specific option.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Convert back into a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::Json`] if serialisation fails.
    pub fn to_fragment(&self) -> ConfgenResult<Map<String, Value>> {
        match serde_json::to_value(self).into_confgen()? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
