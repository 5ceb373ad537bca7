//! User-facing output shapes: a fragment, a side-effect function, or a list
//! of either.

use std::fmt;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::config::UserConfig;
use crate::error::{ConfgenError, ConfgenResult, describe};
use crate::merge::{ArrayStrategy, merge_map};

/// Side-effect function run against the effective config while outputs are
/// resolved. Its slot in the output list then resolves from defaults alone.
pub type OutputEffect = Arc<dyn Fn(&mut UserConfig) + Send + Sync>;

/// One entry of an `output` field.
#[derive(Clone)]
pub enum OutputEntry {
    /// Partial output options (`format`, `file`, `banner`, ...).
    Fragment(Map<String, Value>),
    /// A function mutating the effective config.
    Effect(OutputEffect),
}

impl OutputEntry {
    /// Wrap a JSON object as a fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedOutput`] unless `value` is an object.
    pub fn fragment(value: Value) -> ConfgenResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::Fragment(map)),
            other => Err(ConfgenError::malformed_output(format!(
                "expected an object, found {}",
                describe(&other)
            ))),
        }
    }

    /// Wrap a side-effect function.
    pub fn effect<F>(effect: F) -> Self
    where
        F: Fn(&mut UserConfig) + Send + Sync + 'static,
    {
        Self::Effect(Arc::new(effect))
    }

    /// The fragment, when this entry is one.
    #[must_use]
    pub const fn as_fragment(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Fragment(map) => Some(map),
            Self::Effect(_) => None,
        }
    }

    /// Overlay `overrides` onto a fragment entry; effects are left untouched.
    #[must_use]
    pub fn overlaid(self, overrides: &Map<String, Value>) -> Self {
        match self {
            Self::Fragment(mut map) => {
                merge_map(&mut map, overrides.clone(), ArrayStrategy::Concat);
                Self::Fragment(map)
            }
            effect @ Self::Effect(_) => effect,
        }
    }
}

impl fmt::Debug for OutputEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fragment(map) => f.debug_tuple("Fragment").field(map).finish(),
            Self::Effect(_) => f.write_str("Effect(..)"),
        }
    }
}

impl PartialEq for OutputEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fragment(a), Self::Fragment(b)) => a == b,
            (Self::Effect(a), Self::Effect(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Map<String, Value>> for OutputEntry {
    fn from(map: Map<String, Value>) -> Self {
        Self::Fragment(map)
    }
}

/// The `output` field of a config: one entry or an ordered list.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputSpec {
    /// A single entry.
    Single(OutputEntry),
    /// Several entries, resolved in order.
    List(Vec<OutputEntry>),
}

impl OutputSpec {
    /// Interpret a JSON value as an output field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedOutput`] unless `value` is an object
    /// or an array of objects.
    pub fn from_value(value: Value) -> ConfgenResult<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(OutputEntry::fragment)
                .collect::<ConfgenResult<Vec<_>>>()
                .map(Self::List),
            other => OutputEntry::fragment(other).map(Self::Single),
        }
    }

    /// Build from entries, collapsing a one-element list to [`Self::Single`].
    #[must_use]
    pub fn from_entries(mut entries: Vec<OutputEntry>) -> Self {
        if entries.len() == 1
            && let Some(entry) = entries.pop()
        {
            return Self::Single(entry);
        }
        Self::List(entries)
    }

    /// All entries, in order.
    #[must_use]
    pub fn into_entries(self) -> Vec<OutputEntry> {
        match self {
            Self::Single(entry) => vec![entry],
            Self::List(entries) => entries,
        }
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(entries) => entries.len(),
        }
    }

    /// Whether there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<OutputEntry> for OutputSpec {
    fn from(entry: OutputEntry) -> Self {
        Self::Single(entry)
    }
}

impl From<Vec<OutputEntry>> for OutputSpec {
    fn from(entries: Vec<OutputEntry>) -> Self {
        Self::List(entries)
    }
}

impl From<Map<String, Value>> for OutputSpec {
    fn from(map: Map<String, Value>) -> Self {
        Self::Single(OutputEntry::Fragment(map))
    }
}

impl<'de> Deserialize<'de> for OutputSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_become_lists() {
        let spec = OutputSpec::from_value(json!([{"format": "umd"}, {"format": "esm"}]))
            .expect("array of objects");
        assert_eq!(spec.len(), 2);
        assert!(matches!(spec, OutputSpec::List(_)));
    }

    #[test]
    fn rejects_scalar_outputs() {
        let err = OutputSpec::from_value(json!("dist/app.js")).expect_err("string output");
        assert_eq!(
            err.to_string(),
            "malformed output: expected an object, found a string"
        );
    }

    #[test]
    fn rejects_arrays_containing_scalars() {
        let err = OutputSpec::from_value(json!([{"format": "umd"}, 3])).expect_err("mixed array");
        assert!(matches!(&*err, ConfgenError::MalformedOutput { .. }));
    }

    #[test]
    fn single_entry_lists_collapse() {
        let entry = OutputEntry::fragment(json!({"format": "cjs"})).expect("object");
        assert_eq!(
            OutputSpec::from_entries(vec![entry.clone()]),
            OutputSpec::Single(entry)
        );
    }

    #[test]
    fn overlay_skips_effects() {
        let effect = OutputEntry::effect(|_| {});
        let overrides = json!({"banner": "X"});
        let overlaid = effect.clone().overlaid(overrides.as_object().expect("object"));
        assert_eq!(overlaid, effect);
    }
}
