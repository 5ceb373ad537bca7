//! Per-format output overrides supplied to a single `create` call.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::UserConfig;
use crate::error::{ConfgenError, ConfgenResult, HookError, HookKind, describe};
use crate::result_ext::HookResultExt;

/// Function computing overrides from the output resolved so far and the
/// effective config.
pub type GlobalsFn =
    Arc<dyn Fn(&Map<String, Value>, &UserConfig) -> Result<Map<String, Value>, HookError> + Send + Sync>;

/// An override registered under a `format` or `format:target` key.
#[derive(Clone)]
pub enum GlobalOverride {
    /// Options merged in as-is.
    Static(Map<String, Value>),
    /// Options computed per output.
    Dynamic(GlobalsFn),
}

impl GlobalOverride {
    pub(crate) fn resolve(
        &self,
        output: &Map<String, Value>,
        config: &UserConfig,
    ) -> ConfgenResult<Map<String, Value>> {
        match self {
            Self::Static(overrides) => Ok(overrides.clone()),
            Self::Dynamic(compute) => compute(output, config).for_hook(HookKind::Globals),
        }
    }
}

impl fmt::Debug for GlobalOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Overrides keyed by `format` (for example `umd`) or `format:target`
/// (for example `esm:modern`).
///
/// `format` overrides win over the resolved output. `format:target`
/// overrides only fill in what the resolved output leaves unset.
///
/// ```rust
/// use rollup_confgen::Globals;
/// use serde_json::json;
///
/// let globals = Globals::new()
///     .with_static("umd", json!({"exports": "named"}))
///     .expect("object override")
///     .with_fn("cjs:node", |_output, _config| Ok(serde_json::Map::new()));
/// assert_eq!(globals.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Globals {
    entries: BTreeMap<String, GlobalOverride>,
}

impl Globals {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedOutput`] unless `overrides` is an
    /// object.
    pub fn with_static(mut self, key: impl Into<String>, overrides: Value) -> ConfgenResult<Self> {
        let name = key.into();
        match overrides {
            Value::Object(map) => {
                self.entries.insert(name, GlobalOverride::Static(map));
                Ok(self)
            }
            other => Err(ConfgenError::malformed_output(format!(
                "globals entry '{name}' must be an object, found {}",
                describe(&other)
            ))),
        }
    }

    /// Register a computed override.
    #[must_use]
    pub fn with_fn<F>(mut self, key: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Map<String, Value>, &UserConfig) -> Result<Map<String, Value>, HookError>
            + Send
            + Sync
            + 'static,
    {
        self.entries
            .insert(key.into(), GlobalOverride::Dynamic(Arc::new(compute)));
        self
    }

    /// Build static overrides from a JSON object of objects.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedOutput`] when `value` or any of its
    /// entries is not an object.
    pub fn from_value(value: Value) -> ConfgenResult<Self> {
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(ConfgenError::malformed_output(format!(
                    "globals must be an object, found {}",
                    describe(&other)
                )));
            }
        };
        entries
            .into_iter()
            .try_fold(Self::new(), |globals, (key, overrides)| {
                globals.with_static(key, overrides)
            })
    }

    /// The override registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&GlobalOverride> {
        self.entries.get(key)
    }

    /// Number of registered overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no overrides are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
