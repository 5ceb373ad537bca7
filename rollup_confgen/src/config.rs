//! User configs, the base defaults they are layered over, and the configs
//! the generator emits.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::OneOrMany;
use crate::error::{ConfgenError, ConfgenResult, describe};
use crate::merge::{MergeOptions, merge};
use crate::options::BuildMode;
use crate::output::{OutputDescriptor, OutputSpec};
use crate::package::Package;
use crate::plugins::{PipelineStage, PluginSpec};
use crate::result_ext::ConfgenResultExt;
use crate::target::Target;

/// Fields with generator-level meaning. They are parsed into typed slots and
/// never carried through to generated configs as plain fields.
pub const RESERVED_FIELDS: [&str; 5] = ["type", "target", "pkg", "output", "plugins"];

/// A caller's build intent.
///
/// Typed fields drive generation; everything else (`input`, `id`,
/// `external`, `watch`, ...) is carried through to the generated config.
///
/// ```rust
/// use rollup_confgen::UserConfig;
///
/// let config = UserConfig::from_json_str(
///     r#"{"type": "cli", "input": "src/cli.js", "output": {"file": "bin/tool.js"}}"#,
/// )
/// .expect("valid config");
/// assert_eq!(config.set.as_deref(), Some("cli"));
/// assert_eq!(config.input(), Some("src/cli.js"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserConfig {
    /// Name of the set to expand (`type` in JSON).
    pub set: Option<String>,
    /// Platform or runtime profile.
    pub target: Option<Target>,
    /// Package descriptor used instead of the generator's.
    pub pkg: Option<Package>,
    /// Output entries.
    pub output: Option<OutputSpec>,
    /// Pipeline stages supplied by the caller.
    pub plugins: Option<PluginSpec>,
    /// Every other field.
    pub fields: Map<String, Value>,
}

impl UserConfig {
    /// An empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON value, checking the shape of every
    /// reserved field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedConfig`] when `value` is not an object
    /// or `type`/`pkg` are mistyped, and the matching `Malformed*` error for a
    /// bad `target`, `output` or `plugins`.
    pub fn from_value(value: Value) -> ConfgenResult<Self> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ConfgenError::malformed_config(format!(
                    "expected an object, found {}",
                    describe(&other)
                )));
            }
        };
        let set = match fields.shift_remove("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name),
            Some(other) => {
                return Err(ConfgenError::malformed_config(format!(
                    "`type` must be a string, found {}",
                    describe(&other)
                )));
            }
        };
        let target = match fields.shift_remove("target") {
            Some(raw) => Target::from_value(&raw)?,
            None => None,
        };
        let pkg = match fields.shift_remove("pkg") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value(raw)
                    .map_err(|e| ConfgenError::malformed_config(format!("invalid `pkg`: {e}")))?,
            ),
        };
        let output = take_non_null(&mut fields, "output")
            .map(OutputSpec::from_value)
            .transpose()?;
        let plugins = take_non_null(&mut fields, "plugins")
            .map(PluginSpec::from_value)
            .transpose()?;
        Ok(Self {
            set,
            target,
            pkg,
            output,
            plugins,
            fields,
        })
    }

    /// Parse a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::Json`] for invalid JSON and the errors of
    /// [`Self::from_value`] otherwise.
    pub fn from_json_str(text: &str) -> ConfgenResult<Self> {
        let value: Value = serde_json::from_str(text).into_confgen()?;
        Self::from_value(value)
    }

    /// Tag the config with a set name.
    #[must_use]
    pub fn with_set(mut self, name: impl Into<String>) -> Self {
        self.set = Some(name.into());
        self
    }

    /// Set the entry module.
    #[must_use]
    pub fn with_input(self, input: impl Into<String>) -> Self {
        self.with_field("input", input.into())
    }

    /// Set the config identifier.
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_field("id", id.into())
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<Target>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the output entries.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<OutputSpec>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the caller's pipeline stages.
    #[must_use]
    pub fn with_plugins(mut self, plugins: impl Into<PluginSpec>) -> Self {
        self.plugins = Some(plugins.into());
        self
    }

    /// Override the package descriptor for this config.
    #[must_use]
    pub fn with_package(mut self, pkg: Package) -> Self {
        self.pkg = Some(pkg);
        self
    }

    /// Set a carried-through field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The entry module, when it is a string.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.fields.get("input").and_then(Value::as_str)
    }

    /// The config identifier, when it is a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// A carried-through field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Move reserved keys found among the plain fields into their typed
    /// slots. A typed slot that is already set keeps its value; the plain
    /// field is dropped either way.
    ///
    /// ```rust
    /// use rollup_confgen::UserConfig;
    ///
    /// let mut config = UserConfig::new().with_field("type", "cli").with_input("src/cli.js");
    /// config.lift_reserved_fields().expect("well-typed fields");
    /// assert_eq!(config.set.as_deref(), Some("cli"));
    /// assert!(config.field("type").is_none());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::from_value`] for a mistyped reserved
    /// field.
    pub fn lift_reserved_fields(&mut self) -> ConfgenResult<()> {
        let mut reserved = Map::new();
        for key in RESERVED_FIELDS {
            if let Some(value) = self.fields.shift_remove(key) {
                reserved.insert(key.to_owned(), value);
            }
        }
        if reserved.is_empty() {
            return Ok(());
        }
        let lifted = Self::from_value(Value::Object(reserved))?;
        self.set = self.set.take().or(lifted.set);
        self.target = self.target.take().or(lifted.target);
        self.pkg = self.pkg.take().or(lifted.pkg);
        self.output = self.output.take().or(lifted.output);
        self.plugins = self.plugins.take().or(lifted.plugins);
        Ok(())
    }
}

fn take_non_null(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.shift_remove(key).filter(|value| !value.is_null())
}

impl<'de> Deserialize<'de> for UserConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Defaults every generated config is layered over.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BaseConfig {
    /// Output defaults applied beneath every output entry.
    pub output: Map<String, Value>,
    /// Top-level defaults (`input`, `external`, `watch`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl BaseConfig {
    /// The built-in defaults for `pkg` in `mode`.
    ///
    /// Without a package there is no default `input` and nothing is external.
    #[must_use]
    pub fn defaults(pkg: Option<&Package>, mode: BuildMode) -> Self {
        let production = mode.is_production_like();
        let mut fields = Map::new();
        if let Some(descriptor) = pkg {
            fields.insert(
                "input".to_owned(),
                Value::String(format!("src/{}.js", descriptor.short_name())),
            );
        }
        let external = pkg.map(Package::dependency_names).unwrap_or_default();
        fields.insert("external".to_owned(), json!(external));
        fields.insert(
            "watch".to_owned(),
            json!({
                "chokidar": true,
                "include": "src/**",
                "exclude": "node_modules/**",
                "clearScreen": true,
            }),
        );
        let mut output = Map::new();
        output.insert("compact".to_owned(), Value::Bool(production));
        output.insert("sourcemap".to_owned(), Value::Bool(!production));
        Self { output, fields }
    }

    /// Deep-merge caller `overrides` over these defaults. Arrays in the
    /// overrides are appended to the defaults, so `external` adds to the
    /// package dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedConfig`] when `overrides` is not an
    /// object, and [`ConfgenError::MalformedOutput`] when its `output` is
    /// not an object.
    pub fn with_overrides(self, overrides: Value) -> ConfgenResult<Self> {
        let mut layer = match overrides {
            Value::Null => return Ok(self),
            Value::Object(map) => map,
            other => {
                return Err(ConfgenError::malformed_config(format!(
                    "base must be an object, found {}",
                    describe(&other)
                )));
            }
        };
        let output_overrides = match layer.shift_remove("output") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(output)) => output,
            Some(other) => {
                return Err(ConfgenError::malformed_output(format!(
                    "base output must be an object, found {}",
                    describe(&other)
                )));
            }
        };
        for key in RESERVED_FIELDS {
            if layer.shift_remove(key).is_some() {
                warn!(field = key, "ignoring per-config field in base defaults");
            }
        }
        let options = MergeOptions::default();
        let output = merge(
            [Value::Object(self.output), Value::Object(output_overrides)],
            &options,
        );
        let fields = merge([Value::Object(self.fields), Value::Object(layer)], &options);
        Ok(Self {
            output: into_object(output),
            fields: into_object(fields),
        })
    }

    /// The default entry module.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.fields.get("input").and_then(Value::as_str)
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// A configuration object ready for the bundler.
///
/// Serialises with the carried-through fields first, then `output` and
/// `plugins`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedConfig {
    /// Carried-through fields (`input`, `external`, `watch`, `id`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// One resolved output or several.
    pub output: OneOrMany<OutputDescriptor>,
    /// The assembled pipeline.
    pub plugins: Vec<PipelineStage>,
}

impl GeneratedConfig {
    /// The entry module.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.fields.get("input").and_then(Value::as_str)
    }

    /// The config identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// Modules left out of the bundle.
    #[must_use]
    pub fn external(&self) -> Option<&Value> {
        self.fields.get("external")
    }

    /// Watch-mode options.
    #[must_use]
    pub fn watch(&self) -> Option<&Value> {
        self.fields.get("watch")
    }

    /// All resolved outputs, in order.
    #[must_use]
    pub const fn outputs(&self) -> &[OutputDescriptor] {
        self.output.as_slice()
    }

    /// Names of the pipeline stages, in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|stage| stage.name.as_str()).collect()
    }

    /// Serialise to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::Json`] if serialisation fails.
    pub fn to_value(&self) -> ConfgenResult<Value> {
        serde_json::to_value(self).into_confgen()
    }
}
