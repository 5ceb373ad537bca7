//! Pipeline stages and the assembler ordering them.
//!
//! Stages are opaque references the downstream bundler resolves by name.
//! The assembler only decides which stages appear and in what order:
//!
//! 1. slotted `prepend` stages, then the `prepend_plugins` hook;
//! 2. module resolution and CommonJS interop, when a target is set;
//! 3. a plain stage list or slotted `insert` stages, then the
//!    `insert_plugins` hook;
//! 4. the transform stage, when the target has a profile;
//! 5. slotted `append` stages, then the `append_plugins` hook;
//! 6. minification, last, in production-like builds.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::UserConfig;
use crate::error::{ConfgenError, ConfgenResult, describe};
use crate::hooks::Hooks;
use crate::options::BuildMode;
use crate::target::Target;

/// Name of the module-resolution stage.
pub const RESOLVE_STAGE: &str = "node-resolve";
/// Name of the CommonJS interop stage.
pub const INTEROP_STAGE: &str = "commonjs";
/// Name of the syntax transform stage.
pub const TRANSFORM_STAGE: &str = "babel";
/// Name of the minification stage.
pub const MINIFY_STAGE: &str = "terser";

/// A named stage of the bundler's plugin pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "StageRepr")]
pub struct PipelineStage {
    /// Plugin name.
    pub name: String,
    /// Options handed to the plugin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StageRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        options: Option<Value>,
    },
}

impl From<StageRepr> for PipelineStage {
    fn from(repr: StageRepr) -> Self {
        match repr {
            StageRepr::Name(name) => Self::new(name),
            StageRepr::Full { name, options } => Self { name, options },
        }
    }
}

impl PipelineStage {
    /// A stage without options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }

    /// Attach plugin options.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// The module-resolution stage.
    #[must_use]
    pub fn resolve() -> Self {
        Self::new(RESOLVE_STAGE)
    }

    /// The CommonJS interop stage.
    #[must_use]
    pub fn interop() -> Self {
        Self::new(INTEROP_STAGE)
    }

    /// The transform stage configured with `options`.
    #[must_use]
    pub fn transform(options: Value) -> Self {
        Self::new(TRANSFORM_STAGE).with_options(options)
    }

    /// The minification stage.
    #[must_use]
    pub fn minify() -> Self {
        Self::new(MINIFY_STAGE)
    }
}

/// Stages placed around the built-in ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSlots {
    /// Stages placed before everything else.
    #[serde(default)]
    pub prepend: Vec<PipelineStage>,
    /// Stages placed after resolution but before the transform.
    #[serde(default)]
    pub insert: Vec<PipelineStage>,
    /// Stages placed after the transform.
    #[serde(default)]
    pub append: Vec<PipelineStage>,
}

/// The `plugins` field of a config.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PluginSpec {
    /// Stages inserted between resolution and the transform.
    Sequence(Vec<PipelineStage>),
    /// Stages assigned to explicit slots.
    Slotted(PluginSlots),
}

impl PluginSpec {
    /// Interpret a JSON value as a plugins field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedPlugins`] unless `value` is an array
    /// of stages or an object with only `prepend`, `insert` and `append`.
    pub fn from_value(value: Value) -> ConfgenResult<Self> {
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map(Self::Sequence)
                .map_err(|e| ConfgenError::malformed_plugins(e.to_string())),
            Value::Object(_) => serde_json::from_value(value)
                .map(Self::Slotted)
                .map_err(|e| ConfgenError::malformed_plugins(e.to_string())),
            other => Err(ConfgenError::malformed_plugins(format!(
                "expected an array or an object, found {}",
                describe(&other)
            ))),
        }
    }

    const fn slots(&self) -> Option<&PluginSlots> {
        match self {
            Self::Slotted(slots) => Some(slots),
            Self::Sequence(_) => None,
        }
    }
}

impl From<Vec<PipelineStage>> for PluginSpec {
    fn from(stages: Vec<PipelineStage>) -> Self {
        Self::Sequence(stages)
    }
}

impl From<PluginSlots> for PluginSpec {
    fn from(slots: PluginSlots) -> Self {
        Self::Slotted(slots)
    }
}

impl<'de> Deserialize<'de> for PluginSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Assemble the pipeline for `config`.
///
/// # Errors
///
/// Propagates failures returned by plugin hooks.
pub(crate) fn assemble_pipeline(
    config: &UserConfig,
    hooks: &Hooks,
    mode: BuildMode,
    transform_overrides: &Map<String, Value>,
) -> ConfgenResult<Vec<PipelineStage>> {
    let slotted = config.plugins.as_ref().and_then(PluginSpec::slots);
    let mut stages = Vec::new();

    if let Some(slots) = slotted {
        stages.extend(slots.prepend.iter().cloned());
    }
    stages.extend(hooks.run_prepend_plugins(config)?);

    if config.target.is_some() {
        stages.push(PipelineStage::resolve());
        stages.push(PipelineStage::interop());
    }

    match &config.plugins {
        Some(PluginSpec::Sequence(sequence)) => stages.extend(sequence.iter().cloned()),
        Some(PluginSpec::Slotted(slots)) => stages.extend(slots.insert.iter().cloned()),
        None => {}
    }
    stages.extend(hooks.run_insert_plugins(config)?);

    if let Some(profile) = config.target.as_ref().and_then(Target::profile) {
        stages.push(PipelineStage::transform(
            profile.transform_options(transform_overrides),
        ));
    }

    if let Some(slots) = slotted {
        stages.extend(slots.append.iter().cloned());
    }
    stages.extend(hooks.run_append_plugins(config)?);

    if mode.is_production_like() {
        stages.push(PipelineStage::minify());
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn names(stages: &[PipelineStage]) -> Vec<&str> {
        stages.iter().map(|stage| stage.name.as_str()).collect()
    }

    #[test]
    fn stages_accept_bare_names() {
        let spec = PluginSpec::from_value(json!(["json", {"name": "replace", "options": {"x": 1}}]))
            .expect("valid sequence");
        assert_eq!(
            spec,
            PluginSpec::Sequence(vec![
                PipelineStage::new("json"),
                PipelineStage::new("replace").with_options(json!({"x": 1})),
            ])
        );
    }

    #[test]
    fn slotted_specs_reject_unknown_slots() {
        let err = PluginSpec::from_value(json!({"middle": ["json"]})).expect_err("unknown slot");
        assert!(matches!(&*err, ConfgenError::MalformedPlugins { .. }));
    }

    #[test]
    fn scalar_specs_are_rejected() {
        let err = PluginSpec::from_value(json!("json")).expect_err("string spec");
        assert_eq!(
            err.to_string(),
            "malformed plugins: expected an array or an object, found a string"
        );
    }

    #[rstest]
    #[case(BuildMode::Development, vec![])]
    #[case(BuildMode::Production, vec![MINIFY_STAGE])]
    #[case(BuildMode::Test, vec![MINIFY_STAGE])]
    fn untargeted_configs_only_minify_in_production(
        #[case] mode: BuildMode,
        #[case] expected: Vec<&str>,
    ) {
        let stages = assemble_pipeline(&UserConfig::new(), &Hooks::new(), mode, &Map::new())
            .expect("no hooks to fail");
        assert_eq!(names(&stages), expected);
    }

    #[test]
    fn slots_surround_built_in_stages() {
        let config = UserConfig::new()
            .with_target(Target::Modern)
            .with_plugins(PluginSlots {
                prepend: vec![PipelineStage::new("alias")],
                insert: vec![PipelineStage::new("json")],
                append: vec![PipelineStage::new("visualizer")],
            });
        let stages = assemble_pipeline(&config, &Hooks::new(), BuildMode::Production, &Map::new())
            .expect("no hooks to fail");
        assert_eq!(
            names(&stages),
            vec!["alias", RESOLVE_STAGE, INTEROP_STAGE, "json", TRANSFORM_STAGE, "visualizer", MINIFY_STAGE]
        );
    }

    #[test]
    fn unknown_targets_resolve_without_transforming() {
        let config = UserConfig::new()
            .with_target(Target::parse("electron"))
            .with_plugins(vec![PipelineStage::new("json")]);
        let stages = assemble_pipeline(&config, &Hooks::new(), BuildMode::Development, &Map::new())
            .expect("no hooks to fail");
        assert_eq!(names(&stages), vec![RESOLVE_STAGE, INTEROP_STAGE, "json"]);
    }

    #[test]
    fn blank_targets_add_no_stages() {
        let config = UserConfig::from_value(json!({"input": "src/a.js", "target": ""}))
            .expect("blank target is accepted");
        assert_eq!(config.target, None);
        let stages = assemble_pipeline(&config, &Hooks::new(), BuildMode::Development, &Map::new())
            .expect("no hooks to fail");
        assert!(stages.is_empty(), "{stages:?}");
    }

    #[test]
    fn hooks_run_in_their_slots() {
        let hooks = Hooks::new()
            .on_prepend_plugins(|_| Ok(vec![PipelineStage::new("first")]))
            .on_insert_plugins(|_| Ok(vec![PipelineStage::new("middle")]))
            .on_append_plugins(|_| Ok(vec![PipelineStage::new("last")]));
        let config = UserConfig::new()
            .with_target(Target::Node)
            .with_plugins(PluginSlots {
                prepend: vec![PipelineStage::new("slot-prepend")],
                insert: vec![PipelineStage::new("slot-insert")],
                append: vec![PipelineStage::new("slot-append")],
            });
        let stages = assemble_pipeline(&config, &hooks, BuildMode::Production, &Map::new())
            .expect("hooks succeed");
        assert_eq!(
            names(&stages),
            vec![
                "slot-prepend",
                "first",
                RESOLVE_STAGE,
                INTEROP_STAGE,
                "slot-insert",
                "middle",
                TRANSFORM_STAGE,
                "slot-append",
                "last",
                MINIFY_STAGE,
            ]
        );
    }

    #[test]
    fn transform_stage_carries_target_profile() {
        let config = UserConfig::new().with_target(Target::parse("8"));
        let stages = assemble_pipeline(&config, &Hooks::new(), BuildMode::Development, &Map::new())
            .expect("no hooks to fail");
        let transform = stages
            .iter()
            .find(|stage| stage.name == TRANSFORM_STAGE)
            .expect("transform stage present");
        let options = transform.options.as_ref().expect("transform options");
        assert_eq!(options["presets"][0][1]["targets"], json!({"node": "8"}));
    }

    #[test]
    fn hook_failures_propagate() {
        let hooks = Hooks::new().on_append_plugins(|_| Err("append exploded".into()));
        let err = assemble_pipeline(&UserConfig::new(), &hooks, BuildMode::Development, &Map::new())
            .expect_err("hook fails");
        assert_eq!(err.to_string(), "append_plugins hook failed: append exploded");
    }
}
