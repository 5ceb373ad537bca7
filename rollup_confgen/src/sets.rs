//! Named sets of variant templates and their expansion.
//!
//! A config tagged with a set name fans out into one config per template.
//! Caller fields beat template fields; a caller `output` fragment is laid
//! over every template output entry.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};

use crate::config::UserConfig;
use crate::error::{ConfgenError, ConfgenResult, describe};
use crate::merge::{ArrayStrategy, merge_map};
use crate::output::{OutputEntry, OutputFormat, OutputSpec};
use crate::plugins::PluginSpec;
use crate::target::Target;

/// Banner placed on command-line entry points.
pub const CLI_BANNER: &str = "#!/usr/bin/env node";

/// One variant of a set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantTemplate {
    /// Target of the variant; `None` builds without a transform profile.
    pub target: Option<Target>,
    /// Output entries of the variant.
    pub output: Option<OutputSpec>,
    /// Pipeline stages used when the caller supplies none.
    pub plugins: Option<PluginSpec>,
    /// Other fields, beneath the caller's.
    pub fields: Map<String, Value>,
}

impl VariantTemplate {
    /// A template for `target` with the given output formats.
    #[must_use]
    pub fn new(target: Option<Target>, formats: &[OutputFormat]) -> Self {
        let entries = formats.iter().map(|format| format_entry(*format)).collect();
        Self {
            target,
            output: Some(OutputSpec::from_entries(entries)),
            ..Self::default()
        }
    }

    /// Replace the output entries.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<OutputSpec>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set default pipeline stages.
    #[must_use]
    pub fn with_plugins(mut self, plugins: impl Into<PluginSpec>) -> Self {
        self.plugins = Some(plugins.into());
        self
    }

    /// Parse a template from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedConfig`] unless `value` is an object,
    /// and the matching `Malformed*` error for a bad `target`, `output` or
    /// `plugins`.
    pub fn from_value(value: Value) -> ConfgenResult<Self> {
        let config = UserConfig::from_value(value)?;
        Ok(Self {
            target: config.target,
            output: config.output,
            plugins: config.plugins,
            fields: config.fields,
        })
    }
}

impl<'de> Deserialize<'de> for VariantTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

fn format_entry(format: OutputFormat) -> OutputEntry {
    let mut fragment = Map::new();
    fragment.insert("format".to_owned(), Value::String(format.as_str().to_owned()));
    OutputEntry::Fragment(fragment)
}

/// Set name to ordered variant templates.
///
/// ```rust
/// use rollup_confgen::SetTable;
///
/// let sets = SetTable::builtin();
/// assert_eq!(sets.get("browser").map(<[_]>::len), Some(3));
/// assert!(sets.get("electron").is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SetTable {
    sets: BTreeMap<String, Vec<VariantTemplate>>,
}

impl Default for SetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SetTable {
    /// A table with no sets.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }

    /// The built-in sets: `browser`, `dependency`, `iife`, `node` and `cli`.
    #[must_use]
    pub fn builtin() -> Self {
        use OutputFormat::{Cjs, Esm, Iife, Umd};

        let cli_output = OutputEntry::Fragment(
            json!({"format": "cjs", "banner": CLI_BANNER})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        let mut table = Self::empty();
        table.insert(
            "browser",
            vec![
                VariantTemplate::new(None, &[Esm]),
                VariantTemplate::new(Some(Target::Modern), &[Umd, Esm]),
                VariantTemplate::new(Some(Target::Legacy), &[Umd]),
            ],
        );
        table.insert(
            "dependency",
            vec![
                VariantTemplate::new(Some(Target::Modern), &[Umd, Esm]),
                VariantTemplate::new(Some(Target::Legacy), &[Umd]),
            ],
        );
        table.insert(
            "iife",
            vec![
                VariantTemplate::new(Some(Target::Modern), &[Iife]),
                VariantTemplate::new(Some(Target::Legacy), &[Iife]),
            ],
        );
        table.insert("node", vec![VariantTemplate::new(Some(Target::Node), &[Cjs, Esm])]);
        table.insert(
            "cli",
            vec![VariantTemplate::new(Some(Target::Node), &[]).with_output(cli_output)],
        );
        table
    }

    /// Parse sets from a JSON object of template arrays.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MalformedConfig`] when `value` is not an
    /// object of arrays, or the error of any template that fails to parse.
    pub fn from_value(value: Value) -> ConfgenResult<Self> {
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(ConfgenError::malformed_config(format!(
                    "sets must be an object, found {}",
                    describe(&other)
                )));
            }
        };
        let mut table = Self::empty();
        for (name, raw) in entries {
            let Value::Array(items) = raw else {
                return Err(ConfgenError::malformed_config(format!(
                    "set '{name}' must be an array of templates"
                )));
            };
            let templates = items
                .into_iter()
                .map(VariantTemplate::from_value)
                .collect::<ConfgenResult<Vec<_>>>()?;
            table.insert(name, templates);
        }
        Ok(table)
    }

    /// Templates of the set called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[VariantTemplate]> {
        self.sets.get(name).map(Vec::as_slice)
    }

    /// Register `templates` under `name`, returning the set it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        templates: Vec<VariantTemplate>,
    ) -> Option<Vec<VariantTemplate>> {
        self.sets.insert(name.into(), templates)
    }

    /// Add every set of `other`, replacing same-named sets wholesale.
    pub fn extend(&mut self, other: Self) {
        self.sets.extend(other.sets);
    }

    /// Registered set names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Number of sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no sets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl<'de> Deserialize<'de> for SetTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Fan `config` out into one config per template, in template order.
///
/// # Errors
///
/// Returns [`ConfgenError::MalformedOutput`] when the caller's `output`
/// cannot be laid over template outputs (it must be a single fragment).
pub(crate) fn expand(
    config: &UserConfig,
    templates: &[VariantTemplate],
) -> ConfgenResult<Vec<UserConfig>> {
    templates
        .iter()
        .map(|template| expand_variant(config, template))
        .collect()
}

fn expand_variant(config: &UserConfig, template: &VariantTemplate) -> ConfgenResult<UserConfig> {
    let mut fields = template.fields.clone();
    merge_map(&mut fields, config.fields.clone(), ArrayStrategy::Concat);

    let output = match (&template.output, &config.output) {
        (Some(output), None) => Some(output.clone()),
        (None, overrides) => overrides.clone(),
        (Some(output), Some(user_output)) => {
            let overrides = single_fragment(user_output)?;
            let entries = output
                .clone()
                .into_entries()
                .into_iter()
                .map(|entry| entry.overlaid(overrides))
                .collect();
            Some(OutputSpec::from_entries(entries))
        }
    };

    Ok(UserConfig {
        set: config.set.clone(),
        target: config.target.clone().or_else(|| template.target.clone()),
        pkg: config.pkg.clone(),
        output,
        plugins: config.plugins.clone().or_else(|| template.plugins.clone()),
        fields,
    })
}

fn single_fragment(spec: &OutputSpec) -> ConfgenResult<&Map<String, Value>> {
    match spec {
        OutputSpec::Single(OutputEntry::Fragment(fragment)) => Ok(fragment),
        OutputSpec::Single(OutputEntry::Effect(_)) => Err(ConfgenError::malformed_output(
            "a set config's output must be an object, found a function",
        )),
        OutputSpec::List(_) => Err(ConfgenError::malformed_output(
            "a set config's output must be an object, found an array",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PipelineStage;
    use rstest::rstest;

    fn formats(config: &UserConfig) -> Vec<String> {
        config
            .output
            .clone()
            .map(OutputSpec::into_entries)
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| entry.as_fragment()?.get("format")?.as_str().map(str::to_owned))
            .collect()
    }

    #[rstest]
    #[case("browser", 3)]
    #[case("dependency", 2)]
    #[case("iife", 2)]
    #[case("node", 1)]
    #[case("cli", 1)]
    fn builtin_sets_have_expected_variants(#[case] name: &str, #[case] variants: usize) {
        let table = SetTable::builtin();
        assert_eq!(table.get(name).map(<[_]>::len), Some(variants));
    }

    #[test]
    fn expansion_keeps_template_order() {
        let table = SetTable::builtin();
        let templates = table.get("browser").expect("browser set");
        let variants = expand(&UserConfig::new().with_set("browser"), templates).expect("expands");
        let targets: Vec<_> = variants.iter().map(|v| v.target.clone()).collect();
        assert_eq!(targets, vec![None, Some(Target::Modern), Some(Target::Legacy)]);
        assert_eq!(formats(&variants[1]), vec!["umd", "esm"]);
        assert_eq!(formats(&variants[2]), vec!["umd"]);
    }

    #[test]
    fn caller_output_overlays_every_entry() {
        let table = SetTable::builtin();
        let templates = table.get("dependency").expect("dependency set");
        let config = UserConfig::new().with_output(
            json!({"banner": "X"}).as_object().cloned().unwrap_or_default(),
        );
        let variants = expand(&config, templates).expect("expands");
        for variant in &variants {
            let entries = variant.output.clone().map(OutputSpec::into_entries).unwrap_or_default();
            assert!(!entries.is_empty());
            for entry in entries {
                let fragment = entry.as_fragment().expect("fragment entry");
                assert_eq!(fragment.get("banner"), Some(&json!("X")));
            }
        }
        assert!(matches!(variants[1].output, Some(OutputSpec::Single(_))));
    }

    #[test]
    fn caller_fields_and_plugins_win() {
        let templates = vec![
            VariantTemplate::new(Some(Target::Node), &[OutputFormat::Cjs])
                .with_plugins(vec![PipelineStage::new("template")]),
        ];
        let config = UserConfig::new()
            .with_input("src/main.js")
            .with_plugins(vec![PipelineStage::new("caller")]);
        let variants = expand(&config, &templates).expect("expands");
        assert_eq!(variants[0].input(), Some("src/main.js"));
        assert_eq!(
            variants[0].plugins,
            Some(PluginSpec::Sequence(vec![PipelineStage::new("caller")]))
        );
    }

    #[test]
    fn list_overrides_are_rejected_for_sets() {
        let templates = SetTable::builtin();
        let config = UserConfig::new().with_output(vec![OutputEntry::Fragment(Map::new())]);
        let err = expand(&config, templates.get("node").expect("node set")).expect_err("list");
        assert!(matches!(&*err, ConfgenError::MalformedOutput { .. }));
    }

    #[test]
    fn user_sets_replace_builtins_wholesale() {
        let mut table = SetTable::builtin();
        let user = SetTable::from_value(json!({
            "browser": [{"target": "modern", "output": {"format": "esm"}}],
            "electron": [{"target": "electron"}],
        }))
        .expect("valid sets");
        table.extend(user);
        assert_eq!(table.get("browser").map(<[_]>::len), Some(1));
        assert!(table.get("electron").is_some());
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn malformed_sets_are_rejected() {
        let err = SetTable::from_value(json!({"browser": {"target": "modern"}})).expect_err("object set");
        assert_eq!(
            err.to_string(),
            "malformed config: set 'browser' must be an array of templates"
        );
    }
}
