//! Config documents read from `--config`.
//!
//! A document is one user config, an array of them, or a project object
//! whose `configs` field holds them alongside generator-level `base`,
//! `sets`, `options` and `globals`.

use rollup_confgen::{Globals, SetTable, UserConfig};
use serde_json::{Map, Value};

use crate::error::CliError;

/// Everything a config document can carry.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    /// Configs to generate from, in order.
    pub configs: Vec<UserConfig>,
    /// Overrides for the base defaults.
    pub base: Option<Value>,
    /// Sets added to the built-ins.
    pub sets: Option<SetTable>,
    /// Generator option overrides.
    pub options: Option<Value>,
    /// Static per-format output overrides.
    pub globals: Option<Globals>,
}

impl ConfigDocument {
    /// Interpret a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Document`] for unsupported shapes and
    /// [`CliError::Generate`] for malformed configs, sets or globals.
    pub fn from_value(value: Value) -> Result<Self, CliError> {
        match value {
            Value::Array(items) => Ok(Self {
                configs: parse_configs(items)?,
                ..Self::default()
            }),
            Value::Object(map) if map.contains_key("configs") => Self::from_project(map),
            single @ Value::Object(_) => Ok(Self {
                configs: vec![UserConfig::from_value(single)?],
                ..Self::default()
            }),
            other => Err(CliError::Document(format!(
                "expected an object or an array, found {other}"
            ))),
        }
    }

    fn from_project(mut map: Map<String, Value>) -> Result<Self, CliError> {
        let configs = match map.shift_remove("configs") {
            Some(Value::Array(items)) => parse_configs(items)?,
            Some(single @ Value::Object(_)) => vec![UserConfig::from_value(single)?],
            _ => {
                return Err(CliError::Document(
                    "`configs` must be an object or an array".to_owned(),
                ));
            }
        };
        let sets = map.shift_remove("sets").map(SetTable::from_value).transpose()?;
        let globals = map.shift_remove("globals").map(Globals::from_value).transpose()?;
        let document = Self {
            configs,
            base: map.shift_remove("base"),
            sets,
            options: map.shift_remove("options"),
            globals,
        };
        if let Some(unknown) = map.keys().next() {
            return Err(CliError::Document(format!("unknown field `{unknown}`")));
        }
        Ok(document)
    }
}

fn parse_configs(items: Vec<Value>) -> Result<Vec<UserConfig>, CliError> {
    items
        .into_iter()
        .map(|item| UserConfig::from_value(item).map_err(CliError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn single_configs_are_documents() {
        let document = ConfigDocument::from_value(json!({"type": "cli"})).expect("single config");
        assert_eq!(document.configs.len(), 1);
        assert!(document.base.is_none());
    }

    #[rstest]
    fn project_documents_carry_generator_settings() {
        let document = ConfigDocument::from_value(json!({
            "configs": [{"type": "node"}, {"input": "src/extra.js"}],
            "base": {"external": ["react"]},
            "sets": {"web": [{"target": "modern", "output": {"format": "esm"}}]},
            "options": {"output_dir": "build"},
            "globals": {"umd": {"name": "Widget"}},
        }))
        .expect("project document");
        assert_eq!(document.configs.len(), 2);
        assert!(document.sets.is_some_and(|sets| sets.get("web").is_some()));
        assert_eq!(document.globals.map(|globals| globals.len()), Some(1));
    }

    #[rstest]
    #[case(json!("cli"), "malformed config document: expected an object or an array, found \"cli\"")]
    #[case(json!({"configs": 3}), "malformed config document: `configs` must be an object or an array")]
    #[case(json!({"configs": [], "plugins": []}), "malformed config document: unknown field `plugins`")]
    #[case(json!([{"output": 1}]), "malformed output: expected an object, found a number")]
    fn bad_documents_are_rejected(#[case] value: Value, #[case] expected: &str) {
        let err = ConfigDocument::from_value(value).expect_err("bad document");
        assert_eq!(err.to_string(), expected);
    }
}
