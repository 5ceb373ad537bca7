//! Generator-wide options and the build mode.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfgenResult;
use crate::merge::{MergeOptions, merge};
use crate::result_ext::ConfgenResultExt;

/// Default root directory for synthesised output paths.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Whether the build is optimised for shipping.
///
/// Production-like modes minify and emit compact code without source maps.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Readable output with source maps.
    #[default]
    Development,
    /// Minified, compact output.
    Production,
    /// Built like production, so tests exercise the shipped pipeline.
    Test,
}

impl BuildMode {
    /// Whether this mode builds like production.
    #[must_use]
    pub const fn is_production_like(self) -> bool {
        matches!(self, Self::Production | Self::Test)
    }

    /// Map a `NODE_ENV`-style value onto a mode. Anything other than
    /// `production` or `test` is development.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown build mode '{other}'")),
        }
    }
}

/// Options shared by every config a generator produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Root directory for synthesised output paths. Empty means paths start
    /// at the format directory.
    pub output_dir: Utf8PathBuf,
    /// Maps `format` or `format:target` to the package descriptor field
    /// holding that output's path.
    pub pkg_map: BTreeMap<String, String>,
    /// Build mode.
    pub mode: BuildMode,
    /// Overrides deep-merged into the transform stage options.
    pub transform: Map<String, Value>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        let pkg_map = [
            ("esm", "module"),
            ("esm:modern", "browser"),
            ("cjs", "main"),
            ("umd", "umd"),
            ("cli", "bin"),
        ]
        .into_iter()
        .map(|(key, field)| (key.to_owned(), field.to_owned()))
        .collect();
        Self {
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            pkg_map,
            mode: BuildMode::default(),
            transform: Map::new(),
        }
    }
}

impl GeneratorOptions {
    /// Deep-merge partial `overrides` over the defaults, so a `pkg_map`
    /// override adds to the default entries rather than replacing them.
    ///
    /// ```rust
    /// use rollup_confgen::GeneratorOptions;
    /// use serde_json::json;
    ///
    /// let options = GeneratorOptions::from_overrides(json!({
    ///     "output_dir": "build",
    ///     "pkg_map": {"iife": "unpkg"},
    /// }))
    /// .expect("valid overrides");
    /// assert_eq!(options.output_dir, "build");
    /// assert_eq!(options.pkg_map.get("iife").map(String::as_str), Some("unpkg"));
    /// assert_eq!(options.pkg_map.get("cjs").map(String::as_str), Some("main"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfgenError::Json`] when the merged options do not
    /// deserialise.
    pub fn from_overrides(overrides: Value) -> ConfgenResult<Self> {
        let defaults = serde_json::to_value(Self::default()).into_confgen()?;
        let merged = merge([defaults, overrides], &MergeOptions::overwrite());
        serde_json::from_value(merged).into_confgen()
    }

    /// Set the build mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the output root.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<Utf8PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Add or replace a `pkg_map` entry.
    #[must_use]
    pub fn with_pkg_map_entry(mut self, key: impl Into<String>, field: impl Into<String>) -> Self {
        self.pkg_map.insert(key.into(), field.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("production", BuildMode::Production)]
    #[case("test", BuildMode::Test)]
    #[case("development", BuildMode::Development)]
    #[case("staging", BuildMode::Development)]
    #[case("", BuildMode::Development)]
    fn env_values_map_to_modes(#[case] value: &str, #[case] expected: BuildMode) {
        assert_eq!(BuildMode::from_env_value(value), expected);
    }

    #[test]
    fn only_production_and_test_are_production_like() {
        assert!(BuildMode::Production.is_production_like());
        assert!(BuildMode::Test.is_production_like());
        assert!(!BuildMode::Development.is_production_like());
    }

    #[test]
    fn overrides_keep_unrelated_defaults() {
        let options = GeneratorOptions::from_overrides(json!({"mode": "production"}))
            .expect("valid overrides");
        assert_eq!(options.mode, BuildMode::Production);
        assert_eq!(options.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(options.pkg_map.len(), 5);
    }

    #[test]
    fn invalid_overrides_are_reported() {
        let err = GeneratorOptions::from_overrides(json!({"mode": "fast"})).expect_err("bad mode");
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
