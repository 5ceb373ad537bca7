//! Command-line interface definitions for `rollup-confgen`.

use camino::Utf8PathBuf;
use clap::Parser;
use rollup_confgen::BuildMode;
use serde::Serialize;

/// Settings file read from the working directory unless `--settings` names
/// another.
pub const DEFAULT_SETTINGS_FILE: &str = "rollup-confgen.toml";

/// Parsed CLI arguments for `rollup-confgen`.
///
/// Flags left unset do not override settings from the file or environment.
#[derive(Debug, Clone, Default, Parser, Serialize)]
#[command(name = "rollup-confgen")]
#[command(about = "Print generated Rollup configurations as JSON")]
#[command(version)]
pub struct Args {
    /// JSON file holding one config, a list of configs, or a project
    /// document with `configs`, `base`, `sets`, `options` and `globals`.
    #[arg(long, value_name = "path")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Utf8PathBuf>,
    /// JSON object of per-format output overrides.
    #[arg(long, value_name = "path")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globals: Option<Utf8PathBuf>,
    /// Build mode; falls back to `NODE_ENV` when no layer sets one.
    #[arg(long, value_name = "development|production|test")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BuildMode>,
    /// Directory holding `package.json` (defaults to the working directory).
    #[arg(long, value_name = "path")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_dir: Option<Utf8PathBuf>,
    /// Generate without reading any `package.json`.
    #[arg(long = "no-package")]
    #[serde(rename = "no_package", skip_serializing_if = "std::ops::Not::not")]
    pub is_detached: bool,
    /// Root directory for synthesised output paths.
    #[arg(long, value_name = "path")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<Utf8PathBuf>,
    /// Print JSON on a single line.
    #[arg(long = "compact")]
    #[serde(rename = "compact", skip_serializing_if = "std::ops::Not::not")]
    pub is_compact: bool,
    /// Settings file layered beneath environment variables and flags.
    #[arg(long, value_name = "path", default_value = DEFAULT_SETTINGS_FILE)]
    #[serde(skip)]
    pub settings: Utf8PathBuf,
}
