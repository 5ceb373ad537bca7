//! Layered command settings.
//!
//! Precedence, lowest first: built-in defaults, the settings file,
//! `ROLLUP_CONFGEN_*` environment variables, then command-line flags. The
//! build mode falls back to `NODE_ENV` only when no layer sets it.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rollup_confgen::BuildMode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Args;
use crate::error::CliError;
use crate::fs::read_optional;

/// Prefix of environment variables read as settings.
pub const ENV_PREFIX: &str = "ROLLUP_CONFGEN_";

/// Effective settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Config document to generate from.
    pub config: Option<Utf8PathBuf>,
    /// Globals file.
    pub globals: Option<Utf8PathBuf>,
    /// Explicit build mode.
    pub mode: Option<BuildMode>,
    /// Directory holding `package.json`.
    pub package_dir: Option<Utf8PathBuf>,
    /// Generate without a package descriptor.
    pub no_package: bool,
    /// Root directory for synthesised output paths.
    pub output_dir: Option<Utf8PathBuf>,
    /// Print JSON on a single line.
    pub compact: bool,
}

impl Settings {
    /// Combine every layer for `args`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when the settings file exists but cannot be
    /// read, and [`CliError::Settings`] when the layers fail to extract.
    pub fn load(args: &Args) -> Result<Self, CliError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(text) = read_optional(&args.settings)? {
            debug!(path = %args.settings, "layering settings file");
            figment = figment.merge(Toml::string(&text));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(args))
            .extract()
            .map_err(|err| CliError::Settings(Box::new(err)))
    }

    /// The build mode: the explicit setting, else `node_env`, else
    /// development.
    #[must_use]
    pub fn resolve_mode(&self, node_env: Option<&str>) -> BuildMode {
        self.mode
            .or_else(|| node_env.map(BuildMode::from_env_value))
            .unwrap_or_default()
    }

    /// The config document path.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingConfig`] when no layer names one.
    pub fn config_path(&self) -> Result<&Utf8Path, CliError> {
        self.config.as_deref().ok_or(CliError::MissingConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;

    fn args(flags: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("rollup-confgen").chain(flags.iter().copied()))
            .expect("valid flags")
    }

    #[rstest]
    fn flags_beat_environment_and_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "rollup-confgen.toml",
                "config = \"file.json\"\noutput_dir = \"build\"\nmode = \"test\"",
            )?;
            jail.set_env("ROLLUP_CONFGEN_CONFIG", "env.json");
            jail.set_env("ROLLUP_CONFGEN_COMPACT", "true");

            let settings = Settings::load(&args(&["--mode", "production"]))
                .map_err(|err| err.to_string())?;
            assert_eq!(settings.config.as_deref(), Some(Utf8Path::new("env.json")));
            assert_eq!(settings.output_dir.as_deref(), Some(Utf8Path::new("build")));
            assert_eq!(settings.mode, Some(BuildMode::Production));
            assert!(settings.compact);
            Ok(())
        });
    }

    #[rstest]
    fn missing_settings_file_is_not_an_error() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let settings = Settings::load(&args(&[])).map_err(|err| err.to_string())?;
            assert_eq!(settings, Settings::default());
            assert!(matches!(settings.config_path(), Err(CliError::MissingConfig)));
            Ok(())
        });
    }

    #[rstest]
    #[case(None, None, BuildMode::Development)]
    #[case(None, Some("production"), BuildMode::Production)]
    #[case(None, Some("test"), BuildMode::Test)]
    #[case(None, Some("staging"), BuildMode::Development)]
    #[case(Some(BuildMode::Development), Some("production"), BuildMode::Development)]
    fn mode_falls_back_to_node_env(
        #[case] explicit: Option<BuildMode>,
        #[case] node_env: Option<&str>,
        #[case] expected: BuildMode,
    ) {
        let settings = Settings {
            mode: explicit,
            ..Settings::default()
        };
        assert_eq!(settings.resolve_mode(node_env), expected);
    }
}
