//! Module formats an output can be packaged as.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfgenError;
use crate::target::Target;

/// Packaging style of an output artefact.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CommonJS, for server runtimes.
    #[serde(alias = "commonjs")]
    Cjs,
    /// ES modules.
    #[serde(alias = "es", alias = "module")]
    Esm,
    /// Universal module definition.
    Umd,
    /// Immediately invoked function expression, for script tags.
    Iife,
    /// Asynchronous module definition.
    Amd,
    /// `SystemJS` modules.
    #[serde(alias = "systemjs")]
    System,
}

impl OutputFormat {
    /// Canonical name, as used in `pkg_map` and globals keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cjs => "cjs",
            Self::Esm => "esm",
            Self::Umd => "umd",
            Self::Iife => "iife",
            Self::Amd => "amd",
            Self::System => "system",
        }
    }

    /// Format used when an output does not choose one: server builds
    /// (numeric targets) get CommonJS, everything else ES modules.
    #[must_use]
    pub fn default_for(target: Option<&Target>) -> Self {
        if target.is_some_and(Target::is_numeric) {
            Self::Cjs
        } else {
            Self::Esm
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cjs" | "commonjs" => Ok(Self::Cjs),
            "esm" | "es" | "module" => Ok(Self::Esm),
            "umd" => Ok(Self::Umd),
            "iife" => Ok(Self::Iife),
            "amd" => Ok(Self::Amd),
            "system" | "systemjs" => Ok(Self::System),
            other => Err(ConfgenError::UnknownFormat {
                format: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("es", OutputFormat::Esm)]
    #[case("commonjs", OutputFormat::Cjs)]
    #[case("iife", OutputFormat::Iife)]
    #[case("systemjs", OutputFormat::System)]
    fn parses_aliases(#[case] name: &str, #[case] expected: OutputFormat) {
        assert_eq!(name.parse::<OutputFormat>().expect("known format"), expected);
    }

    #[test]
    fn rejects_unknown_formats() {
        let err = "wasm".parse::<OutputFormat>().expect_err("unknown format");
        assert_eq!(err.to_string(), "unknown output format 'wasm'");
    }

    #[rstest]
    #[case(None, OutputFormat::Esm)]
    #[case(Some(Target::Modern), OutputFormat::Esm)]
    #[case(Some(Target::Node), OutputFormat::Esm)]
    #[case(Some(Target::parse("8")), OutputFormat::Cjs)]
    fn defaults_follow_target(#[case] target: Option<Target>, #[case] expected: OutputFormat) {
        assert_eq!(OutputFormat::default_for(target.as_ref()), expected);
    }
}
