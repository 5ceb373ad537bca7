//! Library interface for the `rollup-confgen` command.
//!
//! The command reads a config document, layers its settings, runs the
//! generator and prints the generated configs as JSON.

pub mod cli;
pub mod document;
pub mod error;
pub mod fs;
pub mod settings;

use std::io::Write;

use rollup_confgen::{Generator, GeneratorOptions, Globals};
use tracing::debug;

use crate::cli::Args;
use crate::document::ConfigDocument;
use crate::error::CliError;
use crate::settings::Settings;

/// Generate configs for `args` and write them to `out`.
///
/// `node_env` is the value of `NODE_ENV`, consulted only when no settings
/// layer chooses a build mode.
///
/// # Errors
///
/// Returns a [`CliError`] when settings, files, generation or writing fail.
pub fn run<W: Write>(args: &Args, node_env: Option<&str>, out: &mut W) -> Result<(), CliError> {
    let settings = Settings::load(args)?;
    let config_path = settings.config_path()?;
    let document = ConfigDocument::from_value(fs::read_json(config_path)?)?;
    debug!(path = %config_path, configs = document.configs.len(), "read config document");

    let generator = build_generator(&settings, &document, node_env)?;
    let globals = load_globals(&settings, document.globals)?;
    let created = generator.create_with_globals(document.configs, &globals)?;

    let json = if settings.compact {
        serde_json::to_string(&created)?
    } else {
        serde_json::to_string_pretty(&created)?
    };
    writeln!(out, "{json}").map_err(CliError::Write)
}

fn build_generator(
    settings: &Settings,
    document: &ConfigDocument,
    node_env: Option<&str>,
) -> Result<Generator, CliError> {
    let mut options = match &document.options {
        Some(overrides) => GeneratorOptions::from_overrides(overrides.clone())?,
        None => GeneratorOptions::default(),
    };
    if let Some(output_dir) = &settings.output_dir {
        options.output_dir.clone_from(output_dir);
    }
    let document_sets_mode = document
        .options
        .as_ref()
        .is_some_and(|overrides| overrides.get("mode").is_some());
    if settings.mode.is_some() || !document_sets_mode {
        options.mode = settings.resolve_mode(node_env);
    }

    let mut builder = Generator::builder().options(options);
    if let Some(base) = &document.base {
        builder = builder.base(base.clone());
    }
    if let Some(sets) = &document.sets {
        builder = builder.sets(sets.clone());
    }
    builder = if settings.no_package {
        builder.without_package()
    } else if let Some(dir) = &settings.package_dir {
        builder.package_dir(dir.clone())
    } else {
        builder
    };
    builder.build().map_err(CliError::from)
}

fn load_globals(settings: &Settings, from_document: Option<Globals>) -> Result<Globals, CliError> {
    match &settings.globals {
        Some(path) => Ok(Globals::from_value(fs::read_json(path)?)?),
        None => Ok(from_document.unwrap_or_default()),
    }
}
