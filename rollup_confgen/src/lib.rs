//! Configuration generator for a JavaScript module bundler.
//!
//! A [`Generator`] expands small user intents ("build this file for
//! browsers", "build this as a command-line entry point") into complete
//! bundler configs: module format, output path, banner and plugin pipeline
//! for every target/format combination.
//!
//! ```rust
//! use rollup_confgen::{BuildMode, Generator, Package, UserConfig};
//!
//! let generator = Generator::builder()
//!     .package(Package::new("tool"))
//!     .mode(BuildMode::Production)
//!     .build()
//!     .expect("package supplied");
//! let config = UserConfig::from_json_str(
//!     r#"{"type": "cli", "input": "src/cli.js", "output": {"file": "bin/tool.js"}}"#,
//! )
//! .expect("valid config");
//! let created = generator.create([config]).expect("cli config");
//! let config = created.one().expect("one variant");
//! assert_eq!(config.outputs()[0].file, "bin/tool.js");
//! assert_eq!(config.stage_names(), ["node-resolve", "commonjs", "babel", "terser"]);
//! ```
//!
//! Nothing here executes a build; the configs are handed to the bundler.

pub mod banner;
mod config;
mod error;
mod generator;
mod hooks;
pub mod merge;
mod one_or_many;
mod options;
pub mod output;
mod package;
mod plugins;
mod result_ext;
mod sets;
mod target;

pub use config::{BaseConfig, GeneratedConfig, RESERVED_FIELDS, UserConfig};
pub use error::{ConfgenError, ConfgenResult, HookError, HookKind};
pub use generator::{Generator, GeneratorBuilder};
pub use hooks::{HookResult, Hooks, OutputHook, PluginHook};
pub use one_or_many::OneOrMany;
pub use options::{BuildMode, DEFAULT_OUTPUT_DIR, GeneratorOptions};
pub use output::{Globals, OutputDescriptor, OutputEntry, OutputFormat, OutputSpec};
pub use package::{PACKAGE_FILE, Package};
pub use plugins::{
    INTEROP_STAGE, MINIFY_STAGE, PipelineStage, PluginSlots, PluginSpec, RESOLVE_STAGE,
    TRANSFORM_STAGE,
};
pub use result_ext::ConfgenResultExt;
pub use sets::{CLI_BANNER, SetTable, VariantTemplate};
pub use target::{
    DEFAULT_NODE_VERSION, LEGACY_BROWSERS, MODERN_BROWSERS, Target, TargetProfile,
};
