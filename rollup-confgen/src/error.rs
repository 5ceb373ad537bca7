//! Error types for `rollup-confgen`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use rollup_confgen::ConfgenError;
use thiserror::Error;

/// Errors surfaced by the `rollup-confgen` command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings from the file, environment and flags did not combine.
    #[error("failed to load settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    /// No config file was named by any settings layer.
    #[error("no config file given; pass --config or set ROLLUP_CONFGEN_CONFIG")]
    MissingConfig,

    /// A file could not be opened or read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A file did not contain valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The config document does not have a supported shape.
    #[error("malformed config document: {0}")]
    Document(String),

    /// Generation failed.
    #[error(transparent)]
    Generate(#[from] Arc<ConfgenError>),

    /// Generated configs could not be encoded.
    #[error("failed to encode generated configs: {0}")]
    Encode(#[from] serde_json::Error),

    /// Generated configs could not be written.
    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),
}
