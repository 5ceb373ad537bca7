//! Shared fixtures for generator integration tests.

use anyhow::{Context, Result, anyhow};
use rollup_confgen::{BuildMode, ConfgenResult, GeneratedConfig, Generator, OneOrMany, Package};
use serde_json::{Map, Value};

/// A scoped package with one dependency, an author and a homepage.
pub fn sample_package() -> Package {
    Package::new("@acme/widget")
        .with_dependency("lodash", "^4.17.0")
        .with_field("author", "Ada Lovelace")
        .with_field("homepage", "https://example.com/widget")
}

/// A generator for [`sample_package`] in `mode`.
pub fn generator_for(mode: BuildMode) -> Result<Generator> {
    Generator::builder()
        .package(sample_package())
        .mode(mode)
        .build()
        .map_err(|err| anyhow!(err.to_string()))
}

/// Convert a library result for `?` in `anyhow` tests.
pub fn lift<T>(result: ConfgenResult<T>) -> Result<T> {
    result.map_err(|err| anyhow!(err.to_string()))
}

/// Unwrap a JSON object literal.
pub fn object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("expected a JSON object, found {other}")),
    }
}

/// The only generated config, failing when there are several.
pub fn single(created: &OneOrMany<GeneratedConfig>) -> Result<&GeneratedConfig> {
    created
        .one()
        .with_context(|| format!("expected one config, got {}", created.len()))
}
