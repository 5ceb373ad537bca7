//! Resolution of user output entries into complete descriptors.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tracing::trace;

use super::{Globals, OutputDescriptor, OutputEntry, OutputFormat};
use crate::OneOrMany;
use crate::banner::{default_banner_keys, render_banner};
use crate::config::UserConfig;
use crate::error::{ConfgenError, ConfgenResult, describe};
use crate::hooks::Hooks;
use crate::merge::{ArrayStrategy, merge_map};
use crate::options::GeneratorOptions;
use crate::target::Target;

/// Marker inserted into legacy file names.
const LEGACY_MARKER: &str = "legacy";
/// Marker stripped from file names rewritten for legacy builds.
const MODERN_SUFFIX: &str = ".modern";

/// Everything output resolution reads besides the config itself.
pub(crate) struct OutputContext<'a> {
    pub(crate) defaults: &'a Map<String, Value>,
    pub(crate) options: &'a GeneratorOptions,
    pub(crate) hooks: &'a Hooks,
    pub(crate) globals: &'a Globals,
}

/// Resolve every entry of `config.output`, in order.
///
/// The output field is taken out of `config`; side-effect entries may mutate
/// the rest of the config before later entries resolve.
pub(crate) fn normalize_outputs(
    config: &mut UserConfig,
    ctx: &OutputContext<'_>,
) -> ConfgenResult<OneOrMany<OutputDescriptor>> {
    let entries = config
        .output
        .take()
        .map_or_else(|| vec![OutputEntry::Fragment(Map::new())], |spec| spec.into_entries());
    if entries.is_empty() {
        return Err(ConfgenError::malformed_output("output list is empty"));
    }
    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        let fragment = match entry {
            OutputEntry::Fragment(fragment) => fragment,
            OutputEntry::Effect(effect) => {
                effect(config);
                Map::new()
            }
        };
        resolved.push(resolve_entry(fragment, config, ctx)?);
    }
    Ok(OneOrMany::collapse(resolved))
}

fn resolve_entry(
    fragment: Map<String, Value>,
    config: &UserConfig,
    ctx: &OutputContext<'_>,
) -> ConfgenResult<OutputDescriptor> {
    let mut entry = ctx.defaults.clone();
    merge_map(&mut entry, fragment, ArrayStrategy::Concat);

    let format = resolve_format(&entry, config.target.as_ref())?;
    entry.insert("format".to_owned(), Value::String(format.as_str().to_owned()));

    let mut file = match non_empty_str(&entry, "file") {
        Some(file) => Utf8PathBuf::from(file),
        None => resolve_file(format, config, ctx.options)?,
    };
    if config.target == Some(Target::Legacy) {
        file = disambiguate_legacy(&file);
    }
    entry.insert("file".to_owned(), Value::String(file.into_string()));

    if non_empty_str(&entry, "banner").is_none()
        && let Some(pkg) = &config.pkg
    {
        let banner = render_banner(pkg, &default_banner_keys());
        entry.insert("banner".to_owned(), Value::String(banner));
    }

    if let Some(overrides) = ctx.globals.get(format.as_str()) {
        let computed = overrides.resolve(&entry, config)?;
        merge_map(&mut entry, computed, ArrayStrategy::Concat);
    }

    if let Some(target) = &config.target {
        let key = format!("{format}:{target}");
        if let Some(overrides) = ctx.globals.get(&key) {
            let mut merged = overrides.resolve(&entry, config)?;
            merge_map(&mut merged, entry, ArrayStrategy::Concat);
            entry = merged;
        }
    }

    let resolved = OutputDescriptor::from_fragment(entry)?;
    trace!(format = %resolved.format, file = %resolved.file, "resolved output");
    let descriptor = ctx.hooks.run_output(resolved, config)?;
    descriptor.validate()?;
    Ok(descriptor)
}

fn resolve_format(entry: &Map<String, Value>, target: Option<&Target>) -> ConfgenResult<OutputFormat> {
    match entry.get("format") {
        None | Some(Value::Null) => Ok(OutputFormat::default_for(target)),
        Some(Value::String(format)) if format.is_empty() => Ok(OutputFormat::default_for(target)),
        Some(Value::String(format)) => Ok(format.parse()?),
        Some(other) => Err(ConfgenError::malformed_output(format!(
            "format must be a string, found {}",
            describe(other)
        ))),
    }
}

fn non_empty_str<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

/// Pick an output path for `format`: the package entry point mapped for
/// `format:target` (or `format`), else `{output_dir}/{format}/{name}.js`.
fn resolve_file(
    format: OutputFormat,
    config: &UserConfig,
    options: &GeneratorOptions,
) -> ConfgenResult<Utf8PathBuf> {
    let targeted = config
        .target
        .as_ref()
        .map(|target| format!("{format}:{target}"));
    let field = targeted
        .as_deref()
        .and_then(|key| options.pkg_map.get(key))
        .or_else(|| options.pkg_map.get(format.as_str()));
    if let (Some(field), Some(pkg)) = (field, &config.pkg)
        && let Some(path) = pkg.field_str(field).filter(|path| !path.is_empty())
    {
        return Ok(Utf8PathBuf::from(path));
    }

    let base_name = match &config.pkg {
        Some(pkg) => pkg.short_name().to_owned(),
        None => config
            .input()
            .map(Utf8Path::new)
            .and_then(Utf8Path::file_stem)
            .filter(|stem| !stem.is_empty())
            .ok_or(ConfgenError::MissingInput)?
            .to_owned(),
    };
    Ok(options
        .output_dir
        .join(format.as_str())
        .join(format!("{base_name}.js")))
}

/// Rewrite `file` for a legacy build so it cannot collide with its modern
/// sibling: `x.js` and `x.modern.js` both become `x.legacy.js`. Paths that
/// already mention "legacy" are returned unchanged.
///
/// ```rust
/// use camino::Utf8Path;
/// use rollup_confgen::output::disambiguate_legacy;
///
/// assert_eq!(disambiguate_legacy(Utf8Path::new("dist/umd/x.js")), "dist/umd/x.legacy.js");
/// assert_eq!(disambiguate_legacy(Utf8Path::new("dist/umd/x.modern.js")), "dist/umd/x.legacy.js");
/// ```
#[must_use]
pub fn disambiguate_legacy(file: &Utf8Path) -> Utf8PathBuf {
    if file.as_str().contains(LEGACY_MARKER) {
        return file.to_path_buf();
    }
    let Some(file_name) = file.file_name() else {
        return file.to_path_buf();
    };
    let name = file_name.replacen(MODERN_SUFFIX, "", 1);
    let renamed = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => format!("{stem}.{LEGACY_MARKER}.{extension}"),
        _ => format!("{name}.{LEGACY_MARKER}"),
    };
    file.with_file_name(renamed)
}
