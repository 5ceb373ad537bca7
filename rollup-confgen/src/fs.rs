//! Filesystem helpers for reading settings and config documents.

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde_json::Value;

use crate::error::CliError;

fn io_error(path: &Utf8Path, source: io::Error) -> CliError {
    CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn split(path: &Utf8Path) -> Result<(&Utf8Path, &str), CliError> {
    let name = path.file_name().ok_or_else(|| {
        io_error(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path does not name a file"),
        )
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    Ok((parent, name))
}

/// Read a file to a string.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the file cannot be opened or read.
pub fn read_to_string(path: &Utf8Path) -> Result<String, CliError> {
    let (parent, name) = split(path)?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| io_error(path, e))?;
    dir.read_to_string(name).map_err(|e| io_error(path, e))
}

/// Read a file that may be absent, returning `None` when it is missing.
///
/// # Errors
///
/// Returns [`CliError::Io`] for failures other than the file not existing.
pub fn read_optional(path: &Utf8Path) -> Result<Option<String>, CliError> {
    match read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(CliError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Read and parse a JSON file.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the file cannot be read and
/// [`CliError::Json`] when it is not valid JSON.
pub fn read_json(path: &Utf8Path) -> Result<Value, CliError> {
    let text = read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}
