//! The package descriptor (`package.json`) consulted for names, dependency
//! lists, entry-point paths and banner metadata.

use std::borrow::Cow;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfgenError, ConfgenResult};
use crate::result_ext::ConfgenResultExt;

/// File name the descriptor is discovered under.
pub const PACKAGE_FILE: &str = "package.json";

/// A parsed package descriptor.
///
/// Only `name` and `dependencies` are modelled explicitly; every other field
/// is kept verbatim so entry-point lookups and banners can reach it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, possibly scoped (`@scope/name`).
    pub name: String,
    /// Runtime dependencies, in declaration order.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub dependencies: Map<String, Value>,
    /// All remaining descriptor fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Package {
    /// Create a descriptor with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a dependency entry.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependencies
            .insert(name.into(), Value::String(version.into()));
        self
    }

    /// Set an arbitrary descriptor field such as `main` or `author`.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse a descriptor from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::Json`] when the text is not a valid descriptor.
    pub fn from_json(text: &str) -> ConfgenResult<Self> {
        serde_json::from_str(text).into_confgen()
    }

    /// Read `package.json` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::Package`] when the directory or file cannot be
    /// opened, read or parsed.
    pub fn discover(dir: &Utf8Path) -> ConfgenResult<Self> {
        let path = dir.join(PACKAGE_FILE);
        debug!(path = %path, "reading package descriptor");
        let root = Dir::open_ambient_dir(dir, ambient_authority())
            .map_err(|e| ConfgenError::package(&path, e))?;
        let text = root
            .read_to_string(PACKAGE_FILE)
            .map_err(|e| ConfgenError::package(&path, e))?;
        serde_json::from_str(&text).map_err(|e| ConfgenError::package(&path, e))
    }

    /// Read `package.json` from the process working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::Package`] when the working directory cannot be
    /// determined or the descriptor cannot be loaded.
    pub fn discover_in_cwd() -> ConfgenResult<Self> {
        let native_cwd = std::env::current_dir()
            .map_err(|e| ConfgenError::package(Utf8Path::new(PACKAGE_FILE), e))?;
        let cwd = Utf8PathBuf::from_path_buf(native_cwd).map_err(|p| {
            ConfgenError::package(
                Utf8Path::new(PACKAGE_FILE),
                format!("working directory {} is not valid UTF-8", p.display()),
            )
        })?;
        Self::discover(&cwd)
    }

    /// The package name without its scope.
    ///
    /// ```rust
    /// use rollup_confgen::Package;
    ///
    /// assert_eq!(Package::new("@brikcss/element").short_name(), "element");
    /// assert_eq!(Package::new("hyperhtml").short_name(), "hyperhtml");
    /// ```
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name.split('/').nth(1).unwrap_or(&self.name)
    }

    /// Names of the declared dependencies, in declaration order.
    #[must_use]
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.keys().cloned().collect()
    }

    /// A string-valued descriptor field. `name` resolves to the package name.
    #[must_use]
    pub fn field_str(&self, key: &str) -> Option<&str> {
        if key == "name" {
            return Some(&self.name);
        }
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Render a descriptor field for display, as banners do.
    ///
    /// Person objects (`{name, email, url}`) render as `name <email> (url)`.
    /// Missing, `null`, `false` and empty-string fields render as `None`.
    #[must_use]
    pub fn display_field(&self, key: &str) -> Option<Cow<'_, str>> {
        if key == "name" {
            return Some(Cow::Borrowed(&self.name));
        }
        match self.fields.get(key)? {
            Value::Null | Value::Bool(false) => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(Cow::Borrowed(text)),
            Value::Object(person) if person.contains_key("name") => {
                Some(Cow::Owned(render_person(person)))
            }
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

fn render_person(person: &Map<String, Value>) -> String {
    let mut rendered = person
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    if let Some(email) = person.get("email").and_then(Value::as_str) {
        rendered.push_str(&format!(" <{email}>"));
    }
    if let Some(url) = person.get("url").and_then(Value::as_str) {
        rendered.push_str(&format!(" ({url})"));
    }
    rendered
}
