//! Extensions for mapping errors to `ConfgenResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| Arc::new(e.into()))`
//! patterns when converting external error types into the crate's
//! `ConfgenResult<T>` alias (`Result<T, Arc<ConfgenError>>`).
//!
//! # Examples
//!
//! ```
//! use rollup_confgen::{ConfgenResult, ConfgenResultExt};
//!
//! fn serialize() -> ConfgenResult<serde_json::Value> {
//!     // serde_json::Error implements Into<ConfgenError>
//!     serde_json::to_value(&42).into_confgen()
//! }
//! # serialize().expect("serializes");
//! ```

use std::sync::Arc;

use crate::error::{ConfgenError, ConfgenResult, HookError, HookKind};

/// Generic extension for mapping any `Result<T, E>` with `E: Into<ConfgenError>`
/// into a `ConfgenResult<T>`.
pub trait ConfgenResultExt<T, E> {
    /// Convert `Result<T, E>` into `ConfgenResult<T>` using `Into<ConfgenError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<ConfgenError>`.
    fn into_confgen(self) -> ConfgenResult<T>;
}

impl<T, E> ConfgenResultExt<T, E> for Result<T, E>
where
    E: Into<ConfgenError>,
{
    fn into_confgen(self) -> ConfgenResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Extension tailored to attributing caller-supplied callback failures.
pub(crate) trait HookResultExt<T> {
    /// Convert a hook result into a [`ConfgenError::Hook`] on failure.
    fn for_hook(self, hook: HookKind) -> ConfgenResult<T>;
}

impl<T> HookResultExt<T> for Result<T, HookError> {
    fn for_hook(self, hook: HookKind) -> ConfgenResult<T> {
        self.map_err(|source| ConfgenError::hook(hook, source))
    }
}
