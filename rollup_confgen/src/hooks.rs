//! Caller-supplied lifecycle hooks.
//!
//! Hooks are registered once when the generator is built and run
//! synchronously during every `create` call. A hook that returns an error
//! aborts generation with [`crate::ConfgenError::Hook`]; the generator makes
//! no attempt to recover.

use std::fmt;
use std::sync::Arc;

use crate::config::UserConfig;
use crate::error::{ConfgenResult, HookError, HookKind};
use crate::output::OutputDescriptor;
use crate::plugins::PipelineStage;
use crate::result_ext::HookResultExt;

/// Result type returned by hooks.
pub type HookResult<T> = Result<T, HookError>;

/// Hook contributing pipeline stages for a config.
pub type PluginHook = Arc<dyn Fn(&UserConfig) -> HookResult<Vec<PipelineStage>> + Send + Sync>;

/// Hook replacing each resolved output.
pub type OutputHook =
    Arc<dyn Fn(OutputDescriptor, &UserConfig) -> HookResult<OutputDescriptor> + Send + Sync>;

/// The set of registered hooks.
///
/// ```rust
/// use rollup_confgen::{Hooks, PipelineStage};
///
/// let hooks = Hooks::new()
///     .on_insert_plugins(|_config| Ok(vec![PipelineStage::new("json")]))
///     .on_output(|mut output, _config| {
///         output.compact = Some(true);
///         Ok(output)
///     });
/// assert!(hooks.has_output());
/// ```
#[derive(Clone, Default)]
pub struct Hooks {
    prepend_plugins: Option<PluginHook>,
    insert_plugins: Option<PluginHook>,
    append_plugins: Option<PluginHook>,
    output: Option<OutputHook>,
}

impl Hooks {
    /// No hooks registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages placed at the very start of the pipeline.
    #[must_use]
    pub fn on_prepend_plugins<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UserConfig) -> HookResult<Vec<PipelineStage>> + Send + Sync + 'static,
    {
        self.prepend_plugins = Some(Arc::new(hook));
        self
    }

    /// Stages placed after module resolution, before the transform.
    #[must_use]
    pub fn on_insert_plugins<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UserConfig) -> HookResult<Vec<PipelineStage>> + Send + Sync + 'static,
    {
        self.insert_plugins = Some(Arc::new(hook));
        self
    }

    /// Stages placed after the transform, before minification.
    #[must_use]
    pub fn on_append_plugins<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UserConfig) -> HookResult<Vec<PipelineStage>> + Send + Sync + 'static,
    {
        self.append_plugins = Some(Arc::new(hook));
        self
    }

    /// Final say over every resolved output.
    #[must_use]
    pub fn on_output<F>(mut self, hook: F) -> Self
    where
        F: Fn(OutputDescriptor, &UserConfig) -> HookResult<OutputDescriptor> + Send + Sync + 'static,
    {
        self.output = Some(Arc::new(hook));
        self
    }

    /// Whether an output hook is registered.
    #[must_use]
    pub const fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub(crate) fn run_prepend_plugins(&self, config: &UserConfig) -> ConfgenResult<Vec<PipelineStage>> {
        run_plugin_hook(self.prepend_plugins.as_ref(), config, HookKind::PrependPlugins)
    }

    pub(crate) fn run_insert_plugins(&self, config: &UserConfig) -> ConfgenResult<Vec<PipelineStage>> {
        run_plugin_hook(self.insert_plugins.as_ref(), config, HookKind::InsertPlugins)
    }

    pub(crate) fn run_append_plugins(&self, config: &UserConfig) -> ConfgenResult<Vec<PipelineStage>> {
        run_plugin_hook(self.append_plugins.as_ref(), config, HookKind::AppendPlugins)
    }

    pub(crate) fn run_output(
        &self,
        output: OutputDescriptor,
        config: &UserConfig,
    ) -> ConfgenResult<OutputDescriptor> {
        match &self.output {
            Some(hook) => hook(output, config).for_hook(HookKind::Output),
            None => Ok(output),
        }
    }
}

fn run_plugin_hook(
    hook: Option<&PluginHook>,
    config: &UserConfig,
    kind: HookKind,
) -> ConfgenResult<Vec<PipelineStage>> {
    hook.map_or_else(|| Ok(Vec::new()), |run| run(config).for_hook(kind))
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("prepend_plugins", &self.prepend_plugins.is_some())
            .field("insert_plugins", &self.insert_plugins.is_some())
            .field("append_plugins", &self.append_plugins.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}
