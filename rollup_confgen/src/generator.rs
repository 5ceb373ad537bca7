//! The generator: owns defaults, sets, options and hooks, and turns user
//! configs into bundler configs.

use camino::Utf8PathBuf;
use serde_json::Value;
use tracing::debug;

use crate::OneOrMany;
use crate::banner::{BannerKey, default_banner_keys, render_banner};
use crate::config::{BaseConfig, GeneratedConfig, UserConfig};
use crate::error::{ConfgenError, ConfgenResult};
use crate::hooks::Hooks;
use crate::merge::{ArrayStrategy, merge_map};
use crate::options::{BuildMode, GeneratorOptions};
use crate::output::{Globals, OutputContext, normalize_outputs};
use crate::package::Package;
use crate::plugins::assemble_pipeline;
use crate::sets::{SetTable, VariantTemplate, expand};

/// Where a generator's package descriptor comes from.
#[derive(Clone, Debug)]
enum PackageSource {
    /// Read `package.json` from a directory, or the working directory.
    Discover(Option<Utf8PathBuf>),
    /// Supplied by the caller.
    Provided(Package),
    /// No descriptor at all.
    Detached,
}

impl Default for PackageSource {
    fn default() -> Self {
        Self::Discover(None)
    }
}

/// Builds a [`Generator`].
///
/// ```rust
/// use rollup_confgen::{BuildMode, Generator, Package};
///
/// let generator = Generator::builder()
///     .package(Package::new("app"))
///     .mode(BuildMode::Production)
///     .build()
///     .expect("valid generator");
/// assert_eq!(generator.base().input(), Some("src/app.js"));
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct GeneratorBuilder {
    base: Option<Value>,
    sets: Option<SetTable>,
    options: GeneratorOptions,
    hooks: Hooks,
    package: PackageSource,
}

impl GeneratorBuilder {
    /// Deep-merge `base` over the built-in defaults.
    pub fn base(mut self, base: Value) -> Self {
        self.base = Some(base);
        self
    }

    /// Add user sets; same-named built-ins are replaced.
    pub fn sets(mut self, sets: SetTable) -> Self {
        self.sets.get_or_insert_with(SetTable::empty).extend(sets);
        self
    }

    /// Add or replace a single set.
    pub fn set(mut self, name: impl Into<String>, templates: Vec<VariantTemplate>) -> Self {
        self.sets
            .get_or_insert_with(SetTable::empty)
            .insert(name, templates);
        self
    }

    /// Replace the options wholesale.
    pub fn options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the build mode.
    pub const fn mode(mut self, mode: BuildMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Set the root directory for synthesised output paths.
    pub fn output_dir(mut self, output_dir: impl Into<Utf8PathBuf>) -> Self {
        self.options.output_dir = output_dir.into();
        self
    }

    /// Map `key` (`format` or `format:target`) to a descriptor field.
    pub fn pkg_map_entry(mut self, key: impl Into<String>, field: impl Into<String>) -> Self {
        self.options.pkg_map.insert(key.into(), field.into());
        self
    }

    /// Register hooks.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use `package` instead of reading one from disk.
    pub fn package(mut self, package: Package) -> Self {
        self.package = PackageSource::Provided(package);
        self
    }

    /// Read `package.json` from `dir` instead of the working directory.
    pub fn package_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.package = PackageSource::Discover(Some(dir.into()));
        self
    }

    /// Build without any package descriptor. Configs must then name their
    /// `input` or an explicit output `file`.
    pub fn without_package(mut self) -> Self {
        self.package = PackageSource::Detached;
        self
    }

    /// Finish construction, reading the package descriptor if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::Package`] when the descriptor cannot be read,
    /// and the errors of [`BaseConfig::with_overrides`] for a bad `base`.
    pub fn build(self) -> ConfgenResult<Generator> {
        let package = match self.package {
            PackageSource::Discover(None) => Some(Package::discover_in_cwd()?),
            PackageSource::Discover(Some(dir)) => Some(Package::discover(&dir)?),
            PackageSource::Provided(package) => Some(package),
            PackageSource::Detached => None,
        };
        let mut base = BaseConfig::defaults(package.as_ref(), self.options.mode);
        if let Some(overrides) = self.base {
            base = base.with_overrides(overrides)?;
        }
        let mut sets = SetTable::builtin();
        if let Some(user_sets) = self.sets {
            sets.extend(user_sets);
        }
        debug!(
            package = package.as_ref().map(|pkg| pkg.name.as_str()),
            mode = %self.options.mode,
            sets = sets.len(),
            "built generator"
        );
        Ok(Generator {
            base,
            sets,
            options: self.options,
            hooks: self.hooks,
            package,
        })
    }
}

/// Expands user configs into bundler configs.
///
/// A generator is immutable once built and may be shared between threads.
#[derive(Clone, Debug)]
pub struct Generator {
    base: BaseConfig,
    sets: SetTable,
    options: GeneratorOptions,
    hooks: Hooks,
    package: Option<Package>,
}

impl Generator {
    /// Start building a generator.
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::default()
    }

    /// Generate configs for `configs` without globals.
    ///
    /// # Errors
    ///
    /// See [`Self::create_with_globals`].
    pub fn create<I>(&self, configs: I) -> ConfgenResult<OneOrMany<GeneratedConfig>>
    where
        I: IntoIterator<Item = UserConfig>,
    {
        self.create_with_globals(configs, &Globals::new())
    }

    /// Generate configs for `configs`, in order.
    ///
    /// Configs tagged with a known set expand to one config per variant; all
    /// others (including unknown set names) produce exactly one config.
    /// Exactly one result is returned bare; anything else as a list.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while expanding, normalising outputs
    /// or running hooks.
    pub fn create_with_globals<I>(
        &self,
        configs: I,
        globals: &Globals,
    ) -> ConfgenResult<OneOrMany<GeneratedConfig>>
    where
        I: IntoIterator<Item = UserConfig>,
    {
        let mut generated = Vec::new();
        for mut config in configs {
            config.lift_reserved_fields()?;
            if let Some(templates) = config.set.as_deref().and_then(|name| self.sets.get(name)) {
                debug!(
                    set = config.set.as_deref(),
                    variants = templates.len(),
                    "expanding set"
                );
                for variant in expand(&config, templates)? {
                    generated.push(self.create_config(variant, globals)?);
                }
            } else {
                if let Some(name) = &config.set {
                    debug!(set = %name, "unknown set, generating a single config");
                }
                generated.push(self.create_config(config, globals)?);
            }
        }
        Ok(OneOrMany::collapse(generated))
    }

    /// Generate exactly one config from `config`, ignoring its set name.
    ///
    /// # Errors
    ///
    /// Returns output shape errors, [`ConfgenError::MissingInput`] when no
    /// file can be derived, and hook failures.
    pub fn create_config(
        &self,
        config: UserConfig,
        globals: &Globals,
    ) -> ConfgenResult<GeneratedConfig> {
        let mut effective = config;
        effective.lift_reserved_fields()?;
        let mut fields = self.base.fields.clone();
        merge_map(
            &mut fields,
            std::mem::take(&mut effective.fields),
            ArrayStrategy::Overwrite,
        );
        effective.fields = fields;
        if effective.pkg.is_none() {
            effective.pkg.clone_from(&self.package);
        }

        let ctx = OutputContext {
            defaults: &self.base.output,
            options: &self.options,
            hooks: &self.hooks,
            globals,
        };
        let outputs = normalize_outputs(&mut effective, &ctx)?;
        // Output effects may have written reserved keys into the fields.
        effective.lift_reserved_fields()?;
        let stages = assemble_pipeline(
            &effective,
            &self.hooks,
            self.options.mode,
            &self.options.transform,
        )?;
        Ok(GeneratedConfig {
            fields: effective.fields,
            output: outputs,
            plugins: stages,
        })
    }

    /// Render a banner for `pkg`, or for the generator's own package.
    /// `keys` defaults to `author` and `homepage:reference`.
    ///
    /// ```rust
    /// use rollup_confgen::{Generator, Package};
    /// use rollup_confgen::banner::BannerKey;
    ///
    /// let pkg = Package::new("app").with_field("license", "ISC");
    /// let generator = Generator::builder().package(pkg).build().expect("valid generator");
    /// let banner = generator
    ///     .create_banner(None, Some(&[BannerKey::parse("license")]))
    ///     .expect("package attached");
    /// assert_eq!(banner, "/*! app.js | @license ISC */\n");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfgenError::MissingPackage`] when neither `pkg` nor the
    /// generator supplies a descriptor.
    pub fn create_banner(
        &self,
        pkg: Option<&Package>,
        keys: Option<&[BannerKey]>,
    ) -> ConfgenResult<String> {
        let descriptor = pkg
            .or(self.package.as_ref())
            .ok_or(ConfgenError::MissingPackage)?;
        let banner = match keys {
            Some(chosen) => render_banner(descriptor, chosen),
            None => render_banner(descriptor, &default_banner_keys()),
        };
        Ok(banner)
    }

    /// The effective base defaults.
    #[must_use]
    pub const fn base(&self) -> &BaseConfig {
        &self.base
    }

    /// Built-in sets merged with the caller's.
    #[must_use]
    pub const fn sets(&self) -> &SetTable {
        &self.sets
    }

    /// Generator options.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// The attached package descriptor, if any.
    #[must_use]
    pub const fn package(&self) -> Option<&Package> {
        self.package.as_ref()
    }

    /// Registered hooks.
    #[must_use]
    pub const fn hooks(&self) -> &Hooks {
        &self.hooks
    }
}
