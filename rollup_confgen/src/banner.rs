//! Metadata comment banners prefixed to generated bundles.

use crate::package::Package;

/// Descriptor fields rendered when no explicit keys are requested.
pub const DEFAULT_BANNER_KEYS: [&str; 2] = ["author", "homepage:reference"];

/// A descriptor field to include in a banner, with the tag it renders under.
///
/// Keys are written `field` or `field:label`; `homepage:reference` renders
/// the `homepage` field as `@reference ...`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BannerKey {
    field: String,
    label: String,
}

impl BannerKey {
    /// Parse a `field` or `field:label` key.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((field, label)) if !label.is_empty() => Self {
                field: field.to_owned(),
                label: label.to_owned(),
            },
            Some((field, _)) => Self::plain(field),
            None => Self::plain(spec),
        }
    }

    fn plain(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            label: field.to_owned(),
        }
    }

    /// The descriptor field read for this key.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The tag this key renders under.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl From<&str> for BannerKey {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

/// The keys used when callers do not choose their own.
#[must_use]
pub fn default_banner_keys() -> Vec<BannerKey> {
    DEFAULT_BANNER_KEYS.iter().copied().map(BannerKey::parse).collect()
}

/// Render a banner such as
/// `/*! app.js | @author Jane | @reference https://example.com */` followed by
/// a newline. Keys whose field is missing or empty are skipped.
///
/// ```rust
/// use rollup_confgen::{Package, banner::{render_banner, default_banner_keys}};
///
/// let pkg = Package::new("app").with_field("author", "Jane");
/// assert_eq!(
///     render_banner(&pkg, &default_banner_keys()),
///     "/*! app.js | @author Jane */\n",
/// );
/// ```
#[must_use]
pub fn render_banner(pkg: &Package, keys: &[BannerKey]) -> String {
    let mut banner = format!("/*! {}.js", pkg.name);
    for key in keys {
        if let Some(value) = pkg.display_field(key.field()) {
            banner.push_str(" | @");
            banner.push_str(key.label());
            banner.push(' ');
            banner.push_str(&value);
        }
    }
    banner.push_str(" */\n");
    banner
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("author", "author", "author")]
    #[case("homepage:reference", "homepage", "reference")]
    #[case("license:", "license", "license")]
    fn parses_keys(#[case] spec: &str, #[case] field: &str, #[case] label: &str) {
        let key = BannerKey::parse(spec);
        assert_eq!(key.field(), field);
        assert_eq!(key.label(), label);
    }

    #[test]
    fn renders_default_keys_in_order() {
        let pkg = Package::new("@brikcss/rollup-config-generator")
            .with_field("author", "Brikcss <https://github.com/brikcss>")
            .with_field("homepage", "https://github.com/brikcss/rollup-config-generator");
        assert_eq!(
            render_banner(&pkg, &default_banner_keys()),
            "/*! @brikcss/rollup-config-generator.js | @author Brikcss <https://github.com/brikcss> | @reference https://github.com/brikcss/rollup-config-generator */\n"
        );
    }

    #[test]
    fn bare_package_renders_name_only() {
        assert_eq!(
            render_banner(&Package::new("tool"), &default_banner_keys()),
            "/*! tool.js */\n"
        );
    }

    #[test]
    fn custom_keys_replace_defaults() {
        let pkg = Package::new("tool")
            .with_field("author", "Jane")
            .with_field("license", "MIT");
        let keys = [BannerKey::from("license")];
        assert_eq!(render_banner(&pkg, &keys), "/*! tool.js | @license MIT */\n");
    }
}
