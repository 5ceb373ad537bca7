//! Output shapes, resolved descriptors and the normalizer turning one into
//! the other.

mod descriptor;
mod entry;
mod format;
mod globals;
mod normalize;

pub use descriptor::{OutputDescriptor, SourceMap};
pub use entry::{OutputEffect, OutputEntry, OutputSpec};
pub use format::OutputFormat;
pub use globals::{GlobalOverride, Globals, GlobalsFn};
pub use normalize::disambiguate_legacy;

pub(crate) use normalize::{OutputContext, normalize_outputs};
