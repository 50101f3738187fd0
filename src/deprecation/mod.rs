//! Deprecation metadata and implicit deprecation resolution.
//!
//! - [`info`] - The [`DeprecationInfo`] descriptor and its message rendering
//! - [`resolver`] - Inheriting deprecation from ancestor command groups

pub mod info;
pub mod resolver;

pub use info::{DeprecationInfo, DeprecationKind, DeprecationTextFn};
pub use resolver::{resolve_implicit_deprecation, DeprecationLookup};
