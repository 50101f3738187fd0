//! Terminal output.
//!
//! - [`Theme`] - Styles for warnings, errors, and help text
//! - [`ColorScope`] - Scoped stderr color override
//! - [`Help`] / [`CliHelp`] - Welcome view

pub mod color;
pub mod help;
pub mod theme;

pub use color::ColorScope;
pub use help::{CliHelp, Help};
pub use theme::{should_use_colors, Theme};
