//! Command registration.
//!
//! - [`descriptor`] - [`CommandDescriptor`] and [`CommandGroup`]
//! - [`arguments`] - [`ArgumentSpec`] declarations
//! - [`table`] - The [`CommandTable`] the parser and invoker read from
//! - [`registry`] - The [`CommandLoader`] seam and the default [`CommandRegistry`]
//!
//! # Example
//!
//! ```
//! use clinch::commands::{ArgumentSpec, CommandDescriptor, CommandGroup, CommandRegistry};
//! use clinch::deprecation::DeprecationInfo;
//! use clinch::invocation::Params;
//! use serde_json::json;
//!
//! let mut registry = CommandRegistry::new();
//! registry
//!     .add_group(CommandGroup::new("vm").deprecated(DeprecationInfo::group("vm")))
//!     .add_command(
//!         CommandDescriptor::new("vm create", |p: Params| Ok(json!({"created": p["name"]})))
//!             .with_summary("Create a virtual machine"),
//!     )
//!     .argument_context("vm create", [ArgumentSpec::new("name").required()]);
//! ```

pub mod arguments;
pub mod descriptor;
pub mod registry;
pub mod table;

pub use arguments::{ArgKind, ArgumentSpec};
pub use descriptor::{CommandDescriptor, CommandGroup, CommandHandler, TableTransformer};
pub use registry::{CommandLoader, CommandRegistry};
pub use table::CommandTable;
