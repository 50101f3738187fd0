//! Clinch - the invocation pipeline of a command-line application framework.
//!
//! Given the argument vector for one run, clinch resolves the command to
//! execute, validates its inputs, warns about deprecated usage, runs the
//! handler, and lets hooks reshape the result before it is returned.
//!
//! # Modules
//!
//! - [`cli`] - The [`Cli`](cli::Cli) context, output and exit codes
//! - [`commands`] - Command descriptors, argument declarations, and the registry
//! - [`completion`] - Shell completion driven by the environment
//! - [`config`] - Sectioned configuration with environment overrides
//! - [`deprecation`] - Deprecation metadata and implicit resolution
//! - [`error`] - Error types and result aliases
//! - [`events`] - Invocation events and the bus that delivers them
//! - [`invocation`] - The invoker, validation, and parameter filtering
//! - [`parser`] - The parsing seam and its clap implementation
//! - [`query`] - `--query` result filtering
//! - [`ui`] - Theme, color scoping, and the welcome view
//!
//! # Example
//!
//! ```
//! use clinch::cli::Cli;
//! use clinch::commands::{CommandDescriptor, CommandGroup, CommandRegistry};
//! use clinch::deprecation::DeprecationInfo;
//! use clinch::invocation::{CommandInvoker, Params};
//! use serde_json::json;
//!
//! let mut registry = CommandRegistry::new();
//! registry
//!     .add_group(CommandGroup::new("vm").deprecated(DeprecationInfo::group("vm")))
//!     .add_command(CommandDescriptor::new("vm list", |_: Params| Ok(json!(["web01"]))));
//!
//! let mut cli = Cli::builder("demo")
//!     .loader(registry)
//!     .stderr(std::io::sink())
//!     .build();
//!
//! let mut invoker = CommandInvoker::new(&mut cli);
//! let item = invoker.execute(vec!["vm".into(), "list".into()]).unwrap().unwrap();
//! assert_eq!(item.result, json!(["web01"]));
//! assert_eq!(invoker.state().command(), "vm list");
//! ```

pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod deprecation;
pub mod error;
pub mod events;
pub mod invocation;
pub mod parser;
pub mod query;
pub mod ui;

pub use error::{CliError, Result};
