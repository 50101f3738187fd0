//! Parsing seam between the invoker and the argument grammar.
//!
//! The invoker only talks to a [`CommandParser`]. [`ClapParser`] is the
//! default implementation; tests inject their own.
//!
//! - [`ParsedArgs`] - The structured result of one parse
//! - [`ErrorReporter`] - Formats validation failures with usage context
//! - [`clap_parser`] - clap-backed parser built from the command table

pub mod clap_parser;

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::commands::{CommandDescriptor, CommandTable};
use crate::deprecation::DeprecationInfo;
use crate::error::{CliError, Result};

pub use clap_parser::{ClapParser, SubparserContext};

/// Validator attached to a command or argument.
///
/// Receives the whole parse result so it can cross-check or fill fields.
pub type Validator = Arc<dyn Fn(&mut ParsedArgs) -> anyhow::Result<()> + Send + Sync>;

/// Turns a validation failure into a user-facing error.
pub trait ErrorReporter {
    /// Build the error reported for a failed validation.
    fn validation_error(&self, message: &str) -> CliError;
}

/// The argument grammar used by the invoker.
pub trait CommandParser: ErrorReporter {
    /// Program name used in usage and error output.
    fn prog(&self) -> &str;

    /// Register the loaded commands so they can be parsed.
    fn load_command_table(&mut self, table: &CommandTable) -> Result<()>;

    /// Parse a full argument vector (without the program name).
    fn parse_args(&self, args: &[String]) -> Result<ParsedArgs>;

    /// clap command tree used for shell completion, if the parser has one.
    fn completion_command(&self) -> Option<clap::Command> {
        None
    }
}

/// Structured result of parsing one argument vector.
///
/// `fields` holds named values in declaration order; names starting with `_`
/// are framework-internal. The remaining members are framework fields that
/// the invoker consumes and strips during a run.
#[derive(Clone, Default)]
pub struct ParsedArgs {
    /// Resolved command name, e.g. `vm create`.
    pub command: String,
    /// Command to dispatch to.
    pub func: Option<Arc<CommandDescriptor>>,
    /// Named argument values.
    pub fields: Map<String, Value>,
    /// Aggregate validator; when present, argument validators are skipped.
    pub command_validator: Option<Validator>,
    /// Per-argument validators, run in order.
    pub argument_validators: Option<Vec<Validator>>,
    /// Deprecations of arguments used on this command line.
    pub argument_deprecations: Vec<DeprecationInfo>,
    /// Parser context of the resolved subcommand, for error reporting.
    pub reporter: Option<Arc<dyn ErrorReporter>>,
}

impl ParsedArgs {
    /// Create an empty parse result for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Attach the command to dispatch to.
    pub fn with_func(mut self, func: Arc<CommandDescriptor>) -> Self {
        self.func = Some(func);
        self
    }

    /// Add a named field.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Value of field `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String value of field `name`, if it is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Set field `name`.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }
}

impl fmt::Debug for ParsedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedArgs")
            .field("command", &self.command)
            .field("func", &self.func.as_ref().map(|c| c.name.as_str()))
            .field("fields", &self.fields)
            .field("command_validator", &self.command_validator.is_some())
            .field(
                "argument_validators",
                &self.argument_validators.as_ref().map(Vec::len),
            )
            .field("argument_deprecations", &self.argument_deprecations)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}
