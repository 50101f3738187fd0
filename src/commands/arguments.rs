//! Argument declarations.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::deprecation::DeprecationInfo;
use crate::parser::{ParsedArgs, Validator};

/// How an argument's value is read from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgKind {
    /// Single string value.
    #[default]
    String,
    /// Boolean switch, `true` when present.
    Flag,
    /// Single signed integer.
    Integer,
    /// One or more string values; the option may repeat.
    List,
}

/// Declared argument of a command.
#[derive(Clone)]
pub struct ArgumentSpec {
    /// Field name the value is stored under.
    pub dest: String,
    /// Option strings, e.g. `--name`, `-n`. Empty means positional.
    pub options: Vec<String>,
    /// Help text.
    pub help: Option<String>,
    /// Must be supplied.
    pub required: bool,
    /// Value kind.
    pub kind: ArgKind,
    /// Value used when the argument is not supplied.
    pub default: Option<Value>,
    /// Explicit deprecation, reported when the argument is used.
    pub deprecation: Option<DeprecationInfo>,
    /// Argument-level validator.
    pub validator: Option<Validator>,
}

impl ArgumentSpec {
    /// Declare an argument stored under `dest`.
    ///
    /// Without explicit options it is exposed as `--<dest>` with
    /// underscores turned into dashes.
    pub fn new(dest: impl Into<String>) -> Self {
        let dest = dest.into();
        let long = format!("--{}", dest.replace('_', "-"));
        Self {
            dest,
            options: vec![long],
            help: None,
            required: false,
            kind: ArgKind::String,
            default: None,
            deprecation: None,
            validator: None,
        }
    }

    /// Declare a positional argument.
    pub fn positional(dest: impl Into<String>) -> Self {
        Self {
            options: Vec::new(),
            ..Self::new(dest)
        }
    }

    /// Replace the option strings.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the value kind.
    pub fn with_kind(mut self, kind: ArgKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark as deprecated.
    pub fn deprecated(mut self, info: DeprecationInfo) -> Self {
        self.deprecation = Some(info);
        self
    }

    /// Attach an argument-level validator.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&mut ParsedArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Whether this is a positional argument.
    pub fn is_positional(&self) -> bool {
        self.options.is_empty()
    }

    /// First long option, e.g. `--name`.
    pub fn long(&self) -> Option<&str> {
        self.options
            .iter()
            .find_map(|o| o.strip_prefix("--"))
    }

    /// Display name used in messages: the first option or the dest.
    pub fn display_name(&self) -> &str {
        self.options.first().map_or(self.dest.as_str(), String::as_str)
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("dest", &self.dest)
            .field("options", &self.options)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("deprecation", &self.deprecation)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
