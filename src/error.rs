//! Error types for invocation pipeline operations.
//!
//! This module defines [`CliError`], the error type surfaced by every stage
//! of a run, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - `CliError` variants are the recognized, user-facing failures. A
//!   validator or handler that returns one has it propagated verbatim.
//! - Anything else coming out of user code (validators, handlers, hooks) is
//!   carried as `anyhow::Error` and wrapped at the boundary it crossed.
//! - Nothing is retried; every failure surfaces to the caller immediately.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for a command invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// The argument vector could not be parsed.
    ///
    /// `message` is the fully rendered parser output (usage, error, or help
    /// text). `exit_code` is the code the parser asks the process to exit
    /// with; displaying help yields `0`.
    #[error("{message}")]
    Parse { message: String, exit_code: i32 },

    /// Arguments were parsed but rejected by a validator.
    #[error("{message}")]
    Validation {
        message: String,
        usage: Option<String>,
    },

    /// The invoker was constructed without a usable CLI context.
    #[error("expected a CLI context, got {found}")]
    ContextType { found: String },

    /// A command name did not resolve to a registered command.
    #[error("'{name}' is not a registered command")]
    UnknownCommand { name: String },

    /// A command declares an option the framework already owns.
    #[error("command '{command}' declares option '{option}', which is reserved for a global argument")]
    ArgumentConflict { command: String, option: String },

    /// The command handler failed.
    #[error("command '{command}' failed: {source}")]
    Command {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// An event subscriber failed.
    #[error("hook for '{event}' failed: {source}")]
    Hook {
        event: String,
        #[source]
        source: anyhow::Error,
    },

    /// Failed to read or parse a configuration file.
    #[error("Failed to load config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Result normalization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Build a validation error without usage text.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            usage: None,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse { exit_code, .. } => *exit_code,
            Self::Validation { .. } => 2,
            _ => 1,
        }
    }

    /// Whether this is the parser's help display rather than a failure.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::Parse { exit_code: 0, .. })
    }

    /// Recover a `CliError` from an error raised by user code.
    ///
    /// Returns `Err` with the original error when it is not a `CliError`.
    pub fn recognize(err: anyhow::Error) -> std::result::Result<Self, anyhow::Error> {
        err.downcast::<Self>()
    }
}

/// Result type alias for invocation operations.
pub type Result<T> = std::result::Result<T, CliError>;
