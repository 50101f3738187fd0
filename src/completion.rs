//! Shell completion.
//!
//! Completion is requested through the environment: running the CLI with
//! `{PREFIX}_COMPLETE=<shell>` writes the completion script for that shell
//! to stdout instead of running a command.
//!
//! ```bash
//! CLINCH_COMPLETE=bash clinch > ~/.local/share/bash-completion/completions/clinch
//! ```

use std::io::Write;
use std::str::FromStr;

use clap_complete::Shell;

use crate::config::env_prefix;
use crate::error::Result;
use crate::parser::CommandParser;

/// Hooks completion into a run.
pub trait Autocomplete {
    /// Emit completion output if it was requested. Safe to call repeatedly.
    fn enable_autocomplete(&mut self, parser: &dyn CommandParser, out: &mut dyn Write)
        -> Result<()>;

    /// Whether this run is serving a completion request rather than a command.
    fn is_completing(&self) -> bool {
        false
    }
}

/// Completion driven by the `{PREFIX}_COMPLETE` environment variable.
#[derive(Debug, Clone)]
pub struct ShellCompletion {
    env_var: String,
    emitted: bool,
}

impl ShellCompletion {
    /// Completion for CLI `name`.
    pub fn new(name: &str) -> Self {
        Self {
            env_var: format!("{}_COMPLETE", env_prefix(name)),
            emitted: false,
        }
    }

    /// Name of the environment variable that requests completion.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// Shell named by the environment, if any.
    pub fn requested_shell(&self) -> Option<Shell> {
        let value = std::env::var(&self.env_var).ok()?;
        match Shell::from_str(value.trim()) {
            Ok(shell) => Some(shell),
            Err(_) => {
                tracing::warn!(var = %self.env_var, value = %value, "unsupported completion shell");
                None
            }
        }
    }
}

impl Autocomplete for ShellCompletion {
    fn enable_autocomplete(
        &mut self,
        parser: &dyn CommandParser,
        out: &mut dyn Write,
    ) -> Result<()> {
        if self.emitted {
            return Ok(());
        }
        let Some(shell) = self.requested_shell() else {
            return Ok(());
        };
        let Some(mut cmd) = parser.completion_command() else {
            tracing::debug!("parser has no completion tree");
            return Ok(());
        };
        tracing::debug!(%shell, "writing completion script");
        clap_complete::generate(shell, &mut cmd, parser.prog().to_string(), out);
        self.emitted = true;
        Ok(())
    }

    fn is_completing(&self) -> bool {
        self.emitted
    }
}

/// Completion that never emits anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompletion;

impl Autocomplete for NoCompletion {
    fn enable_autocomplete(&mut self, _: &dyn CommandParser, _: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandDescriptor, CommandTable};
    use crate::invocation::Params;
    use crate::parser::ClapParser;

    fn parser(prog: &str) -> ClapParser {
        let mut table = CommandTable::new();
        table.insert_command(CommandDescriptor::new("vm create", |_: Params| Ok(())));
        let mut parser = ClapParser::new(prog, None);
        parser.load_command_table(&table).unwrap();
        parser
    }

    #[test]
    fn env_var_uses_prefix() {
        assert_eq!(ShellCompletion::new("my-cli").env_var(), "MY_CLI_COMPLETE");
    }

    #[test]
    fn nothing_emitted_without_request() {
        let mut completion = ShellCompletion::new("clinch-completion-idle");
        let mut out = Vec::new();
        completion
            .enable_autocomplete(&parser("clinch-completion-idle"), &mut out)
            .unwrap();
        assert!(out.is_empty());
        assert!(!completion.is_completing());
    }

    #[test]
    fn script_is_emitted_once() {
        std::env::set_var("CLINCH_COMPLETION_BASH_COMPLETE", "bash");
        let mut completion = ShellCompletion::new("clinch-completion-bash");
        let parser = parser("clinch-completion-bash");
        let mut out = Vec::new();

        completion.enable_autocomplete(&parser, &mut out).unwrap();
        let first = out.len();
        completion.enable_autocomplete(&parser, &mut out).unwrap();
        std::env::remove_var("CLINCH_COMPLETION_BASH_COMPLETE");

        assert!(first > 0);
        assert_eq!(out.len(), first);
        assert!(completion.is_completing());
        assert!(String::from_utf8(out).unwrap().contains("clinch-completion-bash"));
    }

    #[test]
    fn unknown_shell_is_ignored() {
        std::env::set_var("CLINCH_COMPLETION_ODD_COMPLETE", "tcsh");
        let completion = ShellCompletion::new("clinch-completion-odd");
        assert_eq!(completion.requested_shell(), None);
        std::env::remove_var("CLINCH_COMPLETION_ODD_COMPLETE");
    }
}
