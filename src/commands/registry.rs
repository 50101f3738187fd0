//! Command registration and lazy argument loading.
//!
//! The [`CommandRegistry`] owns everything the invoker needs to know about
//! commands. It is injected into the invoker as a [`CommandLoader`], so tests
//! can substitute a fake registry per run.

use super::arguments::ArgumentSpec;
use super::descriptor::{normalize_name, CommandDescriptor, CommandGroup};
use super::table::CommandTable;
use crate::error::Result;

/// Supplies the command table and argument declarations for a run.
pub trait CommandLoader {
    /// Build (or extend) the command table for `args`.
    fn load_command_table(&mut self, args: &[String]) -> Result<&CommandTable>;

    /// Attach argument declarations for `command`.
    ///
    /// `command` is a best-effort guess taken from the leading arguments; it
    /// may name a group, a command, or nothing at all.
    fn load_arguments(&mut self, command: &str) -> Result<()>;

    /// The table as loaded so far.
    fn command_table(&self) -> &CommandTable;
}

/// Arguments registered for every command under a scope.
#[derive(Debug, Clone)]
struct ArgumentContext {
    scope: String,
    arguments: Vec<ArgumentSpec>,
}

impl ArgumentContext {
    fn applies_to(&self, command: &str) -> bool {
        self.scope.is_empty()
            || command == self.scope
            || command
                .strip_prefix(self.scope.as_str())
                .is_some_and(|rest| rest.starts_with(' '))
    }
}

/// Default, explicitly populated command registry.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    table: CommandTable,
    argument_contexts: Vec<ArgumentContext>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    pub fn add_command(&mut self, command: CommandDescriptor) -> &mut Self {
        tracing::trace!(command = %command.name, "registering command");
        self.table.insert_command(command);
        self
    }

    /// Register a group.
    pub fn add_group(&mut self, group: CommandGroup) -> &mut Self {
        self.table.insert_group(group);
        self
    }

    /// Register arguments for every command at or below `scope`.
    ///
    /// An empty scope applies to all commands. Later contexts override
    /// earlier ones for the same dest.
    pub fn argument_context<I>(&mut self, scope: &str, arguments: I) -> &mut Self
    where
        I: IntoIterator<Item = ArgumentSpec>,
    {
        self.argument_contexts.push(ArgumentContext {
            scope: normalize_name(scope),
            arguments: arguments.into_iter().collect(),
        });
        self
    }
}

impl CommandLoader for CommandRegistry {
    fn load_command_table(&mut self, _args: &[String]) -> Result<&CommandTable> {
        Ok(&self.table)
    }

    fn load_arguments(&mut self, command: &str) -> Result<()> {
        let command = normalize_name(command);
        let contexts = &self.argument_contexts;
        let mut attached = 0;
        for descriptor in self.table.commands_mut() {
            // A partial guess like `vm` still loads everything under `vm`.
            let related = command.is_empty()
                || descriptor.name == command
                || descriptor.name.starts_with(&format!("{} ", command))
                || command.starts_with(&format!("{} ", descriptor.name));
            if !related {
                continue;
            }
            let name = descriptor.name.clone();
            for ctx in contexts.iter().filter(|c| c.applies_to(&name)) {
                for argument in &ctx.arguments {
                    descriptor.add_argument(argument.clone());
                    attached += 1;
                }
            }
        }
        tracing::debug!(command = %command, attached, "loaded argument declarations");
        Ok(())
    }

    fn command_table(&self) -> &CommandTable {
        &self.table
    }
}
