//! The command table: commands and groups by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::descriptor::{normalize_name, CommandDescriptor, CommandGroup};
use crate::deprecation::{DeprecationInfo, DeprecationLookup};

/// Commands and groups known for one run, keyed by space-separated name.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: BTreeMap<String, Arc<CommandDescriptor>>,
    groups: BTreeMap<String, CommandGroup>,
}

impl CommandTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command, creating any missing ancestor groups.
    pub fn insert_command(&mut self, command: CommandDescriptor) {
        let mut path: Vec<&str> = command.name.split(' ').collect();
        path.pop();
        while !path.is_empty() {
            let group = path.join(" ");
            self.groups
                .entry(group.clone())
                .or_insert_with(|| CommandGroup::new(group));
            path.pop();
        }
        self.commands
            .insert(command.name.clone(), Arc::new(command));
    }

    /// Add or replace a group.
    pub fn insert_group(&mut self, group: CommandGroup) {
        self.groups.insert(group.name.clone(), group);
    }

    /// Look up a command.
    pub fn get(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.commands.get(&normalize_name(name))
    }

    /// Mutable access to a command, cloning it out of any shared handle.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut CommandDescriptor> {
        self.commands
            .get_mut(&normalize_name(name))
            .map(Arc::make_mut)
    }

    /// Look up a group.
    pub fn group(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.get(&normalize_name(name))
    }

    /// Whether `name` is a registered command.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All commands, sorted by name.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.commands.values()
    }

    /// Mutable iteration over all commands.
    pub fn commands_mut(&mut self) -> impl Iterator<Item = &mut CommandDescriptor> {
        self.commands.values_mut().map(Arc::make_mut)
    }

    /// All groups, sorted by name.
    pub fn groups(&self) -> impl Iterator<Item = &CommandGroup> {
        self.groups.values()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the table has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl DeprecationLookup for CommandTable {
    /// Commands are checked before groups.
    fn resolve_deprecation(&self, path: &str) -> Option<DeprecationInfo> {
        if let Some(command) = self.get(path) {
            if let Some(info) = &command.deprecation {
                return Some(info.clone());
            }
        }
        self.group(path).and_then(|g| g.deprecation.clone())
    }
}
