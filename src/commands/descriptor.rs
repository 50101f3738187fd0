//! Command and command group descriptors.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::arguments::ArgumentSpec;
use crate::deprecation::DeprecationInfo;
use crate::invocation::{todict, Params};
use crate::parser::{ParsedArgs, Validator};

/// Type-erased command handler. Returns the result already normalized.
pub type CommandHandler = Arc<dyn Fn(Params) -> anyhow::Result<Value> + Send + Sync>;

/// Reshapes a raw result for table display.
pub type TableTransformer = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A registered command.
#[derive(Clone)]
pub struct CommandDescriptor {
    /// Canonical space-separated name, e.g. `vm create`.
    pub name: String,
    /// One-line help summary.
    pub summary: Option<String>,
    /// Explicit deprecation of the command itself.
    pub deprecation: Option<DeprecationInfo>,
    /// Display transformer for table output.
    pub table_transformer: Option<TableTransformer>,
    /// Command-level validator.
    pub validator: Option<Validator>,
    /// Declared arguments.
    pub arguments: Vec<ArgumentSpec>,
    handler: CommandHandler,
}

impl CommandDescriptor {
    /// Create a command whose handler returns any serializable value.
    pub fn new<F, R>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Params) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Serialize,
    {
        let handler: CommandHandler = Arc::new(move |params: Params| -> anyhow::Result<Value> {
            let raw = handler(params)?;
            Ok(todict(&raw)?)
        });
        Self {
            name: normalize_name(&name.into()),
            summary: None,
            deprecation: None,
            table_transformer: None,
            validator: None,
            arguments: Vec::new(),
            handler,
        }
    }

    /// Set the help summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Mark the command as deprecated.
    pub fn deprecated(mut self, info: DeprecationInfo) -> Self {
        self.deprecation = Some(info);
        self
    }

    /// Attach a table transformer.
    pub fn with_table_transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.table_transformer = Some(Arc::new(transformer));
        self
    }

    /// Attach a command-level validator.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&mut ParsedArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Declare an argument.
    pub fn with_argument(mut self, argument: ArgumentSpec) -> Self {
        self.add_argument(argument);
        self
    }

    /// Declare an argument, replacing any previous one with the same dest.
    pub fn add_argument(&mut self, argument: ArgumentSpec) {
        match self.arguments.iter_mut().find(|a| a.dest == argument.dest) {
            Some(existing) => *existing = argument,
            None => self.arguments.push(argument),
        }
    }

    /// Run the handler with filtered parameters.
    pub fn invoke(&self, params: Params) -> anyhow::Result<Value> {
        (self.handler)(params)
    }

    /// Group path of this command, e.g. `vm disk` for `vm disk attach`.
    pub fn group_path(&self) -> Option<&str> {
        self.name.rsplit_once(' ').map(|(group, _)| group)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .field("deprecation", &self.deprecation)
            .field("table_transformer", &self.table_transformer.is_some())
            .field("validator", &self.validator.is_some())
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// A command group, e.g. `vm`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandGroup {
    /// Space-separated group path.
    pub name: String,
    /// One-line help summary.
    pub summary: Option<String>,
    /// Explicit deprecation of the group.
    pub deprecation: Option<DeprecationInfo>,
}

impl CommandGroup {
    /// Create a group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: normalize_name(&name.into()),
            summary: None,
            deprecation: None,
        }
    }

    /// Set the help summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Mark the group as deprecated.
    pub fn deprecated(mut self, info: DeprecationInfo) -> Self {
        self.deprecation = Some(info);
        self
    }
}

/// Collapse whitespace runs so names compare reliably.
pub(crate) fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Vm {
        name: String,
        cores: u32,
    }

    #[test]
    fn handler_result_is_normalized() {
        let cmd = CommandDescriptor::new("vm show", |params: Params| {
            Ok(Vm {
                name: params["name"].as_str().unwrap_or_default().to_string(),
                cores: 4,
            })
        });

        let mut params = Params::new();
        params.insert("name".into(), json!("web01"));
        let result = cmd.invoke(params).unwrap();

        assert_eq!(result, json!({"name": "web01", "cores": 4}));
    }

    #[test]
    fn handler_errors_propagate() {
        let cmd = CommandDescriptor::new("vm delete", |_: Params| -> anyhow::Result<Value> {
            Err(anyhow::anyhow!("locked"))
        });
        let err = cmd.invoke(Params::new()).unwrap_err();
        assert_eq!(err.to_string(), "locked");
    }

    #[test]
    fn names_are_normalized() {
        let cmd = CommandDescriptor::new("  vm   create ", |_: Params| Ok(()));
        assert_eq!(cmd.name, "vm create");
        assert_eq!(cmd.group_path(), Some("vm"));

        let top = CommandDescriptor::new("version", |_: Params| Ok(()));
        assert_eq!(top.group_path(), None);
    }

    #[test]
    fn add_argument_replaces_same_dest() {
        let mut cmd = CommandDescriptor::new("vm create", |_: Params| Ok(()))
            .with_argument(ArgumentSpec::new("size"));
        cmd.add_argument(ArgumentSpec::new("size").required());
        cmd.add_argument(ArgumentSpec::new("name"));

        assert_eq!(cmd.arguments.len(), 2);
        assert!(cmd.arguments[0].required);
    }

    #[test]
    fn table_transformer_is_callable() {
        let cmd = CommandDescriptor::new("vm list", |_: Params| Ok(json!([])))
            .with_table_transformer(|v| json!({"rows": v}));
        let transform = cmd.table_transformer.as_ref().unwrap();
        assert_eq!(transform(&json!([1])), json!({"rows": [1]}));
    }

    #[test]
    fn group_builder() {
        let group = CommandGroup::new("vm")
            .with_summary("Manage virtual machines")
            .deprecated(DeprecationInfo::group("vm"));
        assert_eq!(group.summary.as_deref(), Some("Manage virtual machines"));
        assert!(group.deprecation.is_some());
    }
}
