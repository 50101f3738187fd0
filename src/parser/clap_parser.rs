//! clap-backed [`CommandParser`].
//!
//! Groups become clap subcommands, commands become leaf subcommands carrying
//! their declared arguments. Global flags are stored as private `_` fields
//! so they never reach a handler.

use std::collections::BTreeMap;
use std::sync::Arc;

use clap::builder::PossibleValuesParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use super::{CommandParser, ErrorReporter, ParsedArgs};
use crate::commands::{ArgKind, ArgumentSpec, CommandDescriptor, CommandTable};
use crate::error::{CliError, Result};

/// Global flags and the private fields they are stored under.
const GLOBAL_FLAGS: [(&str, &str, &str); 3] = [
    ("_debug", "debug", "Increase logging verbosity to show all debug logs"),
    ("_verbose", "verbose", "Increase logging verbosity"),
    (
        "_only_show_errors",
        "only-show-errors",
        "Only show errors, suppressing warnings",
    ),
];

/// Options the global parser owns besides [`GLOBAL_FLAGS`], including
/// clap's own help and version switches.
const RESERVED_OPTIONS: [&str; 7] = ["--output", "-o", "--query", "--help", "-h", "--version", "-V"];

fn is_reserved(option: &str) -> bool {
    RESERVED_OPTIONS.contains(&option)
        || GLOBAL_FLAGS
            .iter()
            .any(|(_, long, _)| option.strip_prefix("--") == Some(*long))
}

/// Usage context of a resolved subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SubparserContext {
    /// Full program path, e.g. `demo vm create`.
    pub prog: String,
    /// Rendered usage line.
    pub usage: String,
}

impl ErrorReporter for SubparserContext {
    fn validation_error(&self, message: &str) -> CliError {
        tracing::debug!(prog = %self.prog, message, "validation error");
        CliError::Validation {
            message: message.to_string(),
            usage: Some(self.usage.clone()),
        }
    }
}

/// Parser built from the command table on top of a global parser.
#[derive(Debug, Clone)]
pub struct ClapParser {
    prog: String,
    global: Command,
    root: Command,
    table: CommandTable,
}

impl ClapParser {
    /// Create a parser for program `prog`.
    pub fn new(prog: impl Into<String>, version: Option<&str>) -> Self {
        let prog = prog.into();
        let global = Self::create_global_parser(&prog, version);
        Self {
            root: global.clone(),
            global,
            prog,
            table: CommandTable::new(),
        }
    }

    /// Build the top-level command carrying the global arguments.
    pub fn create_global_parser(prog: &str, version: Option<&str>) -> Command {
        let mut cmd = Command::new(prog.to_string())
            .subcommand_required(true)
            .arg_required_else_help(true);
        if let Some(version) = version {
            cmd = cmd.version(version.to_string());
        }
        for (id, long, help) in GLOBAL_FLAGS {
            cmd = cmd.arg(
                Arg::new(id)
                    .long(long)
                    .help(help)
                    .action(ArgAction::SetTrue)
                    .global(true),
            );
        }
        cmd.arg(
            Arg::new("_output")
                .short('o')
                .long("output")
                .help("Output format")
                .value_parser(PossibleValuesParser::new(["json", "table"]))
                .global(true),
        )
        .arg(
            Arg::new("_query")
                .long("query")
                .value_name("PATH")
                .help("Dotted path selecting part of the result, e.g. items.0.name")
                .global(true),
        )
    }

    /// The clap command tree as currently loaded.
    pub fn command(&self) -> &Command {
        &self.root
    }

    fn subparser_context(&self, path: &[&str]) -> SubparserContext {
        let mut root = self.root.clone();
        root.build();
        let mut current = &root;
        for name in path {
            match current.find_subcommand(name) {
                Some(sub) => current = sub,
                None => break,
            }
        }
        SubparserContext {
            prog: std::iter::once(self.prog.as_str())
                .chain(path.iter().copied())
                .collect::<Vec<_>>()
                .join(" "),
            usage: current.clone().render_usage().to_string(),
        }
    }
}

impl ErrorReporter for ClapParser {
    fn validation_error(&self, message: &str) -> CliError {
        CliError::Validation {
            message: message.to_string(),
            usage: Some(self.root.clone().render_usage().to_string()),
        }
    }
}

impl CommandParser for ClapParser {
    fn prog(&self) -> &str {
        &self.prog
    }

    fn load_command_table(&mut self, table: &CommandTable) -> Result<()> {
        let mut tree = Node::default();
        for command in table.commands() {
            let clash = command
                .arguments
                .iter()
                .flat_map(|spec| spec.options.iter())
                .find(|option| is_reserved(option));
            if let Some(option) = clash {
                return Err(CliError::ArgumentConflict {
                    command: command.name.clone(),
                    option: option.clone(),
                });
            }
            let mut node = &mut tree;
            for part in command.name.split(' ') {
                node = node.children.entry(part.to_string()).or_default();
            }
            node.command = Some(Arc::clone(command));
        }

        let mut root = self.global.clone();
        for (name, child) in &tree.children {
            root = root.subcommand(build_subcommand(name, name, child, table));
        }
        self.root = root;
        self.table = table.clone();
        tracing::debug!(commands = table.len(), "parser loaded command table");
        Ok(())
    }

    fn parse_args(&self, args: &[String]) -> Result<ParsedArgs> {
        let argv = std::iter::once(self.prog.clone()).chain(args.iter().cloned());
        let matches = self
            .root
            .clone()
            .try_get_matches_from(argv)
            .map_err(|err| CliError::Parse {
                message: err.render().to_string(),
                exit_code: err.exit_code(),
            })?;

        let mut path = Vec::new();
        let mut leaf = &matches;
        while let Some((name, sub)) = leaf.subcommand() {
            path.push(name);
            leaf = sub;
        }
        let command = path.join(" ");
        let descriptor = self
            .table
            .get(&command)
            .cloned()
            .ok_or_else(|| CliError::UnknownCommand {
                name: command.clone(),
            })?;

        let mut parsed = ParsedArgs::new(command.as_str()).with_func(Arc::clone(&descriptor));
        for (id, _, _) in GLOBAL_FLAGS {
            let on = leaf.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false);
            parsed.set(id, Value::Bool(on));
        }
        for id in ["_output", "_query"] {
            let value = leaf
                .try_get_one::<String>(id)
                .ok()
                .flatten()
                .map_or(Value::Null, |s| Value::String(s.clone()));
            parsed.set(id, value);
        }

        let mut validators = Vec::new();
        for spec in &descriptor.arguments {
            let supplied = leaf.value_source(&spec.dest) == Some(ValueSource::CommandLine);
            parsed.set(spec.dest.as_str(), read_value(leaf, spec, supplied));
            if supplied {
                if let Some(info) = &spec.deprecation {
                    parsed.argument_deprecations.push(info.clone());
                }
            }
            if let Some(validator) = &spec.validator {
                validators.push(Arc::clone(validator));
            }
        }
        parsed.argument_validators = Some(validators);
        parsed.command_validator = descriptor.validator.clone();
        parsed.reporter = Some(Arc::new(self.subparser_context(&path)));

        tracing::debug!(command = %parsed.command, "parsed arguments");
        Ok(parsed)
    }

    fn completion_command(&self) -> Option<Command> {
        Some(self.root.clone())
    }
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
    command: Option<Arc<CommandDescriptor>>,
}

fn build_subcommand(name: &str, path: &str, node: &Node, table: &CommandTable) -> Command {
    let mut cmd = Command::new(name.to_string());

    let (summary, deprecation) = match &node.command {
        Some(desc) => (desc.summary.as_deref(), desc.deprecation.as_ref()),
        None => match table.group(path) {
            Some(group) => (group.summary.as_deref(), group.deprecation.as_ref()),
            None => (None, None),
        },
    };
    let about = match (deprecation, summary) {
        (Some(info), Some(summary)) => Some(format!("{} {}", info.tag(), summary)),
        (Some(info), None) => Some(info.tag()),
        (None, summary) => summary.map(str::to_string),
    };
    if let Some(about) = about {
        cmd = cmd.about(about);
    }
    if deprecation.is_some_and(|info| info.hide) {
        cmd = cmd.hide(true);
    }

    if let Some(desc) = &node.command {
        for spec in &desc.arguments {
            cmd = cmd.arg(build_arg(spec));
        }
    }
    if !node.children.is_empty() {
        if node.command.is_none() {
            cmd = cmd.subcommand_required(true).arg_required_else_help(true);
        }
        for (child_name, child) in &node.children {
            let child_path = format!("{} {}", path, child_name);
            cmd = cmd.subcommand(build_subcommand(child_name, &child_path, child, table));
        }
    }
    cmd
}

fn build_arg(spec: &ArgumentSpec) -> Arg {
    let mut arg = Arg::new(spec.dest.clone()).required(spec.required);

    let mut has_long = false;
    let mut has_short = false;
    for option in &spec.options {
        if let Some(long) = option.strip_prefix("--") {
            arg = if has_long {
                arg.visible_alias(long.to_string())
            } else {
                arg.long(long.to_string())
            };
            has_long = true;
        } else if let Some(short) = option.strip_prefix('-').and_then(single_char) {
            arg = if has_short {
                arg.visible_short_alias(short)
            } else {
                arg.short(short)
            };
            has_short = true;
        }
    }

    if let Some(help) = &spec.help {
        arg = arg.help(help.clone());
    }
    if let Some(info) = &spec.deprecation {
        if info.hide {
            arg = arg.hide(true);
        }
    }

    match spec.kind {
        ArgKind::String => arg.value_name(spec.dest.to_uppercase()),
        ArgKind::Integer => arg
            .value_name(spec.dest.to_uppercase())
            .value_parser(clap::value_parser!(i64)),
        ArgKind::Flag => arg.action(ArgAction::SetTrue),
        ArgKind::List => arg
            .value_name(spec.dest.to_uppercase())
            .action(ArgAction::Append)
            .num_args(1..),
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn read_value(matches: &ArgMatches, spec: &ArgumentSpec, supplied: bool) -> Value {
    if !supplied {
        if let Some(default) = &spec.default {
            return default.clone();
        }
    }
    let id = spec.dest.as_str();
    match spec.kind {
        ArgKind::String => matches
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .map_or(Value::Null, |s| Value::String(s.clone())),
        ArgKind::Integer => matches
            .try_get_one::<i64>(id)
            .ok()
            .flatten()
            .map_or(Value::Null, |n| Value::from(*n)),
        ArgKind::Flag => Value::Bool(
            matches
                .try_get_one::<bool>(id)
                .ok()
                .flatten()
                .copied()
                .unwrap_or(false),
        ),
        ArgKind::List => matches
            .try_get_many::<String>(id)
            .ok()
            .flatten()
            .map_or(Value::Null, |values| {
                Value::Array(values.map(|s| Value::String(s.clone())).collect())
            }),
    }
}
