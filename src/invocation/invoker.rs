//! The invocation controller.
//!
//! [`CommandInvoker::execute`] runs one argument vector through the full
//! pipeline: command table loading, parsing, validation, deprecation
//! warnings, dispatch, and result hooks. Every stage raises its event on the
//! context's [`EventBus`](crate::events::EventBus) before moving on.

use std::io::Write;

use serde_json::{Map, Value};

use super::params::filter_params;
use super::result::CommandResultItem;
use super::state::InvocationState;
use super::validation::validate;
use crate::cli::Cli;
use crate::deprecation::{resolve_implicit_deprecation, DeprecationInfo};
use crate::error::{CliError, Result};
use crate::events::{Event, EventContext, EventPayload};
use crate::parser::{ClapParser, CommandParser};
use crate::ui::{ColorScope, Theme};

/// Runs a single invocation against a CLI context.
pub struct CommandInvoker<'a> {
    cli_ctx: &'a mut Cli,
    parser: Box<dyn CommandParser>,
    data: InvocationState,
}

/// Builder for [`CommandInvoker`].
#[derive(Default)]
pub struct InvokerBuilder<'a> {
    cli_ctx: Option<&'a mut Cli>,
    parser: Option<Box<dyn CommandParser>>,
    initial_data: Option<Map<String, Value>>,
}

impl<'a> InvokerBuilder<'a> {
    /// Set the CLI context. Required.
    pub fn context(mut self, cli_ctx: &'a mut Cli) -> Self {
        self.cli_ctx = Some(cli_ctx);
        self
    }

    /// Use a custom parser instead of the clap-backed default.
    pub fn parser(mut self, parser: Box<dyn CommandParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Seed the invocation state.
    pub fn initial_data(mut self, data: Map<String, Value>) -> Self {
        self.initial_data = Some(data);
        self
    }

    /// Build the invoker.
    ///
    /// Fails with [`CliError::ContextType`] when no context was supplied.
    pub fn build(self) -> Result<CommandInvoker<'a>> {
        let cli_ctx = self.cli_ctx.ok_or_else(|| CliError::ContextType {
            found: "no context".to_string(),
        })?;
        let parser = match self.parser {
            Some(parser) => parser,
            None => Box::new(ClapParser::new(
                cli_ctx.name.clone(),
                cli_ctx.version.as_deref(),
            )),
        };
        let data = match self.initial_data {
            Some(initial) => InvocationState::with_initial_data(initial),
            None => InvocationState::new(),
        };
        Ok(CommandInvoker {
            cli_ctx,
            parser,
            data,
        })
    }
}

impl<'a> CommandInvoker<'a> {
    /// Create an invoker with the default parser.
    pub fn new(cli_ctx: &'a mut Cli) -> Self {
        let parser = Box::new(ClapParser::new(
            cli_ctx.name.clone(),
            cli_ctx.version.as_deref(),
        ));
        Self {
            cli_ctx,
            parser,
            data: InvocationState::new(),
        }
    }

    /// Start building an invoker.
    pub fn builder() -> InvokerBuilder<'a> {
        InvokerBuilder::default()
    }

    /// Per-run state.
    pub fn state(&self) -> &InvocationState {
        &self.data
    }

    /// The parser used by this invoker.
    pub fn parser(&self) -> &dyn CommandParser {
        self.parser.as_ref()
    }

    /// Run one invocation.
    ///
    /// Returns `Ok(None)` when `args` is empty (the welcome view is shown)
    /// or when the run served a shell completion request. No command runs
    /// in either case.
    pub fn execute(&mut self, mut args: Vec<String>) -> Result<Option<CommandResultItem>> {
        let ctx = &mut *self.cli_ctx;
        let data = &mut self.data;

        ctx.events.raise(
            Event::PreCommandTableCreate,
            &mut EventContext::new(data, EventPayload::Args(&args)),
        )?;
        ctx.loader.load_command_table(&args)?;
        let command = rudimentary_command_name(&mut args);
        tracing::debug!(guess = %command, "loading arguments");
        ctx.loader.load_arguments(&command)?;
        let table = ctx.loader.command_table();

        ctx.events.raise(
            Event::PostCommandTableCreate,
            &mut EventContext::new(data, EventPayload::CommandTable(table)),
        )?;
        self.parser.load_command_table(table)?;
        ctx.events.raise(
            Event::CommandTableLoaded,
            &mut EventContext::new(data, EventPayload::Parser(self.parser.as_ref())),
        )?;

        if args.is_empty() {
            ctx.completion
                .enable_autocomplete(self.parser.as_ref(), ctx.out.as_mut())?;
            if ctx.completion.is_completing() {
                return Ok(None);
            }
            ctx.help.show_welcome(&ctx.name, table, ctx.out.as_mut())?;
            return Ok(None);
        }

        if args[0].eq_ignore_ascii_case("help") {
            args[0] = "--help".to_string();
        }

        ctx.completion
            .enable_autocomplete(self.parser.as_ref(), ctx.out.as_mut())?;
        if ctx.completion.is_completing() {
            return Ok(None);
        }

        ctx.events.raise(
            Event::PreParseArgs,
            &mut EventContext::new(data, EventPayload::Args(&args)),
        )?;
        let mut parsed = self.parser.parse_args(&args)?;
        ctx.events.raise(
            Event::PostParseArgs,
            &mut EventContext::new(
                data,
                EventPayload::ParsedArgs {
                    command: &parsed.command,
                    args: &parsed,
                },
            ),
        )?;

        validate(&mut parsed, self.parser.as_ref())?;

        data.set_command(&parsed.command);

        let params = filter_params(&parsed.fields);

        let cmd = parsed
            .func
            .clone()
            .ok_or_else(|| CliError::UnknownCommand {
                name: parsed.command.clone(),
            })?;

        let mut deprecations = std::mem::take(&mut parsed.argument_deprecations);
        if let Some(info) = &cmd.deprecation {
            deprecations.push(info.clone());
        }
        if let Some(implicit) = resolve_implicit_deprecation(&cmd.name, table) {
            deprecations.push(implicit);
        }

        let only_show_errors = parsed.get("_only_show_errors") == Some(&Value::Bool(true))
            || ctx.config.get_bool("core", "only_show_errors");
        if only_show_errors {
            tracing::debug!(count = deprecations.len(), "suppressing deprecation warnings");
        } else {
            print_deprecations(&deprecations, &ctx.theme, ctx.err.as_mut())?;
        }

        tracing::debug!(command = %cmd.name, "invoking handler");
        let raw = cmd.invoke(params).map_err(|err| match CliError::recognize(err) {
            Ok(recognized) => recognized,
            Err(source) => CliError::Command {
                command: cmd.name.clone(),
                source,
            },
        })?;

        let mut result = raw;
        {
            let mut event = EventContext::new(data, EventPayload::Result(&mut result));
            ctx.events.raise(Event::TransformResult, &mut event)?;
            ctx.events.raise(Event::FilterResult, &mut event)?;
        }

        let table_transformer = table
            .get(&parsed.command)
            .and_then(|c| c.table_transformer.clone());
        Ok(Some(CommandResultItem::new(
            result,
            table_transformer,
            data.query_active(),
        )))
    }
}

/// Best-effort command name from the leading arguments.
///
/// Consumes tokens up to the first one starting with `-`, lower-casing each
/// consumed token in place, and joins them with single spaces.
pub fn rudimentary_command_name(args: &mut [String]) -> String {
    let mut nouns = Vec::new();
    for arg in args.iter_mut() {
        if arg.starts_with('-') {
            break;
        }
        *arg = arg.to_lowercase();
        nouns.push(arg.clone());
    }
    nouns.join(" ")
}

fn print_deprecations(
    deprecations: &[DeprecationInfo],
    theme: &Theme,
    err: &mut dyn Write,
) -> Result<()> {
    if deprecations.is_empty() {
        return Ok(());
    }
    let _color = ColorScope::stderr(theme.colors_enabled());
    for info in deprecations {
        writeln!(err, "{}", theme.format_deprecation(&info.message()))?;
    }
    Ok(())
}
