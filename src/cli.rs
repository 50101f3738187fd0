//! The CLI application object.
//!
//! [`Cli`] is the context every invocation runs against. It owns the
//! configuration, the event bus, the command loader, the help and completion
//! collaborators, and the output streams, and it turns the outcome of a run
//! into printed output and an exit code.
//!
//! # Example
//!
//! ```
//! use clinch::cli::Cli;
//! use clinch::commands::{CommandDescriptor, CommandRegistry};
//! use clinch::invocation::Params;
//! use serde_json::json;
//!
//! let mut registry = CommandRegistry::new();
//! registry.add_command(CommandDescriptor::new("hello", |_: Params| Ok(json!("hi"))));
//!
//! let mut cli = Cli::builder("demo")
//!     .loader(registry)
//!     .stdout(std::io::sink())
//!     .build();
//! assert_eq!(cli.invoke(["hello"]), 0);
//! ```

use std::fmt;
use std::io::Write;

use serde_json::Value;

use crate::commands::{CommandLoader, CommandRegistry};
use crate::completion::{Autocomplete, ShellCompletion};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::events::{Event, EventBus};
use crate::invocation::{CommandInvoker, CommandResultItem};
use crate::parser::CommandParser;
use crate::query;
use crate::ui::{CliHelp, Help, Theme};

/// Parsed-args field carrying `--output`.
pub const OUTPUT_FIELD: &str = "_output";
/// State key holding the output format chosen on the command line.
pub const OUTPUT_KEY: &str = "output";

type RunOutcome = Result<(Option<CommandResultItem>, Option<String>)>;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty JSON of the raw result.
    #[default]
    Json,
    /// Pretty JSON of the table view.
    Table,
}

impl OutputFormat {
    /// Parse a format name. Unknown names fall back to JSON.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("table") {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// CLI context shared by every invocation.
pub struct Cli {
    /// Program name.
    pub name: String,
    /// Version reported by `--version`.
    pub version: Option<String>,
    /// Loaded configuration.
    pub config: CliConfig,
    /// Invocation events.
    pub events: EventBus,
    /// Output styling.
    pub theme: Theme,
    pub(crate) loader: Box<dyn CommandLoader>,
    pub(crate) help: Box<dyn Help>,
    pub(crate) completion: Box<dyn Autocomplete>,
    pub(crate) out: Box<dyn Write>,
    pub(crate) err: Box<dyn Write>,
}

impl Cli {
    /// Start building a CLI named `name`.
    pub fn builder(name: impl Into<String>) -> CliBuilder {
        CliBuilder::new(name)
    }

    /// The command loader.
    pub fn loader(&self) -> &dyn CommandLoader {
        self.loader.as_ref()
    }

    /// Run one invocation with the default parser and return its exit code.
    pub fn invoke<I, S>(&mut self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect();
        let outcome = run(&mut CommandInvoker::new(self), args);
        self.finish(outcome)
    }

    /// Run one invocation with a custom parser and return its exit code.
    pub fn invoke_with_parser<I, S>(&mut self, parser: Box<dyn CommandParser>, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect();
        let outcome = CommandInvoker::builder()
            .context(self)
            .parser(parser)
            .build()
            .and_then(|mut invoker| run(&mut invoker, args));
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: RunOutcome) -> i32 {
        match outcome {
            Ok((Some(item), output)) => match self.print_result(&item, output.as_deref()) {
                Ok(()) => item.exit_code,
                Err(err) => self.report_error(&err),
            },
            Ok((None, _)) => 0,
            Err(err) => self.report_error(&err),
        }
    }

    /// Print a result as pretty JSON.
    ///
    /// `output` is the format chosen on the command line; `core.output`
    /// applies otherwise. A `null` result prints nothing.
    pub fn print_result(&mut self, item: &CommandResultItem, output: Option<&str>) -> Result<()> {
        let format = output
            .map(OutputFormat::from_name)
            .or_else(|| self.config.get("core", "output").map(|o| OutputFormat::from_name(&o)))
            .unwrap_or_default();
        let value = match format {
            OutputFormat::Table => item.table_view(),
            OutputFormat::Json => item.result.clone(),
        };
        if value.is_null() {
            return Ok(());
        }
        writeln!(self.out, "{}", serde_json::to_string_pretty(&value)?)?;
        Ok(())
    }

    /// Print `err` and return the exit code it maps to.
    ///
    /// Help output (a parse "error" with exit code 0) goes to stdout.
    pub fn report_error(&mut self, err: &CliError) -> i32 {
        let code = err.exit_code();
        tracing::debug!(error = ?err, code, "invocation failed");
        let written = match err {
            CliError::Parse { message, .. } if err.is_help() => write!(self.out, "{message}"),
            CliError::Parse { message, .. } => write!(self.err, "{message}"),
            CliError::Validation { message, usage } => {
                let usage_line = usage
                    .as_deref()
                    .map(|u| format!("{}\n", u.trim_end()))
                    .unwrap_or_default();
                writeln!(
                    self.err,
                    "{usage_line}{}",
                    self.theme.format_error(&format!("error: {message}"))
                )
            }
            other => writeln!(
                self.err,
                "{}",
                self.theme.format_error(&format!("error: {other}"))
            ),
        };
        if let Err(io) = written {
            tracing::warn!(error = %io, "failed to write error output");
        }
        code
    }
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("config", &self.config)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Execute `args` and pick up the output format a hook left in the state.
fn run(invoker: &mut CommandInvoker<'_>, args: Vec<String>) -> RunOutcome {
    let item = invoker.execute(args)?;
    let output = invoker
        .state()
        .get(OUTPUT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok((item, output))
}

/// Builder for [`Cli`].
pub struct CliBuilder {
    name: String,
    version: Option<String>,
    config: Option<CliConfig>,
    theme: Option<Theme>,
    loader: Option<Box<dyn CommandLoader>>,
    help: Option<Box<dyn Help>>,
    completion: Option<Box<dyn Autocomplete>>,
    out: Option<Box<dyn Write>>,
    err: Option<Box<dyn Write>>,
}

impl CliBuilder {
    /// Start a builder for CLI `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            config: None,
            theme: None,
            loader: None,
            help: None,
            completion: None,
            out: None,
            err: None,
        }
    }

    /// Set the version shown by `--version`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Use `config` instead of an empty one.
    pub fn config(mut self, config: CliConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Set the command loader.
    pub fn loader(mut self, loader: impl CommandLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Set the help renderer.
    pub fn help(mut self, help: impl Help + 'static) -> Self {
        self.help = Some(Box::new(help));
        self
    }

    /// Set the completion handler.
    pub fn completion(mut self, completion: impl Autocomplete + 'static) -> Self {
        self.completion = Some(Box::new(completion));
        self
    }

    /// Redirect result output.
    pub fn stdout(mut self, out: impl Write + 'static) -> Self {
        self.out = Some(Box::new(out));
        self
    }

    /// Redirect diagnostics.
    pub fn stderr(mut self, err: impl Write + 'static) -> Self {
        self.err = Some(Box::new(err));
        self
    }

    /// Build the CLI and register the built-in hooks.
    pub fn build(self) -> Cli {
        let config = self.config.unwrap_or_else(|| CliConfig::new(&self.name));
        let theme = match self.theme {
            Some(theme) => theme,
            None if config.get_bool("core", "no_color") => Theme::plain(),
            None => Theme::new(),
        };

        let mut events = EventBus::new();
        query::register(&mut events);
        events.register(Event::PostParseArgs, |ctx| {
            let output = ctx
                .parsed_args()
                .and_then(|args| args.get_str(OUTPUT_FIELD))
                .map(str::to_string);
            if let Some(output) = output {
                ctx.state.set(OUTPUT_KEY, Value::String(output));
            }
            Ok(())
        });

        let help = self
            .help
            .unwrap_or_else(|| Box::new(CliHelp::new().with_theme(theme.clone())));
        let completion = self
            .completion
            .unwrap_or_else(|| Box::new(ShellCompletion::new(&self.name)));

        Cli {
            loader: self
                .loader
                .unwrap_or_else(|| Box::new(CommandRegistry::new())),
            help,
            completion,
            out: self.out.unwrap_or_else(|| Box::new(std::io::stdout())),
            err: self.err.unwrap_or_else(|| Box::new(std::io::stderr())),
            name: self.name,
            version: self.version,
            config,
            events,
            theme,
        }
    }
}
