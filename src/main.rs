//! Clinch demo CLI entry point.
//!
//! Registers a small command set that exercises the pipeline: a deprecated
//! `vm` group (implicit deprecation), its `compute` replacement, a
//! deprecated option, validators at both levels, and a table transformer.

use std::process::ExitCode;

use anyhow::bail;
use clinch::cli::Cli;
use clinch::commands::{ArgKind, ArgumentSpec, CommandDescriptor, CommandGroup, CommandRegistry};
use clinch::config::{load_config, CliConfig};
use clinch::deprecation::DeprecationInfo;
use clinch::invocation::Params;
use clinch::parser::ParsedArgs;
use clinch::CliError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const NAME: &str = "clinch";

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `--verbose` flag sets level to INFO
/// 3. `RUST_LOG` environment variable (if set)
/// 4. `logging.level` from the config file
/// 5. Default is WARN
fn init_tracing(debug: bool, verbose: bool, config: &CliConfig) {
    let filter = if debug {
        EnvFilter::new("clinch=debug")
    } else if verbose {
        EnvFilter::new("clinch=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = config
                .get("logging", "level")
                .unwrap_or_else(|| "warn".to_string());
            EnvFilter::try_new(format!("clinch={level}"))
                .unwrap_or_else(|_| EnvFilter::new("clinch=warn"))
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[derive(Debug, Serialize)]
struct Machine {
    name: String,
    size: String,
    disk_size_gb: i64,
    tags: Vec<String>,
}

fn create_machine(params: Params) -> anyhow::Result<Machine> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let size = params
        .get("size")
        .and_then(Value::as_str)
        .unwrap_or("small")
        .to_string();
    let disk_size_gb = params
        .get("disk_size_gb")
        .and_then(Value::as_i64)
        .or_else(|| params.get("os_disk_gb").and_then(Value::as_i64))
        .unwrap_or(30);
    let tags = params
        .get("tags")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(Machine {
        name,
        size,
        disk_size_gb,
        tags,
    })
}

fn list_machines(_: Params) -> anyhow::Result<Value> {
    Ok(json!([
        {"name": "web01", "size": "small", "disk_size_gb": 30},
        {"name": "db01", "size": "large", "disk_size_gb": 256},
    ]))
}

fn machine_rows(result: &Value) -> Value {
    let rows = result
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|m| json!({"Name": m["name"], "Size": m["size"]}))
                .collect()
        })
        .unwrap_or_default();
    Value::Array(rows)
}

fn validate_name(args: &mut ParsedArgs) -> anyhow::Result<()> {
    let Some(name) = args.get_str("name") else {
        return Ok(());
    };
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        bail!("name '{name}' may only contain lowercase letters, digits and dashes");
    }
    Ok(())
}

fn machine_arguments() -> Vec<ArgumentSpec> {
    vec![
        ArgumentSpec::new("name")
            .with_options(["--name", "-n"])
            .with_help("Machine name")
            .required()
            .with_validator(validate_name),
        ArgumentSpec::new("size")
            .with_help("Machine size")
            .with_default(json!("small")),
        ArgumentSpec::new("disk_size_gb")
            .with_help("OS disk size in GB")
            .with_kind(ArgKind::Integer),
        ArgumentSpec::new("os_disk_gb")
            .with_help("OS disk size in GB")
            .with_kind(ArgKind::Integer)
            .deprecated(DeprecationInfo::option("--os-disk-gb").with_redirect("--disk-size-gb")),
        ArgumentSpec::new("tags")
            .with_help("Tags to apply")
            .with_kind(ArgKind::List),
    ]
}

fn build_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .add_group(
            CommandGroup::new("vm")
                .with_summary("Manage virtual machines")
                .deprecated(DeprecationInfo::group("vm").with_redirect("compute")),
        )
        .add_group(CommandGroup::new("compute").with_summary("Manage compute resources"))
        .add_command(CommandDescriptor::new("vm create", create_machine).with_summary("Create a machine"))
        .add_command(
            CommandDescriptor::new("vm list", list_machines)
                .with_summary("List machines")
                .with_table_transformer(machine_rows),
        )
        .add_command(
            CommandDescriptor::new("compute create", create_machine).with_summary("Create a machine"),
        )
        .add_command(
            CommandDescriptor::new("compute list", list_machines)
                .with_summary("List machines")
                .with_table_transformer(machine_rows),
        )
        .add_command(
            CommandDescriptor::new("echo", |params: Params| {
                let words: Vec<String> = params
                    .get("words")
                    .and_then(Value::as_array)
                    .map(|w| w.iter().filter_map(Value::as_str).map(str::to_string).collect())
                    .unwrap_or_default();
                let upper = params.get("upper").and_then(Value::as_bool).unwrap_or(false);
                let text = words.join(" ");
                Ok(if upper { text.to_uppercase() } else { text })
            })
            .with_summary("Print words back")
            .with_validator(|args: &mut ParsedArgs| {
                let empty = args
                    .get("words")
                    .and_then(Value::as_array)
                    .is_none_or(|w| w.is_empty());
                if empty {
                    return Err(CliError::validation("echo needs at least one word").into());
                }
                Ok(())
            }),
        )
        .add_command(
            CommandDescriptor::new("version", |_: Params| {
                Ok(json!({"clinch": env!("CARGO_PKG_VERSION")}))
            })
            .with_summary("Show version information"),
        )
        .argument_context("vm create", machine_arguments())
        .argument_context("compute create", machine_arguments())
        .argument_context(
            "echo",
            [
                ArgumentSpec::positional("words")
                    .with_help("Words to print")
                    .with_kind(ArgKind::List),
                ArgumentSpec::new("upper")
                    .with_help("Upper-case the output")
                    .with_kind(ArgKind::Flag),
            ],
        );
    registry
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match load_config(NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };
    init_tracing(
        args.iter().any(|a| a == "--debug"),
        args.iter().any(|a| a == "--verbose"),
        &config,
    );

    tracing::debug!(?args, "clinch starting");

    let mut cli = Cli::builder(NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .config(config)
        .loader(build_registry())
        .build();

    let code = cli.invoke(args);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
