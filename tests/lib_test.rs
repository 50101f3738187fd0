//! Library integration tests.

use clinch::commands::{ArgumentSpec, CommandDescriptor, CommandGroup, CommandLoader, CommandRegistry};
use clinch::deprecation::{resolve_implicit_deprecation, DeprecationInfo, DeprecationKind};
use clinch::invocation::{filter_params, Params};
use clinch::CliError;
use serde_json::{json, Map};

#[test]
fn error_types_are_public() {
    let err = CliError::UnknownCommand {
        name: "vm frobnicate".into(),
    };
    assert!(err.to_string().contains("vm frobnicate"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> clinch::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn filtered_params_drop_private_and_framework_keys() {
    let mut fields = Map::new();
    fields.insert("_query".into(), json!("a.b"));
    fields.insert("name".into(), json!("web01"));
    fields.insert("func".into(), json!("<handler>"));
    fields.insert("command".into(), json!("vm create"));
    fields.insert("_output".into(), json!("table"));
    fields.insert("tags".into(), json!(["env=prod"]));

    let params = filter_params(&fields);

    assert_eq!(params.keys().collect::<Vec<_>>(), vec!["name", "tags"]);
}

fn registry_with_deprecated_vm() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .add_group(CommandGroup::new("vm").deprecated(DeprecationInfo::group("vm").with_redirect("compute")))
        .add_command(CommandDescriptor::new("vm create", |_: Params| Ok(())))
        .add_command(CommandDescriptor::new("vm disk attach", |_: Params| Ok(())))
        .add_command(CommandDescriptor::new("network list", |_: Params| Ok(())));
    registry
}

#[test]
fn deprecated_group_implies_command_deprecation() {
    let registry = registry_with_deprecated_vm();
    let info = resolve_implicit_deprecation("vm create", registry.command_table()).unwrap();

    assert_eq!(info.kind, DeprecationKind::Implicit);
    assert_eq!(info.object_type, "command");
    assert_eq!(info.target, "vm");
    assert_eq!(info.redirect.as_deref(), Some("compute"));
    assert_eq!(info.tag(), "");
}

#[test]
fn nested_commands_inherit_from_nearest_group() {
    let mut registry = registry_with_deprecated_vm();
    registry.add_group(CommandGroup::new("vm disk").deprecated(DeprecationInfo::group("vm disk")));

    let info = resolve_implicit_deprecation("vm disk attach", registry.command_table()).unwrap();

    assert_eq!(info.target, "vm disk");
    assert_eq!(info.redirect, None);
}

#[test]
fn resolution_is_deterministic() {
    let registry = registry_with_deprecated_vm();
    let first = resolve_implicit_deprecation("vm disk attach", registry.command_table());
    let second = resolve_implicit_deprecation("vm disk attach", registry.command_table());
    assert_eq!(first, second);
}

#[test]
fn commands_without_deprecated_ancestors_resolve_to_none() {
    let registry = registry_with_deprecated_vm();
    assert!(resolve_implicit_deprecation("network list", registry.command_table()).is_none());
}

#[test]
fn registry_attaches_scoped_arguments_once() {
    let mut registry = registry_with_deprecated_vm();
    registry
        .argument_context("vm", [ArgumentSpec::new("resource_group").required()])
        .argument_context("vm create", [ArgumentSpec::new("name")]);

    registry.load_arguments("vm create").unwrap();
    registry.load_arguments("vm create").unwrap();

    let table = registry.command_table();
    let create = table.get("vm create").unwrap();
    let dests: Vec<_> = create.arguments.iter().map(|a| a.dest.as_str()).collect();
    assert_eq!(dests, vec!["resource_group", "name"]);
    assert!(table.get("network list").unwrap().arguments.is_empty());
}
