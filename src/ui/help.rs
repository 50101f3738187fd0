//! Welcome view shown when the CLI is run without arguments.

use std::io::Write;

use crate::commands::CommandTable;
use crate::deprecation::DeprecationInfo;
use crate::error::Result;

use super::Theme;

/// Renders help views.
pub trait Help {
    /// Show the welcome view for the top-level command.
    fn show_welcome(&self, prog: &str, table: &CommandTable, out: &mut dyn Write) -> Result<()>;
}

/// Default help renderer.
///
/// Lists the top-level groups and commands with their summaries. Hidden
/// deprecations are left out; visible ones carry their tag.
#[derive(Debug, Clone, Default)]
pub struct CliHelp {
    welcome_message: Option<String>,
    theme: Option<Theme>,
}

impl CliHelp {
    /// Create a help renderer with the default banner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the banner printed above the listing.
    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = Some(message.into());
        self
    }

    /// Style output with `theme`.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    fn entries(table: &CommandTable) -> (Vec<(String, String)>, Vec<(String, String)>) {
        let groups = table
            .groups()
            .filter(|g| is_listed(&g.name, g.deprecation.as_ref()))
            .map(|g| (g.name.clone(), describe(g.deprecation.as_ref(), g.summary.as_deref())))
            .collect();
        let commands = table
            .commands()
            .filter(|c| is_listed(&c.name, c.deprecation.as_ref()))
            .map(|c| (c.name.clone(), describe(c.deprecation.as_ref(), c.summary.as_deref())))
            .collect();
        (groups, commands)
    }
}

impl Help for CliHelp {
    fn show_welcome(&self, prog: &str, table: &CommandTable, out: &mut dyn Write) -> Result<()> {
        let theme = self.theme.clone().unwrap_or_else(Theme::plain);
        let banner = self
            .welcome_message
            .clone()
            .unwrap_or_else(|| format!("Welcome to {prog}!"));

        writeln!(out, "{}", theme.format_header(&banner))?;
        writeln!(out)?;
        writeln!(out, "Use `{prog} <command> --help` for more information.")?;

        let (groups, commands) = Self::entries(table);
        let width = groups
            .iter()
            .chain(commands.iter())
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);

        for (heading, entries) in [("Groups:", &groups), ("Commands:", &commands)] {
            if entries.is_empty() {
                continue;
            }
            writeln!(out)?;
            writeln!(out, "{}", theme.format_header(heading))?;
            for (name, summary) in entries {
                let padded = format!("{name:<width$}");
                if summary.is_empty() {
                    writeln!(out, "    {}", theme.name.apply_to(padded).to_string().trim_end())?;
                } else {
                    writeln!(
                        out,
                        "    {} : {}",
                        theme.name.apply_to(padded),
                        theme.dim.apply_to(summary)
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn is_listed(name: &str, deprecation: Option<&DeprecationInfo>) -> bool {
    !name.contains(' ') && !deprecation.is_some_and(|d| d.hide)
}

fn describe(deprecation: Option<&DeprecationInfo>, summary: Option<&str>) -> String {
    let tag = deprecation.map(DeprecationInfo::tag).unwrap_or_default();
    let summary = summary.unwrap_or_default();
    match (tag.is_empty(), summary.is_empty()) {
        (true, _) => summary.to_string(),
        (false, true) => tag,
        (false, false) => format!("{tag} {summary}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandDescriptor, CommandGroup};
    use crate::invocation::Params;
    use serde_json::Value;

    fn handler(_: Params) -> anyhow::Result<Value> {
        Ok(Value::Null)
    }

    fn render(table: &CommandTable) -> String {
        let mut out = Vec::new();
        CliHelp::new().show_welcome("clinch", table, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn welcome_lists_top_level_entries() {
        let mut table = CommandTable::new();
        table.insert_group(CommandGroup::new("vm").with_summary("Manage virtual machines"));
        table.insert_command(CommandDescriptor::new("vm create", handler));
        table.insert_command(CommandDescriptor::new("version", handler).with_summary("Show version"));

        let text = render(&table);

        assert!(text.starts_with("Welcome to clinch!"));
        assert!(text.contains("Groups:"));
        assert!(text.contains("vm      : Manage virtual machines"));
        assert!(text.contains("version : Show version"));
        assert!(!text.contains("vm create"));
    }

    #[test]
    fn welcome_tags_deprecated_and_skips_hidden() {
        let mut table = CommandTable::new();
        table.insert_group(
            CommandGroup::new("vm")
                .with_summary("Manage virtual machines")
                .deprecated(DeprecationInfo::group("vm")),
        );
        table.insert_command(
            CommandDescriptor::new("legacy", handler)
                .deprecated(DeprecationInfo::command("legacy").hidden()),
        );

        let text = render(&table);

        assert!(text.contains("[Deprecated] Manage virtual machines"));
        assert!(!text.contains("legacy"));
    }

    #[test]
    fn custom_banner_replaces_default() {
        let table = CommandTable::new();
        let mut out = Vec::new();
        CliHelp::new()
            .with_welcome_message("Hello")
            .show_welcome("clinch", &table, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Hello\n"));
        assert!(!text.contains("Commands:"));
    }
}
