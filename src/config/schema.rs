//! Sectioned CLI configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw file layout: `section: { option: value }`.
pub type Sections = BTreeMap<String, BTreeMap<String, serde_yaml::Value>>;

/// Configuration for one CLI.
///
/// Values come from the config file, overridden per key by environment
/// variables named `{PREFIX}_{SECTION}_{OPTION}`.
///
/// # Example
///
/// ```
/// use clinch::config::CliConfig;
///
/// let mut config = CliConfig::new("clinch-doc");
/// config.set_value("core", "output", "table");
/// assert_eq!(config.get("core", "output").as_deref(), Some("table"));
/// assert!(!config.get_bool("core", "only_show_errors"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(skip)]
    env_prefix: String,
    #[serde(flatten)]
    sections: Sections,
}

impl CliConfig {
    /// Create an empty config whose environment overrides use `name`.
    pub fn new(name: &str) -> Self {
        Self {
            env_prefix: env_prefix(name),
            sections: Sections::new(),
        }
    }

    /// Create a config from parsed file contents.
    pub fn from_sections(name: &str, sections: Sections) -> Self {
        Self {
            env_prefix: env_prefix(name),
            sections,
        }
    }

    /// Prefix used for environment overrides, e.g. `CLINCH`.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Environment variable that overrides `section.option`.
    pub fn env_var_name(&self, section: &str, option: &str) -> String {
        format!(
            "{}_{}_{}",
            self.env_prefix,
            section.to_uppercase(),
            option.to_uppercase()
        )
    }

    /// Value of `section.option`, environment first.
    pub fn get(&self, section: &str, option: &str) -> Option<String> {
        if let Ok(value) = std::env::var(self.env_var_name(section, option)) {
            return Some(value);
        }
        self.sections
            .get(section)
            .and_then(|options| options.get(option))
            .and_then(scalar_to_string)
    }

    /// Boolean value of `section.option`; absent reads as `false`.
    ///
    /// `true`, `yes`, `on`, and `1` are true, case-insensitively.
    pub fn get_bool(&self, section: &str, option: &str) -> bool {
        self.get(section, option)
            .map(|v| {
                matches!(
                    v.trim().to_lowercase().as_str(),
                    "true" | "yes" | "on" | "1"
                )
            })
            .unwrap_or(false)
    }

    /// Set `section.option` in memory.
    pub fn set_value(&mut self, section: &str, option: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), serde_yaml::Value::String(value.into()));
    }

    /// Raw sections as loaded.
    pub fn sections(&self) -> &Sections {
        &self.sections
    }
}

/// Environment prefix for a CLI name: upper-cased, `-` becomes `_`.
pub fn env_prefix(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
