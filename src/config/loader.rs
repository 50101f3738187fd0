//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use super::schema::{env_prefix, CliConfig, Sections};
use crate::error::{CliError, Result};

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Directory holding the config file for CLI `name`.
///
/// `{PREFIX}_CONFIG_DIR` wins; otherwise `~/.{name}`. Returns `None` when
/// neither is available.
pub fn config_dir(name: &str) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(format!("{}_CONFIG_DIR", env_prefix(name))) {
        return Some(PathBuf::from(dir));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(format!(".{name}")))
}

/// Load the config for CLI `name` from its discovered directory.
///
/// A missing directory or file yields an empty config.
pub fn load_config(name: &str) -> Result<CliConfig> {
    match config_dir(name) {
        Some(dir) => load_config_from(name, &dir),
        None => Ok(CliConfig::new(name)),
    }
}

/// Load `{dir}/config.yml` for CLI `name`.
///
/// # Errors
///
/// Returns `CliError::Config` if the file exists but is not valid YAML.
pub fn load_config_from(name: &str, dir: &Path) -> Result<CliConfig> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(CliConfig::new(name));
        }
        Err(e) => return Err(CliError::Io(e)),
    };
    parse_config(name, &content, &path)
}

/// Parse YAML config content.
///
/// # Arguments
///
/// * `name` - CLI name, used for environment overrides
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(name: &str, content: &str, source_path: &Path) -> Result<CliConfig> {
    if content.trim().is_empty() {
        return Ok(CliConfig::new(name));
    }
    let sections: Sections = serde_yaml::from_str(content).map_err(|e| CliError::Config {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(CliConfig::from_sections(name, sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from("clinch-loader-missing", temp.path()).unwrap();
        assert!(config.sections().is_empty());
    }

    #[test]
    fn loads_sections_from_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "core:\n  output: table\nlogging:\n  level: debug\n",
        )
        .unwrap();

        let config = load_config_from("clinch-loader-file", temp.path()).unwrap();

        assert_eq!(config.get("core", "output").as_deref(), Some("table"));
        assert_eq!(config.get("logging", "level").as_deref(), Some("debug"));
    }

    #[test]
    fn empty_file_is_empty_config() {
        let config = parse_config("clinch-loader-empty", "  \n", Path::new("config.yml")).unwrap();
        assert!(config.sections().is_empty());
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let err = parse_config("clinch", "core: [unclosed", Path::new("/tmp/x/config.yml"))
            .unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("/tmp/x/config.yml"));
    }

    #[test]
    fn config_dir_honors_environment() {
        std::env::set_var("CLINCH_LOADER_DIR_CONFIG_DIR", "/opt/clinch");
        assert_eq!(
            config_dir("clinch-loader-dir"),
            Some(PathBuf::from("/opt/clinch"))
        );
        std::env::remove_var("CLINCH_LOADER_DIR_CONFIG_DIR");
    }
}
