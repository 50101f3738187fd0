//! CLI configuration.
//!
//! - [`schema`] - [`CliConfig`], sectioned values with environment overrides
//! - [`loader`] - Locating and parsing `config.yml`
//!
//! # Example
//!
//! ```
//! use clinch::config::load_config_from;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("config.yml"), "core:\n  only_show_errors: yes\n").unwrap();
//!
//! let config = load_config_from("clinch-doc-config", temp.path()).unwrap();
//! assert!(config.get_bool("core", "only_show_errors"));
//! ```
//!
//! # Recognized keys
//!
//! | Key                     | Effect                                   |
//! |-------------------------|------------------------------------------|
//! | `core.only_show_errors` | Suppress deprecation warnings            |
//! | `core.no_color`         | Plain output                             |
//! | `core.output`           | `json` (default) or `table`              |
//! | `logging.level`         | Log filter when `RUST_LOG` is unset      |

pub mod loader;
pub mod schema;

pub use loader::{config_dir, load_config, load_config_from, parse_config, CONFIG_FILE_NAME};
pub use schema::{env_prefix, CliConfig, Sections};
