//! Configuration loading and run settings.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Flag and environment precedence in [`settings`]
//!
//! # Example
//!
//! ```
//! use toolchain_installer::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("toolchains.yml");
//! fs::write(&path, "toolchains:\n  jdk:\n    version: '17'\n").unwrap();
//!
//! let config = load_config(&path).unwrap();
//! assert_eq!(config.toolchains.as_slice()[0].version(), Some("17"));
//! ```

pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{config_path, load_config, parse_config, CONFIG_FILE_NAME};
pub use schema::{InstallerConfig, ProxyConfig, RequirementSet};
pub use settings::{RunSettings, JDKS_DIR_ENV, SKIP_ENV};
