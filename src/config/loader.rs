//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::InstallerConfig;
use crate::error::{Result, ToolchainError};

/// Config file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "toolchains.yml";

/// Path of the config file to use.
///
/// An explicit path (from `--config`) wins over the project default.
pub fn config_path(project_root: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => project_root.join(path),
        None => project_root.join(CONFIG_FILE_NAME),
    }
}

/// Load and parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<InstallerConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolchainError::ConfigNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    parse_config(&content, path)
}

/// Parse config file content; `path` is only used for error messages.
pub fn parse_config(content: &str, path: &Path) -> Result<InstallerConfig> {
    if content.trim().is_empty() {
        return Ok(InstallerConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| ToolchainError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
