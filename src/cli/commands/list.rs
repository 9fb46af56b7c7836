//! List command implementation.
//!
//! The `toolchain-installer list` command prints the toolchains recorded in
//! the registry.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::config::{config_path, load_config, InstallerConfig, RunSettings};
use crate::error::{Result, ToolchainError};
use crate::registry::ToolchainRegistry;
use crate::ui::theme::InstallerTheme;
use crate::ui::{should_use_colors, UserInterface};

use super::dispatcher::{home_dir, Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    home: Option<PathBuf>,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            home: None,
            args,
        }
    }

    /// Use `home` instead of the user's home directory.
    pub fn with_home(mut self, home: &Path) -> Self {
        self.home = Some(home.to_path_buf());
        self
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // The config only relocates the registry, so it is optional here
        let path = config_path(&self.project_root, self.config.as_deref());
        let config = match load_config(&path) {
            Ok(config) => config,
            Err(ToolchainError::ConfigNotFound { .. }) => InstallerConfig::default(),
            Err(e) => return Err(e),
        };

        let home = home_dir(self.home.as_deref())?;
        let settings = RunSettings::resolve(&config, false, &home, |key| std::env::var(key));
        let registry = ToolchainRegistry::load(&settings.registry_path)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(registry.toolchains())
                .map_err(|e| ToolchainError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if registry.toolchains().is_empty() {
            ui.message(&format!(
                "No toolchains registered in {}",
                registry.path().display()
            ));
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() {
            InstallerTheme::new()
        } else {
            InstallerTheme::plain()
        };

        ui.message(&format!(
            "  {}",
            theme
                .key
                .apply_to(format!("Toolchains ({}):", registry.path().display()))
        ));
        for toolchain in registry.toolchains() {
            let provides: Vec<String> = toolchain
                .provides
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            ui.message(&format!(
                "    {} {}",
                theme.highlight.apply_to(&toolchain.kind),
                theme.dim.apply_to(provides.join(" "))
            ));
            ui.message(&format!(
                "      {}",
                theme.dim.apply_to(toolchain.install_path.display())
            ));
        }

        Ok(CommandResult::success())
    }
}
