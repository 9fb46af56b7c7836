//! Install command implementation.
//!
//! The `toolchain-installer install` command resolves every configured
//! toolchain requirement, installing and registering what is missing.

use std::path::{Path, PathBuf};

use crate::cli::args::InstallArgs;
use crate::config::{config_path, load_config, RunSettings};
use crate::error::{Result, ToolchainError};
use crate::resolver::{self, ResolutionProgress};
use crate::ui::UserInterface;

use super::dispatcher::{home_dir, Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    project_root: PathBuf,
    config: Option<PathBuf>,
    home: Option<PathBuf>,
    args: InstallArgs,
}

impl InstallCommand {
    /// Create a new install command.
    pub fn new(project_root: &Path, config: Option<&Path>, args: InstallArgs) -> Self {
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
    pub fn args(&self) -> &InstallArgs {
        &self.args
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let path = config_path(&self.project_root, self.config.as_deref());
        let config = match load_config(&path) {
            Ok(config) => config,
            Err(ToolchainError::ConfigNotFound { path }) => {
                ui.error(&format!("No configuration found at {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let home = home_dir(self.home.as_deref())?;
        let settings = RunSettings::resolve(&config, self.args.skip, &home, |key| {
            std::env::var(key)
        });
        tracing::debug!("Run settings: {:?}", settings);

        let requirements = config.toolchains.as_slice();
        if !settings.skip {
            ui.show_header(&format!("Resolving {} toolchain(s)", requirements.len()));
        }

        let show_progress =
            !self.args.no_progress && ui.is_interactive() && ui.output_mode().shows_progress();

        let outcome = resolver::install(&settings, requirements, show_progress, |event| {
            match event {
                ResolutionProgress::Matched {
                    requirement,
                    toolchain,
                } => ui.success(&format!(
                    "{} -> {} (registered)",
                    requirement,
                    toolchain.install_path.display()
                )),
                ResolutionProgress::Installed {
                    requirement,
                    toolchain,
                } => ui.success(&format!(
                    "{} -> {} (installed)",
                    requirement,
                    toolchain.install_path.display()
                )),
                ResolutionProgress::Unresolved { requirement } => {
                    ui.warning(&format!("{}: no provider could supply it", requirement))
                }
            }
        });

        match outcome {
            Ok(None) => {
                ui.message("Toolchain installation skipped");
                Ok(CommandResult::success())
            }
            Ok(Some(context)) => {
                if context.is_empty() {
                    ui.message("No toolchains required");
                }
                Ok(CommandResult::success())
            }
            Err(e @ ToolchainError::Unresolved { .. }) => {
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("toolchains.yml"), config).unwrap();
        temp
    }

    fn command(project: &TempDir, args: InstallArgs) -> InstallCommand {
        InstallCommand::new(project.path(), None, args).with_home(project.path())
    }

    #[test]
    fn missing_config_exits_with_2() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = command(&temp, InstallArgs::default()).execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("No configuration found"));
    }

    #[test]
    fn skip_flag_skips_everything() {
        let temp = setup_project("toolchains:\n  jdk:\n    version: '17'\n");
        let mut ui = MockUI::new();
        let args = InstallArgs {
            skip: true,
            no_progress: true,
        };

        // flag is only consulted when the environment override is absent
        if std::env::var(crate::config::SKIP_ENV).is_ok() {
            return;
        }
        let result = command(&temp, args).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("skipped"));
        assert!(!temp.path().join(".m2").exists());
    }

    #[test]
    fn registered_toolchain_is_reported() {
        let temp = setup_project("toolchains:\n  testJdk:\n    version: '17'\n");
        fs::create_dir_all(temp.path().join(".m2")).unwrap();
        fs::write(
            temp.path().join(".m2/toolchains.xml"),
            "<toolchains><toolchain><type>jdk</type><provides><version>17</version></provides>\
             <configuration><jdkHome>/opt/jdk17</jdkHome></configuration></toolchain></toolchains>",
        )
        .unwrap();
        let mut ui = MockUI::new();

        if std::env::var(crate::config::SKIP_ENV).is_ok() {
            return;
        }
        let result = command(&temp, InstallArgs::default()).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_success("testJdk [ version = '17' ] -> /opt/jdk17"));
    }

    #[test]
    fn unresolvable_kind_fails_with_aggregated_message() {
        let temp = setup_project(
            "disco_api: http://127.0.0.1:1\ntoolchains:\n  netbeans:\n    version: '12'\n",
        );
        let mut ui = MockUI::new();

        if std::env::var(crate::config::SKIP_ENV).is_ok() {
            return;
        }
        let result = command(&temp, InstallArgs::default()).execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_warning("netbeans"));
        assert!(ui.has_error("Cannot find matching toolchain definitions"));
        assert!(ui.has_error("netbeans [ version = '12' ]"));
    }

    #[test]
    fn empty_config_succeeds() {
        let temp = setup_project("");
        let mut ui = MockUI::new();

        if std::env::var(crate::config::SKIP_ENV).is_ok() {
            return;
        }
        let result = command(&temp, InstallArgs::default()).execute(&mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_message("No toolchains required"));
    }
}
