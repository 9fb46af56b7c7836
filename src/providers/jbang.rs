//! JBang-managed JDK installation.
//!
//! JBang keeps JDKs in `~/.jbang/cache/jdks/<major>` and can install missing
//! ones with `jbang jdk install <major>`.

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{JdkRequest, ProviderOutcome};
use crate::toolchain::{major_version, RegisteredToolchain};

/// Installs JDKs through a local JBang executable.
#[derive(Debug, Clone)]
pub struct JbangProvider {
    root: PathBuf,
    windows: bool,
}

impl JbangProvider {
    /// Provider for the JBang installation at `<home>/.jbang`.
    pub fn from_home(home: &Path) -> Self {
        Self::new(home.join(".jbang"), cfg!(windows))
    }

    /// Provider for an explicit JBang root.
    pub fn new(root: impl Into<PathBuf>, windows: bool) -> Self {
        Self {
            root: root.into(),
            windows,
        }
    }

    /// Where JBang keeps the JDK for `major`.
    pub fn jdk_dir(&self, major: &str) -> PathBuf {
        self.root.join("cache").join("jdks").join(major)
    }

    /// The JBang launcher for this platform.
    pub fn executable(&self) -> PathBuf {
        let name = if self.windows { "jbang.cmd" } else { "jbang" };
        self.root.join("bin").join(name)
    }

    /// Install the JDK for `version`'s major version.
    ///
    /// An existing JBang JDK directory is not reused: only a JDK installed
    /// by this call is reported. The installer's exit status is not checked.
    pub fn find(&self, version: &str, vendor: &str) -> ProviderOutcome {
        let major = major_version(version);
        let jdk_home = self.jdk_dir(major);

        if jdk_home.exists() {
            tracing::debug!("JBang JDK directory {} already present", jdk_home.display());
            return ProviderOutcome::NotFound;
        }

        let executable = self.executable();
        if !executable.is_file() {
            tracing::debug!("JBang not installed at {}", executable.display());
            return ProviderOutcome::NotFound;
        }

        match self.install(&executable, major) {
            Ok(()) => {
                tracing::info!("JDK {} installed with JBang", major);
                ProviderOutcome::Found(RegisteredToolchain::jdk(&jdk_home, version, vendor))
            }
            Err(e) => ProviderOutcome::Error(e),
        }
    }

    /// Chain-compatible entry point.
    pub fn provide(&self, request: &JdkRequest) -> ProviderOutcome {
        self.find(&request.version, &request.vendor)
    }

    fn install(&self, executable: &Path, major: &str) -> anyhow::Result<()> {
        tracing::debug!("Running {} jdk install {}", executable.display(), major);
        let status = Command::new(executable)
            .args(["jdk", "install", major])
            .status()
            .with_context(|| format!("Failed to run {}", executable.display()))?;
        tracing::debug!("JBang exited with {}", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn executable_name_depends_on_platform() {
        let unix = JbangProvider::new("/h/.jbang", false);
        let windows = JbangProvider::new("/h/.jbang", true);
        assert_eq!(unix.executable(), PathBuf::from("/h/.jbang/bin/jbang"));
        assert_eq!(windows.executable(), PathBuf::from("/h/.jbang/bin/jbang.cmd"));
    }

    #[test]
    fn jdk_dir_uses_major_version() {
        let provider = JbangProvider::new("/h/.jbang", false);
        assert_eq!(
            provider.jdk_dir(major_version("17.0.2")),
            PathBuf::from("/h/.jbang/cache/jdks/17")
        );
    }

    #[test]
    fn missing_executable_is_not_found() {
        let temp = TempDir::new().unwrap();
        let provider = JbangProvider::new(temp.path(), false);
        assert!(matches!(provider.find("17", "oracle_open_jdk"), ProviderOutcome::NotFound));
    }

    #[test]
    fn existing_jdk_dir_is_not_found() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("cache/jdks/17")).unwrap();
        fs::create_dir_all(temp.path().join("bin")).unwrap();
        fs::write(temp.path().join("bin/jbang"), "").unwrap();

        let provider = JbangProvider::new(temp.path(), false);
        assert!(matches!(provider.find("17", "oracle_open_jdk"), ProviderOutcome::NotFound));
    }

    #[cfg(unix)]
    #[test]
    fn runs_installer_and_reports_expected_dir() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("args.log");
        write_script(
            &temp.path().join("bin/jbang"),
            &format!(
                "#!/bin/sh\necho \"$@\" > {}\nmkdir -p \"$(dirname \"$0\")/../cache/jdks/$3\"\n",
                log.display()
            ),
        );

        let provider = JbangProvider::new(temp.path(), false);
        match provider.find("1.8", "oracle_open_jdk") {
            ProviderOutcome::Found(tc) => {
                assert_eq!(tc.install_path, temp.path().join("cache/jdks/8"));
                assert_eq!(tc.version(), Some("1.8"));
                assert_eq!(tc.vendor(), Some("oracle_open_jdk"));
            }
            other => panic!("expected Found, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(&log).unwrap().trim(), "jdk install 8");
    }

    #[cfg(unix)]
    #[test]
    fn failing_installer_still_reports_found() {
        let temp = TempDir::new().unwrap();
        write_script(&temp.path().join("bin/jbang"), "#!/bin/sh\nexit 3\n");

        let provider = JbangProvider::new(temp.path(), false);
        assert!(provider.find("21", "oracle_open_jdk").is_found());
    }

    #[cfg(unix)]
    #[test]
    fn unspawnable_installer_is_an_error() {
        let temp = TempDir::new().unwrap();
        // present but not executable
        fs::create_dir_all(temp.path().join("bin")).unwrap();
        fs::write(temp.path().join("bin/jbang"), "not a program").unwrap();

        let provider = JbangProvider::new(temp.path(), false);
        assert!(matches!(provider.find("21", "oracle_open_jdk"), ProviderOutcome::Error(_)));
    }
}
