//! Effective run settings.
//!
//! Combines the config file, command-line flags and environment variables
//! into the values the installer actually uses.

use std::env::VarError;
use std::path::{Path, PathBuf};

use crate::config::schema::{InstallerConfig, ProxyConfig};
use crate::providers::foojay::{default_jdks_dir, DEFAULT_BASE_URL};
use crate::registry::default_registry_path;

/// Environment override for the skip switch.
pub const SKIP_ENV: &str = "TOOLCHAIN_INSTALLER_SKIP";

/// Environment override for the JDK download directory.
pub const JDKS_DIR_ENV: &str = "TOOLCHAIN_JDKS_DIR";

/// Settings for one installer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Skip everything: no registry read, no provider, no write.
    pub skip: bool,

    /// User home, root of the SDKMAN, JBang and registry defaults.
    pub home: PathBuf,

    /// Registry document.
    pub registry_path: PathBuf,

    /// Download directory for remote JDKs.
    pub jdks_dir: PathBuf,

    /// Disco API base URL.
    pub disco_api: String,

    /// Proxy for remote calls.
    pub proxy: Option<ProxyConfig>,
}

impl RunSettings {
    /// Resolve settings, reading overrides through `env_fn`.
    ///
    /// When `TOOLCHAIN_INSTALLER_SKIP` is set its value alone decides the
    /// skip switch; otherwise the flag and the config file are combined.
    pub fn resolve<F>(config: &InstallerConfig, skip_flag: bool, home: &Path, env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let skip = match env_fn(SKIP_ENV) {
            Ok(value) => value.trim().eq_ignore_ascii_case("true"),
            Err(_) => skip_flag || config.skip,
        };

        let jdks_dir = env_fn(JDKS_DIR_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| config.jdks_dir.clone())
            .unwrap_or_else(|| default_jdks_dir(home));

        let registry_path = config
            .registry
            .clone()
            .unwrap_or_else(|| default_registry_path(home));

        let disco_api = config
            .disco_api
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            skip,
            home: home.to_path_buf(),
            registry_path,
            jdks_dir,
            disco_api,
            proxy: config.proxy.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned().ok_or(VarError::NotPresent)
    }

    fn home() -> &'static Path {
        Path::new("/home/dev")
    }

    #[test]
    fn defaults_come_from_home() {
        let settings = RunSettings::resolve(&InstallerConfig::default(), false, home(), env(&[]));
        assert!(!settings.skip);
        assert_eq!(settings.registry_path, PathBuf::from("/home/dev/.m2/toolchains.xml"));
        assert_eq!(settings.jdks_dir, PathBuf::from("/home/dev/.m2/jdks"));
        assert_eq!(settings.disco_api, DEFAULT_BASE_URL);
        assert!(settings.proxy.is_none());
    }

    #[test]
    fn skip_flag_or_config() {
        let config = InstallerConfig {
            skip: true,
            ..Default::default()
        };
        assert!(RunSettings::resolve(&config, false, home(), env(&[])).skip);
        assert!(RunSettings::resolve(&InstallerConfig::default(), true, home(), env(&[])).skip);
    }

    #[test]
    fn skip_env_wins_over_flag() {
        let off = RunSettings::resolve(
            &InstallerConfig::default(),
            true,
            home(),
            env(&[(SKIP_ENV, "false")]),
        );
        assert!(!off.skip);

        let on = RunSettings::resolve(
            &InstallerConfig::default(),
            false,
            home(),
            env(&[(SKIP_ENV, "TRUE")]),
        );
        assert!(on.skip);
    }

    #[test]
    fn jdks_dir_env_wins_over_config() {
        let config = InstallerConfig {
            jdks_dir: Some(PathBuf::from("/opt/jdks")),
            ..Default::default()
        };
        let from_config = RunSettings::resolve(&config, false, home(), env(&[]));
        assert_eq!(from_config.jdks_dir, PathBuf::from("/opt/jdks"));

        let from_env =
            RunSettings::resolve(&config, false, home(), env(&[(JDKS_DIR_ENV, "/srv/jdks")]));
        assert_eq!(from_env.jdks_dir, PathBuf::from("/srv/jdks"));
    }

    #[test]
    fn config_overrides_registry_and_api() {
        let config = InstallerConfig {
            registry: Some(PathBuf::from("/ci/toolchains.xml")),
            disco_api: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let settings = RunSettings::resolve(&config, false, home(), env(&[]));
        assert_eq!(settings.registry_path, PathBuf::from("/ci/toolchains.xml"));
        assert_eq!(settings.disco_api, "http://127.0.0.1:1");
    }
}
