//! Installed toolchains known to the registry.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::requirement::JDK_KIND;

/// A toolchain that exists on disk and can be offered to a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredToolchain {
    /// Toolchain kind (the registry's `type` element).
    pub kind: String,
    /// Values this toolchain provides, matched against requirement params.
    pub provides: BTreeMap<String, String>,
    /// Installation root (`configuration/jdkHome` for JDKs).
    pub install_path: PathBuf,
}

impl RegisteredToolchain {
    /// Describe a JDK installed at `install_path`.
    ///
    /// The vendor is recorded even when empty.
    pub fn jdk(install_path: &Path, version: &str, vendor: &str) -> Self {
        let mut provides = BTreeMap::new();
        provides.insert("version".to_string(), version.to_string());
        provides.insert("vendor".to_string(), vendor.to_string());
        Self {
            kind: JDK_KIND.to_string(),
            provides,
            install_path: install_path.to_path_buf(),
        }
    }

    /// Whether every required param is provided with an identical value.
    ///
    /// Extra keys in `provides` are ignored.
    pub fn matches(&self, params: &BTreeMap<String, String>) -> bool {
        params
            .iter()
            .all(|(key, value)| self.provides.get(key) == Some(value))
    }

    /// Provided version, if recorded.
    pub fn version(&self) -> Option<&str> {
        self.provides.get("version").map(String::as_str)
    }

    /// Provided vendor, if recorded.
    pub fn vendor(&self) -> Option<&str> {
        self.provides.get("vendor").map(String::as_str)
    }
}

impl fmt::Display for RegisteredToolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.kind)?;
        for (key, value) in &self.provides {
            write!(f, " {} = '{}'", key, value)?;
        }
        write!(f, " ] at {}", self.install_path.display())
    }
}
