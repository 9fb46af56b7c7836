//! The persistent toolchain registry (`~/.m2/toolchains.xml`).
//!
//! [`ToolchainRegistry`] is loaded once per run. It answers "is there already
//! a toolchain for this requirement?" and records new installations both on
//! disk and in memory, so later requirements in the same run see them.
//!
//! # Modules
//!
//! - [`document`] - XML parsing and byte-preserving append

pub mod document;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolchainError};
use crate::toolchain::RegisteredToolchain;

/// Location of the registry below the user's home directory.
pub fn default_registry_path(home: &Path) -> PathBuf {
    home.join(".m2").join("toolchains.xml")
}

/// Registered toolchains backed by a `toolchains.xml` file.
#[derive(Debug, Clone)]
pub struct ToolchainRegistry {
    path: PathBuf,
    toolchains: Vec<RegisteredToolchain>,
}

impl ToolchainRegistry {
    /// Load the registry at `path`.
    ///
    /// A missing file is an empty registry. A file that cannot be parsed is
    /// reported as [`ToolchainError::MisconfiguredRegistry`].
    pub fn load(path: &Path) -> Result<Self> {
        let toolchains = match fs::read_to_string(path) {
            Ok(xml) => document::parse_toolchains(&xml).map_err(|message| {
                ToolchainError::MisconfiguredRegistry {
                    path: path.to_path_buf(),
                    message,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Loaded {} toolchain(s) from {}",
            toolchains.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            toolchains,
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All known toolchains, in document order followed by this run's installs.
    pub fn toolchains(&self) -> &[RegisteredToolchain] {
        &self.toolchains
    }

    /// First toolchain of `kind` that satisfies `params`.
    pub fn find_match(
        &self,
        kind: &str,
        params: &BTreeMap<String, String>,
    ) -> Option<&RegisteredToolchain> {
        self.toolchains
            .iter()
            .find(|tc| tc.kind == kind && tc.matches(params))
    }

    /// Append a toolchain to the document and to the in-memory set.
    ///
    /// The current file is re-read so entries written since [`load`](Self::load)
    /// are kept. The new document is written next to the old one and renamed
    /// over it.
    pub fn append(&mut self, toolchain: RegisteredToolchain) -> Result<()> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(xml) => Some(xml),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let updated = document::append_toolchain(existing.as_deref(), &toolchain).map_err(
            |message| ToolchainError::MisconfiguredRegistry {
                path: self.path.clone(),
                message,
            },
        )?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("xml.tmp");
        fs::write(&staging, updated)?;
        fs::rename(&staging, &self.path)?;

        tracing::info!("Added {} to {}", toolchain, self.path.display());
        self.toolchains.push(toolchain);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_path_is_under_m2() {
        let path = default_registry_path(Path::new("/home/dev"));
        assert_eq!(path, PathBuf::from("/home/dev/.m2/toolchains.xml"));
    }

    #[test]
    fn missing_file_is_empty_registry() {
        let temp = TempDir::new().unwrap();
        let registry = ToolchainRegistry::load(&temp.path().join("toolchains.xml")).unwrap();
        assert!(registry.toolchains().is_empty());
    }

    #[test]
    fn malformed_file_is_misconfiguration() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("toolchains.xml");
        fs::write(&path, "<toolchains><toolchain>").unwrap();

        let err = ToolchainRegistry::load(&path).unwrap_err();
        assert!(matches!(err, ToolchainError::MisconfiguredRegistry { .. }));
    }

    #[test]
    fn append_creates_parent_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let path = default_registry_path(temp.path());
        let mut registry = ToolchainRegistry::load(&path).unwrap();

        let tc = RegisteredToolchain::jdk(Path::new("/opt/jdk-17"), "17", "");
        registry.append(tc.clone()).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("xml.tmp").exists());
        assert_eq!(registry.toolchains(), &[tc.clone()]);

        let reloaded = ToolchainRegistry::load(&path).unwrap();
        assert_eq!(reloaded.toolchains(), &[tc]);
    }

    #[test]
    fn appended_toolchain_is_matchable_in_same_run() {
        let temp = TempDir::new().unwrap();
        let mut registry = ToolchainRegistry::load(&temp.path().join("t.xml")).unwrap();
        registry
            .append(RegisteredToolchain::jdk(Path::new("/opt/jdk-21"), "21", "zulu"))
            .unwrap();

        assert!(registry
            .find_match("jdk", &params(&[("version", "21"), ("vendor", "zulu")]))
            .is_some());
        assert!(registry.find_match("jdk", &params(&[("version", "17")])).is_none());
        assert!(registry.find_match("maven", &BTreeMap::new()).is_none());
    }

    #[test]
    fn repeated_appends_grow_one_record_each() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("toolchains.xml");
        let mut registry = ToolchainRegistry::load(&path).unwrap();

        for version in ["11", "17", "21"] {
            registry
                .append(RegisteredToolchain::jdk(
                    &temp.path().join(version),
                    version,
                    "",
                ))
                .unwrap();
            let on_disk = ToolchainRegistry::load(&path).unwrap();
            assert_eq!(on_disk.toolchains(), registry.toolchains());
        }
        assert_eq!(registry.toolchains().len(), 3);
    }
}
