//! SDKMAN candidate lookup.
//!
//! SDKMAN installs JDKs under `<SDKMAN_DIR>/candidates/java/<identifier>`.
//! A requirement whose version is exactly such an identifier can be used
//! without downloading anything.

use std::path::{Path, PathBuf};

use super::{JdkRequest, ProviderOutcome};
use crate::toolchain::RegisteredToolchain;

/// Finds JDKs already installed by SDKMAN.
#[derive(Debug, Clone)]
pub struct SdkmanProvider {
    root: PathBuf,
}

impl SdkmanProvider {
    /// Provider rooted at an explicit SDKMAN directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate SDKMAN from `SDKMAN_DIR`, falling back to `<home>/.sdkman`.
    pub fn discover<F>(home: &Path, env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        match env_fn("SDKMAN_DIR") {
            Ok(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::new(home.join(".sdkman")),
        }
    }

    /// Directory holding installed Java candidates.
    pub fn candidates_dir(&self) -> PathBuf {
        self.root.join("candidates").join("java")
    }

    /// Look for a candidate directory named exactly `version`.
    ///
    /// The vendor is recorded as empty since SDKMAN identifiers are not
    /// vendor names.
    pub fn find(&self, version: &str) -> ProviderOutcome {
        let candidates = self.candidates_dir();
        if !candidates.is_dir() {
            tracing::debug!("No SDKMAN candidates at {}", candidates.display());
            return ProviderOutcome::NotFound;
        }

        let jdk_home = candidates.join(version);
        if !jdk_home.is_dir() {
            return ProviderOutcome::NotFound;
        }

        tracing::info!("Found JDK in SDKMAN: {}", jdk_home.display());
        ProviderOutcome::Found(RegisteredToolchain::jdk(&jdk_home, version, ""))
    }

    /// Chain-compatible entry point.
    pub fn provide(&self, request: &JdkRequest) -> ProviderOutcome {
        self.find(&request.version)
    }
}
