//! Remote JDK download through the foojay Disco API.
//!
//! The last link in the provider chain: resolve a package for the requested
//! distribution and platform, download it into the JDK directory, unpack it
//! and report the resulting JDK home.
//!
//! # Modules
//!
//! - [`client`] - API queries and archive download
//! - [`platform`] - OS/architecture naming

pub mod client;
pub mod platform;

pub use client::{ArchiveDescriptor, DiscoClient, DEFAULT_BASE_URL};
pub use platform::Platform;

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{JdkRequest, ProviderOutcome};
use crate::archive;
use crate::toolchain::RegisteredToolchain;

/// Marker in a vendor name for GraalVM distributions.
pub const GRAALVM_MARKER: &str = "graalvm";

/// Default download directory below the user's home.
pub fn default_jdks_dir(home: &Path) -> PathBuf {
    home.join(".m2").join("jdks")
}

/// Downloads and unpacks JDKs.
pub struct FoojayProvider {
    client: DiscoClient,
    platform: Platform,
    jdks_dir: PathBuf,
    show_progress: bool,
}

impl FoojayProvider {
    /// Provider downloading into `jdks_dir`.
    pub fn new(client: DiscoClient, platform: Platform, jdks_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            platform,
            jdks_dir: jdks_dir.into(),
            show_progress: false,
        }
    }

    /// Show a progress bar while downloading.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Directory archives are downloaded and unpacked into.
    pub fn jdks_dir(&self) -> &Path {
        &self.jdks_dir
    }

    /// Download, unpack and describe the JDK for `version` and `vendor`.
    pub fn download(&self, version: &str, vendor: &str) -> ProviderOutcome {
        match self.try_download(version, vendor) {
            Ok(toolchain) => ProviderOutcome::Found(toolchain),
            Err(e) => ProviderOutcome::Error(e.context("Failed to download and install JDK")),
        }
    }

    /// Chain-compatible entry point.
    pub fn provide(&self, request: &JdkRequest) -> ProviderOutcome {
        self.download(&request.version, &request.vendor)
    }

    fn try_download(&self, version: &str, vendor: &str) -> anyhow::Result<RegisteredToolchain> {
        tracing::info!("Downloading JDK {} {} from foojay", vendor, version);

        let request = JdkRequest::new(version, vendor);
        let descriptor = self.client.resolve(&request, &self.platform)?;

        fs::create_dir_all(&self.jdks_dir)
            .with_context(|| format!("Failed to create {}", self.jdks_dir.display()))?;
        let jdks_dir = std::path::absolute(&self.jdks_dir)?;

        let archive_path = self
            .client
            .download(&descriptor, &jdks_dir, self.show_progress)?;

        tracing::debug!("Extracting {}", descriptor.file_name);
        let top_level = archive::top_level_entry_name(&archive_path)?;
        archive::extract(&archive_path, &jdks_dir)?;
        if let Err(e) = fs::remove_file(&archive_path) {
            tracing::warn!("Could not remove {}: {}", archive_path.display(), e);
        }

        let mut jdk_home = jdks_dir.join(top_level);
        let bundle_home = jdk_home.join("Contents").join("Home");
        if bundle_home.is_dir() {
            jdk_home = bundle_home;
        }
        tracing::info!("JDK downloaded: {}", jdk_home.display());

        if vendor.contains(GRAALVM_MARKER) {
            install_native_image(&jdk_home, self.platform.os == "windows")?;
        }

        Ok(RegisteredToolchain::jdk(&jdk_home, version, vendor))
    }
}

/// Start `gu install native-image` for a GraalVM home without waiting on it.
#[allow(clippy::zombie_processes)]
fn install_native_image(jdk_home: &Path, windows: bool) -> anyhow::Result<()> {
    let gu = jdk_home
        .join("bin")
        .join(if windows { "gu.cmd" } else { "gu" });
    if !gu.is_file() {
        tracing::debug!("No GraalVM updater at {}, skipping native-image", gu.display());
        return Ok(());
    }

    tracing::info!("Installing native-image with {}", gu.display());
    Command::new(&gu)
        .args(["install", "native-image", "--ignore"])
        .env("GRAALVM_HOME", jdk_home)
        .spawn()
        .with_context(|| format!("Failed to start {}", gu.display()))?;
    Ok(())
}
