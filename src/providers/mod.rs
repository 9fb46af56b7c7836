//! JDK providers and the fallback chain that walks them.
//!
//! A provider is anything that can turn a [`JdkRequest`] into an installed
//! JDK. Providers are tried in order and the first [`ProviderOutcome::Found`]
//! wins; errors are logged and the chain moves on.
//!
//! # Modules
//!
//! - [`sdkman`] - Reuse JDKs already installed by SDKMAN
//! - [`jbang`] - Ask a local JBang installation to install a JDK
//! - [`foojay`] - Download a JDK through the foojay Disco API

pub mod foojay;
pub mod jbang;
pub mod sdkman;

use crate::toolchain::RegisteredToolchain;

/// A JDK to acquire, with the vendor already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdkRequest {
    /// Version as requested (e.g. "17", "17.0.1", "1.8").
    pub version: String,
    /// Vendor / distribution name.
    pub vendor: String,
}

impl JdkRequest {
    /// Create a request.
    pub fn new(version: impl Into<String>, vendor: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            vendor: vendor.into(),
        }
    }
}

/// Result of asking a single provider.
#[derive(Debug)]
pub enum ProviderOutcome {
    /// The provider produced an installation.
    Found(RegisteredToolchain),
    /// The provider has nothing for this request.
    NotFound,
    /// The provider failed; treated like `NotFound` by the chain.
    Error(anyhow::Error),
}

impl ProviderOutcome {
    /// Whether a toolchain was produced.
    pub fn is_found(&self) -> bool {
        matches!(self, ProviderOutcome::Found(_))
    }
}

/// One entry of the provider chain.
pub struct ProviderStep<'a> {
    /// Name used in logs.
    pub name: &'static str,
    /// Only consult this provider for the default vendor.
    ///
    /// Local caches are keyed by version only and cannot be trusted to hold
    /// a particular vendor's build.
    pub default_vendor_only: bool,
    /// The provider itself.
    pub find: &'a dyn Fn(&JdkRequest) -> ProviderOutcome,
}

/// Walk `steps` in order and return the first toolchain found.
pub fn run_chain(steps: &[ProviderStep<'_>], request: &JdkRequest) -> Option<RegisteredToolchain> {
    let default_vendor = crate::toolchain::is_default_vendor(&request.vendor);

    for step in steps {
        if step.default_vendor_only && !default_vendor {
            tracing::debug!(
                "Skipping {} for vendor {}: only the default vendor is served locally",
                step.name,
                request.vendor
            );
            continue;
        }

        tracing::debug!("Trying to retrieve toolchain from {}", step.name);
        match (step.find)(request) {
            ProviderOutcome::Found(toolchain) => {
                tracing::info!("JDK {} provided by {}", request.version, step.name);
                return Some(toolchain);
            }
            ProviderOutcome::NotFound => {
                tracing::info!("JDK not found in {}", step.name);
            }
            ProviderOutcome::Error(error) => {
                tracing::warn!(provider = step.name, "Provider failed: {:#}", error);
            }
        }
    }

    None
}
