//! Toolchain resolution.
//!
//! [`Resolver`] walks the required toolchains in declaration order. Each
//! requirement is first matched against the registry; JDK requirements
//! without a match go through the provider chain, and whatever a provider
//! produces is appended to the registry. Requirements nobody could satisfy
//! are reported together once every requirement has been tried.

use std::env;

use crate::config::RunSettings;
use crate::error::{Result, ToolchainError};
use crate::providers::foojay::{DiscoClient, FoojayProvider, Platform};
use crate::providers::jbang::JbangProvider;
use crate::providers::sdkman::SdkmanProvider;
use crate::providers::{run_chain, JdkRequest, ProviderStep};
use crate::registry::ToolchainRegistry;
use crate::toolchain::{resolve_vendor, RegisteredToolchain, ToolchainRequirement};

/// Progress events emitted while resolving.
#[derive(Debug)]
pub enum ResolutionProgress<'a> {
    /// A registered toolchain already satisfies the requirement.
    Matched {
        requirement: &'a ToolchainRequirement,
        toolchain: &'a RegisteredToolchain,
    },
    /// A provider installed a toolchain and it was registered.
    Installed {
        requirement: &'a ToolchainRequirement,
        toolchain: &'a RegisteredToolchain,
    },
    /// Nothing could satisfy the requirement.
    Unresolved { requirement: &'a ToolchainRequirement },
}

/// Toolchains selected for the rest of the build, keyed by requirement kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    active: Vec<(String, RegisteredToolchain)>,
}

impl BuildContext {
    /// Make `toolchain` the active one for `kind`.
    pub fn activate(&mut self, kind: &str, toolchain: RegisteredToolchain) {
        match self.active.iter_mut().find(|(k, _)| k == kind) {
            Some(entry) => entry.1 = toolchain,
            None => self.active.push((kind.to_string(), toolchain)),
        }
    }

    /// The active toolchain for `kind`.
    pub fn active(&self, kind: &str) -> Option<&RegisteredToolchain> {
        self.active
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, toolchain)| toolchain)
    }

    /// Active toolchains in activation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisteredToolchain)> {
        self.active.iter().map(|(k, tc)| (k.as_str(), tc))
    }

    /// Number of active toolchains.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Resolves requirements against a registry and a provider chain.
pub struct Resolver<'a> {
    registry: &'a mut ToolchainRegistry,
    providers: &'a [ProviderStep<'a>],
    context: BuildContext,
}

impl<'a> Resolver<'a> {
    /// Create a resolver.
    pub fn new(registry: &'a mut ToolchainRegistry, providers: &'a [ProviderStep<'a>]) -> Self {
        Self {
            registry,
            providers,
            context: BuildContext::default(),
        }
    }

    /// Toolchains activated so far.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Consume the resolver, keeping the activated toolchains.
    pub fn into_context(self) -> BuildContext {
        self.context
    }

    /// Resolve every requirement.
    pub fn resolve_all(&mut self, requirements: &[ToolchainRequirement]) -> Result<()> {
        self.resolve_all_with_progress(requirements, |_| {})
    }

    /// Resolve every requirement with a progress callback.
    ///
    /// Toolchains registered before a failure stay registered.
    pub fn resolve_all_with_progress(
        &mut self,
        requirements: &[ToolchainRequirement],
        mut on_progress: impl FnMut(ResolutionProgress<'_>),
    ) -> Result<()> {
        let mut unresolved = Vec::new();

        for requirement in requirements {
            tracing::info!("Required toolchain: {}", requirement);

            let kind = requirement.normalized_kind();
            if let Some(existing) = self.registry.find_match(kind, &requirement.params) {
                let existing = existing.clone();
                tracing::info!("Found matching toolchain for type {}: {}", kind, existing);
                on_progress(ResolutionProgress::Matched {
                    requirement,
                    toolchain: &existing,
                });
                self.context.activate(&requirement.kind, existing);
                continue;
            }

            match self.acquire(requirement) {
                Some(toolchain) => {
                    on_progress(ResolutionProgress::Installed {
                        requirement,
                        toolchain: &toolchain,
                    });
                    self.context.activate(&requirement.kind, toolchain);
                }
                None => {
                    tracing::error!("No toolchain could be provided for {}", requirement);
                    on_progress(ResolutionProgress::Unresolved { requirement });
                    unresolved.push(requirement.clone());
                }
            }
        }

        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(ToolchainError::Unresolved {
                requirements: unresolved,
            })
        }
    }

    fn acquire(&mut self, requirement: &ToolchainRequirement) -> Option<RegisteredToolchain> {
        if !requirement.is_jdk() {
            tracing::debug!("No provider for toolchain type {}", requirement.kind);
            return None;
        }

        let version = match requirement.version().filter(|v| !v.is_empty()) {
            Some(version) => version,
            None => {
                tracing::warn!("Cannot install a JDK without a version: {}", requirement);
                return None;
            }
        };
        let vendor = resolve_vendor(requirement.vendor());
        let request = JdkRequest::new(version, vendor);

        let toolchain = run_chain(self.providers, &request)?;
        if let Err(e) = self.registry.append(toolchain.clone()) {
            tracing::error!(
                "Could not register {} in {}: {}",
                toolchain,
                self.registry.path().display(),
                e
            );
            return None;
        }
        Some(toolchain)
    }
}

/// Resolve `requirements` with the standard provider chain.
///
/// Returns `Ok(None)` without touching the registry or any provider when the
/// run is skipped. A registry that cannot be parsed aborts the run.
pub fn install(
    settings: &RunSettings,
    requirements: &[ToolchainRequirement],
    show_progress: bool,
    on_progress: impl FnMut(ResolutionProgress<'_>),
) -> Result<Option<BuildContext>> {
    if settings.skip {
        tracing::info!("Skipping toolchain installation");
        return Ok(None);
    }

    let mut registry = ToolchainRegistry::load(&settings.registry_path)?;

    let sdkman = SdkmanProvider::discover(&settings.home, |key| env::var(key));
    let jbang = JbangProvider::from_home(&settings.home);
    let client = DiscoClient::new(&settings.disco_api, settings.proxy.as_ref())?;
    let foojay = FoojayProvider::new(client, Platform::current(), &settings.jdks_dir)
        .with_progress(show_progress);

    let from_sdkman = |request: &JdkRequest| sdkman.provide(request);
    let from_jbang = |request: &JdkRequest| jbang.provide(request);
    let from_foojay = |request: &JdkRequest| foojay.provide(request);
    let providers = [
        ProviderStep {
            name: "SDKMAN",
            default_vendor_only: true,
            find: &from_sdkman,
        },
        ProviderStep {
            name: "JBang",
            default_vendor_only: true,
            find: &from_jbang,
        },
        ProviderStep {
            name: "foojay",
            default_vendor_only: false,
            find: &from_foojay,
        },
    ];

    let mut resolver = Resolver::new(&mut registry, &providers);
    resolver.resolve_all_with_progress(requirements, on_progress)?;
    Ok(Some(resolver.into_context()))
}
