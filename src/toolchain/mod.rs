//! Toolchain requirements and registered toolchains.
//!
//! A [`ToolchainRequirement`] is what a project asks for; a
//! [`RegisteredToolchain`] is what the registry (or a provider) can offer.
//!
//! # Modules
//!
//! - [`requirement`] - Declared requirements and kind normalization
//! - [`registered`] - Installed toolchains and the matching rule
//! - [`version`] - Major version and vendor resolution

pub mod registered;
pub mod requirement;
pub mod version;

pub use registered::RegisteredToolchain;
pub use requirement::{ToolchainRequirement, JDK_KIND, TEST_JDK_KIND};
pub use version::{is_default_vendor, major_version, resolve_vendor, DEFAULT_VENDOR};
