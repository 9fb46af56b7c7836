//! toolchain-installer - Provision the JDK toolchains a build requires.
//!
//! Requirements are declared in `toolchains.yml`. Each one is matched
//! against the toolchains registered in `~/.m2/toolchains.xml`; missing JDKs
//! are taken from SDKMAN, installed with JBang, or downloaded through the
//! foojay Disco API, then registered for later runs.
//!
//! # Modules
//!
//! - [`archive`] - tar.gz and zip extraction
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and run settings
//! - [`error`] - Error types and result aliases
//! - [`providers`] - JDK providers and the fallback chain
//! - [`registry`] - The `toolchains.xml` registry
//! - [`resolver`] - Requirement resolution
//! - [`toolchain`] - Requirements, registered toolchains and versions
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use toolchain_installer::toolchain::{major_version, resolve_vendor, DEFAULT_VENDOR};
//!
//! assert_eq!(major_version("17.0.1"), "17");
//! assert_eq!(major_version("1.8"), "8");
//! assert_eq!(resolve_vendor(None), DEFAULT_VENDOR);
//! ```
//!
//! For file-based runs, see the integration tests.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod providers;
pub mod registry;
pub mod resolver;
pub mod toolchain;
pub mod ui;

pub use error::{Result, ToolchainError};
