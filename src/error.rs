//! Error types for toolchain resolution.
//!
//! This module defines [`ToolchainError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Providers never surface errors to the caller; their failures are folded into
//!   [`ProviderOutcome::Error`](crate::providers::ProviderOutcome) and logged
//! - A broken registry document is a misconfiguration and aborts the run
//! - Requirements nobody could satisfy are collected into a single
//!   [`ToolchainError::Unresolved`] so the user sees all of them at once

use std::path::PathBuf;
use thiserror::Error;

use crate::toolchain::ToolchainRequirement;

/// Core error type for toolchain operations.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The registry document exists but cannot be used.
    #[error("Misconfigured toolchains in {path}: {message}")]
    MisconfiguredRegistry { path: PathBuf, message: String },

    /// An archive could not be inspected or unpacked.
    #[error("Failed to read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// One or more requirements could not be satisfied by any provider.
    #[error("{}", unresolved_message(.requirements))]
    Unresolved {
        requirements: Vec<ToolchainRequirement>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for toolchain operations.
pub type Result<T> = std::result::Result<T, ToolchainError>;

fn unresolved_message(requirements: &[ToolchainRequirement]) -> String {
    let mut buff =
        String::from("Cannot find matching toolchain definitions for the following toolchain types:");
    for requirement in requirements {
        buff.push('\n');
        buff.push_str(&requirement.to_string());
    }
    buff.push_str(
        "\nPlease make sure you define the required toolchains in your ~/.m2/toolchains.xml file",
    );
    buff
}
