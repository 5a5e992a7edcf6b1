//! Error handling for the installer.
//!
//! Two layers, mirroring how the rest of the crate reports failures:
//! - [`InstallerError`] is the strongly-typed error returned by the discovery,
//!   release-selection and git layers so callers can match on the variant.
//! - [`ErrorContext`] wraps any error with a suggestion and extra details for
//!   display at the command-line boundary (see [`user_friendly_error`]).
//!
//! Discovery (tree scanning, schema collection, dependency aggregation) is
//! fail-fast: the first unreadable path or malformed JSON document aborts the
//! whole call and is reported with the offending path.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the installer library.
#[derive(Error, Debug)]
pub enum InstallerError {
    /// A directory or file could not be read while scanning the module tree.
    #[error("Failed to read {}: {source}", path.display())]
    DiscoveryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A package manifest or configuration schema is not valid JSON.
    #[error("Invalid JSON in {}: {reason}", file.display())]
    ManifestParse { file: PathBuf, reason: String },

    /// The remote source-control host failed or answered with a non-success status.
    #[error("Remote request failed{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    RemoteRequest { status: Option<u16>, message: String },

    /// Input rejected by a boundary collaborator.
    #[error("Invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// A git subprocess exited unsuccessfully or timed out.
    #[error("Git operation failed: {operation}")]
    GitCommand { operation: String, stderr: String },

    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// A host prerequisite is missing or its version is outside the required range.
    #[error("{tool} {required} is required ({found})")]
    PrerequisiteNotMet {
        tool: String,
        required: String,
        found: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

impl InstallerError {
    /// Build a [`InstallerError::DiscoveryIo`] for `path`.
    pub fn discovery_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DiscoveryIo {
            path: path.into(),
            source,
        }
    }

    /// Build a [`InstallerError::ManifestParse`] for `file`.
    pub fn manifest_parse(file: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::ManifestParse {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`InstallerError::RemoteRequest`].
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteRequest {
            status,
            message: message.into(),
        }
    }
}

/// An error message decorated with an optional suggestion and details.
///
/// Created by [`user_friendly_error`] at the binary boundary and printed with
/// [`ErrorContext::display`].
#[derive(Debug)]
pub struct ErrorContext {
    pub message: String,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colours.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// The error chain is searched for an [`InstallerError`]; anything else is
/// reported with its full `anyhow` chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let headline = format!("{error}");

    let Some(installer_error) = error.chain().find_map(|e| e.downcast_ref::<InstallerError>())
    else {
        let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let ctx = ErrorContext::new(headline);
        return if chain.is_empty() {
            ctx
        } else {
            ctx.with_details(chain.join(": "))
        };
    };

    let ctx = ErrorContext::new(headline);
    match installer_error {
        InstallerError::DiscoveryIo { path, .. } => ctx
            .with_details(format!("Could not read {}", path.display()))
            .with_suggestion("Check that the modules directory exists and run 'npm install' first"),
        InstallerError::ManifestParse { file, .. } => ctx
            .with_details(format!("{} is not valid JSON", file.display()))
            .with_suggestion("Reinstall the affected module or remove the malformed file"),
        InstallerError::RemoteRequest {
            status: Some(401 | 403),
            ..
        } => ctx
            .with_suggestion("Check the configured credentials or wait for the API rate limit to reset"),
        InstallerError::RemoteRequest { .. } => {
            ctx.with_suggestion("Check your network connection and the configured api_url")
        }
        InstallerError::GitNotFound => ctx
            .with_suggestion("Install git from https://git-scm.com/ and make sure it is in your PATH"),
        InstallerError::GitCommand { stderr, .. } if !stderr.is_empty() => {
            ctx.with_details(stderr.trim().to_string())
        }
        InstallerError::PrerequisiteNotMet { tool, .. } => {
            ctx.with_suggestion(format!("Install or upgrade {tool} and run 'adapt-install check' again"))
        }
        InstallerError::Config { .. } | InstallerError::TomlParse(_) => ctx
            .with_suggestion("Fix the installer configuration file or pass a different one with --config"),
        _ => ctx,
    }
}
