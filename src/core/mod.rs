//! Core types shared across the installer.
//!
//! Currently this is the error layer: [`InstallerError`] for typed failures in
//! library code and [`ErrorContext`] / [`user_friendly_error`] for rendering
//! them at the command-line boundary.

pub mod error;

pub use error::{ErrorContext, InstallerError, user_friendly_error};
