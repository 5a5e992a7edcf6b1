//! Test utilities for the installer.
//!
//! Helpers for writing tests against on-disk module trees and for enabling
//! logging inside tests. Available to unit tests and, through the
//! `test-utils` feature, to integration tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use adapt_installer::test_utils::PluginTreeBuilder;
//!
//! let tree = PluginTreeBuilder::new()
//!     .plugin("adapt-authoring-core", "1.0.0")
//!     .dependency("lodash", "^4.17.0")
//!     .done()
//!     .build();
//! assert!(tree.modules_dir().join("adapt-authoring-core/package.json").exists());
//! ```

pub mod builder;

pub use builder::{PluginBuilder, PluginTree, PluginTreeBuilder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static LOGGING: Once = Once::new();

/// Turns on `tracing` output for the test binary.
///
/// `level` wins over `RUST_LOG`; with neither set this is a no-op. Only the
/// first call in a process has any effect.
///
/// ```bash
/// RUST_LOG=adapt_installer=debug cargo test find_files
/// ```
pub fn init_test_logging(level: Option<Level>) {
    LOGGING.call_once(|| {
        let filter = match level {
            Some(level) => EnvFilter::new(level.to_string()),
            None if std::env::var_os("RUST_LOG").is_some() => EnvFilter::from_default_env(),
            None => return,
        };

        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}
