//! Integration test suite for the Adapt installer
//!
//! Drives the `adapt-install` binary against module trees written to
//! temporary directories. Nothing here needs network access; commands that
//! talk to the remote host are pointed at an unreachable address to exercise
//! their failure path.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **config**: configuration loading and validation through the CLI
//! - **deps**: `deps` command over plugin trees
//! - **remote**: commands that need the remote host or a checkout
//! - **schemas**: `schemas` command and the super-user entry

mod common;

mod config;
mod deps;
mod remote;
mod schemas;
