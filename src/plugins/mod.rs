//! Discovery of framework plugins installed under a modules directory.
//!
//! A framework plugin is an installed package whose root directory contains
//! the plugin marker file (see [`crate::constants::PLUGIN_MARKER_FILE`]). This
//! module finds those packages and loads their manifests; the submodules build
//! on top of that:
//!
//! - [`schemas`] collects each plugin's configuration schema
//! - [`dependencies`] merges the plugins' declared dependencies into a
//!   [`DependencySet`]
//!
//! Both flows use the same fail-fast policy: a single unreadable path or
//! malformed JSON document aborts the call with an error naming the file.

pub mod dependencies;
pub mod schemas;

pub use dependencies::{DependencySet, VersionSpec, aggregate, collect_dependencies};
pub use schemas::{ConfigSchemaEntry, collect_schemas, super_user_schema};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::PACKAGE_MANIFEST_FILE;
use crate::core::InstallerError;
use crate::utils::fs::{find_files, read_json_file};

/// The subset of a `package.json` the installer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Loads the manifest in `package_root`.
    pub async fn load(package_root: &Path) -> Result<Self, InstallerError> {
        read_json_file(&package_root.join(PACKAGE_MANIFEST_FILE)).await
    }
}

/// A framework plugin package found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginModule {
    /// Directory containing the plugin marker and manifest.
    pub root: PathBuf,
    pub name: String,
    /// Free-form; not necessarily a valid semantic version.
    pub version: String,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PluginModule {
    /// Builds a plugin from its root directory and parsed manifest.
    pub fn from_manifest(root: impl Into<PathBuf>, manifest: PackageManifest) -> Self {
        Self {
            root: root.into(),
            name: manifest.name,
            version: manifest.version,
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
        }
    }

    /// Loads the plugin whose marker file is at `marker`.
    pub async fn load(marker: &Path) -> Result<Self, InstallerError> {
        let root = marker.parent().unwrap_or(marker);
        let manifest = PackageManifest::load(root).await?;
        debug!("Loaded plugin {}@{} from {}", manifest.name, manifest.version, root.display());
        Ok(Self::from_manifest(root, manifest))
    }
}

/// Finds every framework plugin under `modules_dir` and loads its manifest.
///
/// Manifests are read concurrently. The result is ordered by plugin root path.
///
/// # Errors
///
/// Fails on the first unreadable directory or manifest
/// ([`InstallerError::DiscoveryIo`]) or malformed manifest
/// ([`InstallerError::ManifestParse`]).
pub async fn discover_plugins(
    modules_dir: &Path,
    marker_file: &str,
) -> Result<Vec<PluginModule>, InstallerError> {
    let markers = find_files(modules_dir, Path::new(marker_file)).await?;
    try_join_all(markers.iter().map(|marker| PluginModule::load(marker))).await
}
