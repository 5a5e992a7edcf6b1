//! Consolidated view of the dependencies declared by framework plugins.
//!
//! [`aggregate`] merges every plugin's `dependencies` and `devDependencies`
//! into a [`DependencySet`]:
//!
//! - `adapt`: each plugin's own name and version
//! - `all`: union of runtime dependencies
//! - `dev`: union of development dependencies
//!
//! A dependency maps to a single specifier string when every plugin that
//! declares it agrees, and to a sorted list of the distinct specifiers
//! otherwise. Dependencies that are themselves discovered plugins are left out
//! of `all` and `dev`.
//!
//! The merge is a pure reduction over already-loaded plugins and does not
//! depend on the order they were discovered in.
//!
//! ```text
//! core  { lodash: ^4.0.0, ui: ^1.0.0 }          adapt { core: 1.0.0, ui: 1.0.0 }
//! ui    { lodash: ^4.0.0, react: ^18.0.0 }  =>  all   { lodash: "^4.0.0", react: "^18.0.0" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

use super::{PluginModule, discover_plugins};
use crate::core::InstallerError;

/// The version specifier(s) observed for one dependency.
///
/// Serializes untagged, so a single specifier is a bare JSON string and
/// several are a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionSpec {
    Single(String),
    Multiple(Vec<String>),
}

impl VersionSpec {
    /// Collapses a set of distinct specifiers; one element becomes [`VersionSpec::Single`].
    fn from_set(specifiers: BTreeSet<String>) -> Self {
        if specifiers.len() == 1 {
            let only = specifiers.into_iter().next().unwrap_or_default();
            Self::Single(only)
        } else {
            Self::Multiple(specifiers.into_iter().collect())
        }
    }

    /// All specifiers, in sorted order.
    pub fn specifiers(&self) -> Vec<&str> {
        match self {
            Self::Single(spec) => vec![spec.as_str()],
            Self::Multiple(specs) => specs.iter().map(String::as_str).collect(),
        }
    }

    /// Whether plugins disagree on the specifier for this dependency.
    pub const fn is_conflicting(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }
}

/// Merged dependency declarations of all discovered plugins.
///
/// Keys of all three maps are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySet {
    /// The plugins themselves, name to version.
    #[serde(rename = "adapt")]
    pub plugins: BTreeMap<String, String>,
    /// Runtime dependencies of the plugins.
    pub all: BTreeMap<String, VersionSpec>,
    /// Development dependencies of the plugins.
    pub dev: BTreeMap<String, VersionSpec>,
}

impl DependencySet {
    /// Dependencies, runtime or dev, declared with more than one specifier.
    pub fn conflicts(&self) -> impl Iterator<Item = (&String, &VersionSpec)> {
        self.all.iter().chain(self.dev.iter()).filter(|(_, spec)| spec.is_conflicting())
    }
}

/// Merges the dependency declarations of `plugins` into a [`DependencySet`].
///
/// Plugins are folded in root-path order, so when two plugins share a name
/// the one with the greater path wins `adapt`, whatever order they are passed in.
pub fn aggregate(plugins: &[PluginModule]) -> DependencySet {
    let mut ordered: Vec<&PluginModule> = plugins.iter().collect();
    ordered.sort_by(|a, b| a.root.cmp(&b.root));

    let mut adapt = BTreeMap::new();
    let mut runtime: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut dev: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for plugin in ordered {
        adapt.insert(plugin.name.clone(), plugin.version.clone());
        merge_declarations(&mut runtime, &plugin.dependencies);
        merge_declarations(&mut dev, &plugin.dev_dependencies);
    }

    let mut all = collapse(runtime);
    let mut dev = collapse(dev);

    for name in adapt.keys() {
        if all.remove(name).is_some() {
            debug!("Dropping plugin '{}' from runtime dependencies", name);
        }
        if dev.remove(name).is_some() {
            debug!("Dropping plugin '{}' from dev dependencies", name);
        }
    }

    DependencySet {
        plugins: adapt,
        all,
        dev,
    }
}

fn merge_declarations(
    into: &mut BTreeMap<String, BTreeSet<String>>,
    declared: &BTreeMap<String, String>,
) {
    for (name, specifier) in declared {
        into.entry(name.clone()).or_default().insert(specifier.clone());
    }
}

fn collapse(merged: BTreeMap<String, BTreeSet<String>>) -> BTreeMap<String, VersionSpec> {
    merged.into_iter().map(|(name, specs)| (name, VersionSpec::from_set(specs))).collect()
}

/// Discovers the plugins under `modules_dir` and aggregates their dependencies.
///
/// # Errors
///
/// Propagates the first discovery failure; see [`discover_plugins`].
pub async fn collect_dependencies(
    modules_dir: &Path,
    marker_file: &str,
) -> Result<DependencySet, InstallerError> {
    let plugins = discover_plugins(modules_dir, marker_file).await?;
    debug!("Aggregating dependencies of {} plugin(s)", plugins.len());
    Ok(aggregate(&plugins))
}
