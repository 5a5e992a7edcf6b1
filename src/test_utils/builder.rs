//! Fluent builder for installed-module trees on disk.
//!
//! Produces a temporary application checkout:
//!
//! ```text
//! <tmp>/app/package.json                      (optional, see `app_version`)
//! <tmp>/app/node_modules/<name>/package.json
//! <tmp>/app/node_modules/<name>/adapt-authoring.json        (plugins only)
//! <tmp>/app/node_modules/<name>/conf/config.schema.json     (when `schema` is set)
//! ```

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::{
    CONFIG_SCHEMA_FILE, DEFAULT_MODULES_DIR, PACKAGE_MANIFEST_FILE, PLUGIN_MARKER_FILE,
};

#[derive(Debug, Clone)]
struct PackageSpec {
    name: String,
    version: String,
    description: Option<String>,
    plugin: bool,
    dependencies: BTreeMap<String, String>,
    dev_dependencies: BTreeMap<String, String>,
    schema: Option<Value>,
}

/// Builder for a temporary application checkout with installed packages.
#[derive(Debug, Default)]
pub struct PluginTreeBuilder {
    packages: Vec<PackageSpec>,
    app_version: Option<String>,
}

impl PluginTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a framework plugin package; finish it with [`PluginBuilder::done`].
    pub fn plugin(self, name: &str, version: &str) -> PluginBuilder {
        PluginBuilder {
            tree: self,
            spec: PackageSpec {
                name: name.to_string(),
                version: version.to_string(),
                description: None,
                plugin: true,
                dependencies: BTreeMap::new(),
                dev_dependencies: BTreeMap::new(),
                schema: None,
            },
        }
    }

    /// Adds an ordinary (non-plugin) package.
    pub fn package(mut self, name: &str, version: &str) -> Self {
        self.packages.push(PackageSpec {
            name: name.to_string(),
            version: version.to_string(),
            description: None,
            plugin: false,
            dependencies: BTreeMap::new(),
            dev_dependencies: BTreeMap::new(),
            schema: None,
        });
        self
    }

    /// Writes an application `package.json` with this version at the checkout root.
    pub fn app_version(mut self, version: &str) -> Self {
        self.app_version = Some(version.to_string());
        self
    }

    /// Writes the tree to a fresh temporary directory.
    pub fn build(self) -> PluginTree {
        let temp_dir = TempDir::new().expect("create temp dir");
        let app_dir = temp_dir.path().join("app");
        let modules_dir = app_dir.join(DEFAULT_MODULES_DIR);
        std::fs::create_dir_all(&modules_dir).expect("create modules dir");

        if let Some(version) = &self.app_version {
            write_json(
                &app_dir.join(PACKAGE_MANIFEST_FILE),
                &json!({ "name": "adapt-authoring", "version": version }),
            );
        }

        for spec in &self.packages {
            write_package(&modules_dir, spec);
        }

        PluginTree {
            _temp_dir: temp_dir,
            app_dir,
            modules_dir,
        }
    }
}

/// Builder for a single plugin package inside a [`PluginTreeBuilder`].
#[derive(Debug)]
pub struct PluginBuilder {
    tree: PluginTreeBuilder,
    spec: PackageSpec,
}

impl PluginBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.spec.description = Some(description.to_string());
        self
    }

    pub fn dependency(mut self, name: &str, specifier: &str) -> Self {
        self.spec.dependencies.insert(name.to_string(), specifier.to_string());
        self
    }

    pub fn dev_dependency(mut self, name: &str, specifier: &str) -> Self {
        self.spec.dev_dependencies.insert(name.to_string(), specifier.to_string());
        self
    }

    /// Ships a configuration schema with the plugin.
    pub fn schema(mut self, schema: Value) -> Self {
        self.spec.schema = Some(schema);
        self
    }

    pub fn done(mut self) -> PluginTreeBuilder {
        self.tree.packages.push(self.spec);
        self.tree
    }
}

/// A module tree written to disk; removed when dropped.
#[derive(Debug)]
pub struct PluginTree {
    _temp_dir: TempDir,
    app_dir: PathBuf,
    modules_dir: PathBuf,
}

impl PluginTree {
    /// The application checkout directory.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// The installed-modules directory inside the checkout.
    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }
}

fn write_package(modules_dir: &Path, spec: &PackageSpec) {
    let package_dir = modules_dir.join(&spec.name);
    std::fs::create_dir_all(&package_dir).expect("create package dir");

    let mut manifest = Map::new();
    manifest.insert("name".into(), json!(spec.name));
    manifest.insert("version".into(), json!(spec.version));
    if let Some(description) = &spec.description {
        manifest.insert("description".into(), json!(description));
    }
    if !spec.dependencies.is_empty() {
        manifest.insert("dependencies".into(), json!(spec.dependencies));
    }
    if !spec.dev_dependencies.is_empty() {
        manifest.insert("devDependencies".into(), json!(spec.dev_dependencies));
    }
    write_json(&package_dir.join(PACKAGE_MANIFEST_FILE), &Value::Object(manifest));

    if spec.plugin {
        write_json(&package_dir.join(PLUGIN_MARKER_FILE), &json!({}));
    }

    if let Some(schema) = &spec.schema {
        let schema_path = package_dir.join(CONFIG_SCHEMA_FILE);
        std::fs::create_dir_all(schema_path.parent().expect("schema has a parent"))
            .expect("create schema dir");
        write_json(&schema_path, schema);
    }
}

fn write_json(path: &Path, value: &Value) {
    let content = serde_json::to_string_pretty(value).expect("serialize json");
    std::fs::write(path, content).expect("write json file");
}
