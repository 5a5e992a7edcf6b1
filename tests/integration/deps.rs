use adapt_installer::test_utils::PluginTreeBuilder;
use predicates::prelude::*;
use serde_json::json;

use crate::common::{TestConfig, adapt_install, json_output};

#[test]
fn test_deps_json_merges_plugins() {
    let tree = PluginTreeBuilder::new()
        .plugin("adapt-authoring-core", "1.4.0")
        .dependency("lodash", "^4.17.21")
        .dependency("adapt-authoring-ui", "^1.0.0")
        .dev_dependency("mocha", "^10.0.0")
        .done()
        .plugin("adapt-authoring-ui", "1.2.0")
        .dependency("lodash", "^4.17.0")
        .dependency("react", "^18.2.0")
        .done()
        .package("lodash", "4.17.21")
        .build();
    let config = TestConfig::empty();

    let value = json_output(adapt_install(tree.app_dir(), &config).args(["deps", "--json"]));

    assert_eq!(
        value,
        json!({
            "adapt": {
                "adapt-authoring-core": "1.4.0",
                "adapt-authoring-ui": "1.2.0"
            },
            "all": {
                "lodash": ["^4.17.0", "^4.17.21"],
                "react": "^18.2.0"
            },
            "dev": {
                "mocha": "^10.0.0"
            }
        })
    );
}

#[test]
fn test_deps_summary_lists_plugins_and_conflicts() {
    let tree = PluginTreeBuilder::new()
        .plugin("adapt-authoring-auth", "1.0.0")
        .dependency("bcryptjs", "^2.4.3")
        .done()
        .plugin("adapt-authoring-mongodb", "1.1.0")
        .dependency("bcryptjs", "^2.0.0")
        .done()
        .build();
    let config = TestConfig::empty();

    adapt_install(tree.app_dir(), &config)
        .arg("deps")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plugins:"))
        .stdout(predicate::str::contains("adapt-authoring-auth"))
        .stdout(predicate::str::contains("adapt-authoring-mongodb"))
        .stdout(predicate::str::contains("^2.0.0, ^2.4.3"))
        .stdout(predicate::str::contains("1 dependencies are declared with differing versions"));
}

#[test]
fn test_deps_without_plugins() {
    let tree = PluginTreeBuilder::new().package("express", "4.18.2").build();
    let config = TestConfig::empty();

    adapt_install(tree.app_dir(), &config)
        .arg("deps")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plugins installed"));

    let value = json_output(adapt_install(tree.app_dir(), &config).args(["deps", "--json"]));
    assert_eq!(value, json!({ "adapt": {}, "all": {}, "dev": {} }));
}

#[test]
fn test_deps_malformed_manifest_fails() {
    let tree = PluginTreeBuilder::new()
        .plugin("adapt-authoring-core", "1.0.0")
        .done()
        .plugin("adapt-authoring-broken", "1.0.0")
        .done()
        .build();
    let broken = tree.modules_dir().join("adapt-authoring-broken/package.json");
    std::fs::write(&broken, "{ \"name\": ").unwrap();
    let config = TestConfig::empty();

    adapt_install(tree.app_dir(), &config)
        .args(["deps", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid JSON"))
        .stderr(predicate::str::contains("adapt-authoring-broken"));
}

#[test]
fn test_deps_missing_modules_dir_fails() {
    let tree = PluginTreeBuilder::new().build();
    std::fs::remove_dir_all(tree.modules_dir()).unwrap();
    let config = TestConfig::empty();

    adapt_install(tree.app_dir(), &config)
        .arg("deps")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"))
        .stderr(predicate::str::contains("npm install"));
}
