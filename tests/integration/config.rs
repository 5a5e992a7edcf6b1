use adapt_installer::test_utils::PluginTreeBuilder;
use predicates::prelude::*;
use serde_json::json;

use crate::common::{TestConfig, adapt_install, json_output};

#[test]
fn test_invalid_repository_is_rejected() {
    let tree = PluginTreeBuilder::new().build();
    let config = TestConfig::with_content(r#"repository = "adapt-authoring""#);

    adapt_install(tree.app_dir(), &config)
        .arg("deps")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for 'repository'"));
}

#[test]
fn test_malformed_config_is_rejected() {
    let tree = PluginTreeBuilder::new().build();
    let config = TestConfig::with_content("modules_dir = ");

    adapt_install(tree.app_dir(), &config)
        .arg("deps")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML parsing error"))
        .stderr(predicate::str::contains("--config"));
}

#[test]
fn test_missing_explicit_config_is_rejected() {
    let tree = PluginTreeBuilder::new().build();
    let config = TestConfig::empty();
    std::fs::remove_file(config.path()).unwrap();

    adapt_install(tree.app_dir(), &config)
        .arg("deps")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_custom_schema_location() {
    let tree = PluginTreeBuilder::new()
        .plugin("adapt-authoring-custom", "2.0.0")
        .done()
        .build();
    let package = tree.modules_dir().join("adapt-authoring-custom");
    std::fs::create_dir_all(package.join("schema")).unwrap();
    std::fs::write(
        package.join("schema/settings.json"),
        json!({ "type": "object", "properties": {} }).to_string(),
    )
    .unwrap();
    let config = TestConfig::with_content(r#"schema_file = "schema/settings.json""#);

    let value = json_output(adapt_install(tree.app_dir(), &config).args(["schemas", "--json"]));
    assert_eq!(value["adapt-authoring-custom"]["version"], "2.0.0");
}

#[test]
fn test_custom_plugin_marker() {
    let tree = PluginTreeBuilder::new()
        .plugin("adapt-authoring-core", "1.0.0")
        .done()
        .package("legacy-plugin", "0.1.0")
        .build();
    std::fs::write(tree.modules_dir().join("legacy-plugin/legacy.json"), "{}").unwrap();
    let config = TestConfig::with_content(r#"plugin_marker = "legacy.json""#);

    let value = json_output(adapt_install(tree.app_dir(), &config).args(["deps", "--json"]));
    assert_eq!(value["adapt"], json!({ "legacy-plugin": "0.1.0" }));
}
