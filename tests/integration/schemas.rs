use adapt_installer::test_utils::PluginTreeBuilder;
use predicates::prelude::*;
use serde_json::json;

use crate::common::{TestConfig, adapt_install, json_output};

#[test]
fn test_schemas_json_includes_plugins_and_super_user() {
    let tree = PluginTreeBuilder::new()
        .plugin("adapt-authoring-server", "1.0.3")
        .description("HTTP server")
        .schema(json!({
            "type": "object",
            "properties": { "port": { "type": "number", "default": 5000 } }
        }))
        .done()
        .plugin("adapt-authoring-lang", "1.0.0")
        .done()
        .build();
    let config = TestConfig::empty();

    let value = json_output(adapt_install(tree.app_dir(), &config).args(["schemas", "--json"]));
    let schemas = value.as_object().unwrap();

    assert_eq!(schemas.len(), 2);
    let server = &schemas["adapt-authoring-server"];
    assert_eq!(server["name"], "adapt-authoring-server");
    assert_eq!(server["description"], "HTTP server");
    assert_eq!(server["version"], "1.0.3");
    assert_eq!(server["schema"]["properties"]["port"]["default"], 5000);

    let super_user = &schemas["superuser"];
    assert_eq!(super_user["schema"]["required"], json!(["email", "password"]));
    assert!(super_user["schema"]["properties"]["confirmPassword"].is_object());
}

#[test]
fn test_schemas_empty_tree_still_has_super_user() {
    let tree = PluginTreeBuilder::new().build();
    let config = TestConfig::empty();

    adapt_install(tree.app_dir(), &config)
        .arg("schemas")
        .assert()
        .success()
        .stdout(predicate::str::contains("superuser"))
        .stdout(predicate::str::contains("3 properties"));
}

#[test]
fn test_schemas_malformed_schema_fails() {
    let tree = PluginTreeBuilder::new()
        .plugin("adapt-authoring-mailer", "1.0.0")
        .schema(json!({}))
        .done()
        .build();
    let schema = tree.modules_dir().join("adapt-authoring-mailer/conf/config.schema.json");
    std::fs::write(&schema, "not json").unwrap();
    let config = TestConfig::empty();

    adapt_install(tree.app_dir(), &config)
        .arg("schemas")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.schema.json"));
}
