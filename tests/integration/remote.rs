use adapt_installer::test_utils::PluginTreeBuilder;
use predicates::prelude::*;

use crate::common::{TestConfig, adapt_install};

fn unreachable_host() -> TestConfig {
    TestConfig::with_content(
        r#"
api_url = "http://127.0.0.1:9"
request_timeout_secs = 2
"#,
    )
}

#[test]
fn test_releases_reports_unreachable_host() {
    let tree = PluginTreeBuilder::new().app_version("1.0.0").build();
    let config = unreachable_host();

    adapt_install(tree.app_dir(), &config)
        .args(["releases", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Remote request failed"))
        .stderr(predicate::str::contains("api_url"));
}

#[test]
fn test_releases_rejects_malformed_app_manifest() {
    let tree = PluginTreeBuilder::new().build();
    std::fs::write(tree.app_dir().join("package.json"), "[").unwrap();
    let config = unreachable_host();

    adapt_install(tree.app_dir(), &config)
        .arg("releases")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn test_update_requires_checkout() {
    let tree = PluginTreeBuilder::new().app_version("1.0.0").build();
    let config = unreachable_host();

    adapt_install(tree.app_dir(), &config)
        .args(["update", "--yes"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("not an installation")
                .or(predicate::str::contains("Git is not installed")),
        );
}

#[test]
fn test_install_refuses_non_empty_directory() {
    let tree = PluginTreeBuilder::new().app_version("1.0.0").build();
    let config = unreachable_host();

    adapt_install(tree.app_dir(), &config)
        .args(["install", "--tag", "v1.0.0"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("is not empty")
                .or(predicate::str::contains("Git is not installed")),
        );
}

#[test]
fn test_check_reports_every_tool() {
    let tree = PluginTreeBuilder::new().build();
    let config = TestConfig::with_content(
        r#"
[prerequisites]
adapt-installer-missing-tool = ">=1"
"#,
    );

    adapt_install(tree.app_dir(), &config)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("adapt-installer-missing-tool"))
        .stdout(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("adapt-installer-missing-tool >=1 is required"));
}
