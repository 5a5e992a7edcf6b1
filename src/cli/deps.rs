//! `deps`: consolidated dependencies of the installed plugins.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use super::common::print_json;
use crate::plugins::{DependencySet, VersionSpec, collect_dependencies};

#[derive(Debug, Args)]
pub struct DepsCommand {
    /// Print the dependency set as JSON
    #[arg(long)]
    pub json: bool,
}

impl DepsCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let deps = collect_dependencies(&ctx.modules_path()?, &ctx.config.plugin_marker).await?;

        if self.json {
            print_json(&deps)
        } else {
            display_summary(&deps);
            Ok(())
        }
    }
}

fn display_summary(deps: &DependencySet) {
    if deps.plugins.is_empty() {
        println!("{}", "No plugins installed".yellow());
        return;
    }

    println!("{}", "Plugins:".bold());
    for (name, version) in &deps.plugins {
        println!("  {:<40} {}", name, version.bright_black());
    }

    print_section("Dependencies:", &deps.all);
    print_section("Dev dependencies:", &deps.dev);

    let conflicts = deps.conflicts().count();
    if conflicts > 0 {
        println!(
            "\n{} dependencies are declared with differing versions",
            conflicts.to_string().yellow()
        );
    }
}

fn print_section(title: &str, entries: &std::collections::BTreeMap<String, VersionSpec>) {
    if entries.is_empty() {
        return;
    }
    println!("\n{}", title.bold());
    for (name, spec) in entries {
        let specifiers = spec.specifiers().join(", ");
        let specifiers = if spec.is_conflicting() {
            specifiers.yellow()
        } else {
            specifiers.normal()
        };
        println!("  {name:<40} {specifiers}");
    }
}
