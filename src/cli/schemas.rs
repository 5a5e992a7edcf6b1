//! `schemas`: configuration schemas of the installed plugins.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use super::common::print_json;
use crate::plugins::collect_schemas;

#[derive(Debug, Args)]
pub struct SchemasCommand {
    /// Print the full schemas as JSON
    #[arg(long)]
    pub json: bool,
}

impl SchemasCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let schemas = collect_schemas(&ctx.modules_path()?, &ctx.config.schema_file).await?;

        if self.json {
            return print_json(&schemas);
        }

        for (key, entry) in &schemas {
            let properties = entry
                .schema
                .get("properties")
                .and_then(|p| p.as_object())
                .map_or(0, serde_json::Map::len);
            println!(
                "{:<40} {:<10} {} {}",
                key,
                entry.version.bright_black(),
                format!("{properties} properties").cyan(),
                entry.description
            );
        }
        Ok(())
    }
}
