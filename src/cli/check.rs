//! `check`: verify host prerequisites.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::prerequisites::{PrerequisiteReport, check_all};

#[derive(Debug, Args)]
pub struct CheckCommand {}

impl CheckCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let reports = check_all(&ctx.config.prerequisites).await?;

        for report in &reports {
            print_report(report);
        }

        // Surface the first failure as the command error.
        for report in reports {
            report.into_result()?;
        }
        Ok(())
    }
}

fn print_report(report: &PrerequisiteReport) {
    let status = if report.satisfied { "ok".green() } else { "missing".red() };
    let found = match (&report.path, &report.found) {
        (None, _) => "not found".bright_black().to_string(),
        (Some(_), None) => "unknown version".yellow().to_string(),
        (Some(_), Some(version)) => version.to_string(),
    };
    println!("{:<8} {:<10} {:<12} {}", status, report.tool, report.required, found);
}
