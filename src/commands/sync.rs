//! Sync command implementation

use super::common::CommandContext;
use crate::{cli::SyncCmd, config::ServiceConfig, sync, Result};
use reqwest::Client;

fn print_report(report: &sync::SyncReport) {
    for t in &report.tables {
        println!("{:<18} {:>7}", t.table, t.rows);
    }
    if report.dry_run {
        println!("Dry run: {} rows would be pushed", report.total_rows());
    } else {
        println!("✓ Pushed {} rows", report.total_rows());
    }
}

/// Handle the `sync` command group
pub async fn handle_sync(ctx: &mut CommandContext, cmd: SyncCmd) -> Result<()> {
    match cmd {
        SyncCmd::Push { dry_run: true } => {
            let report = sync::plan(&ctx.db)?;
            ctx.emit(&report, print_report)
        }

        SyncCmd::Push { dry_run: false } => {
            let config = ServiceConfig::from_env()?;
            if !ctx.json {
                println!("Pushing to {}...", config.url);
            }
            // tarpaulin::skip - network call, covered by the sync client tests
            let report = sync::push_all(&Client::new(), &config, &ctx.db).await?;
            ctx.emit(&report, print_report)
        }
    }
}
