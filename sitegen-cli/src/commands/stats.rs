//! `sitegen stats`: manifest counts by origin.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sitegen_sync::{pipeline::Site, stats};

/// Arguments for `sitegen stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatsJson {
    #[serde(flatten)]
    counts: stats::Stats,
    last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "")]
    indicator: String,
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "pages")]
    count: usize,
    #[tabled(rename = "meaning")]
    meaning: &'static str,
}

impl StatsArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let site = Site::open(root).context("failed to open site; run `sitegen init` first")?;
        let ledger = site.ledger().context("failed to load manifest")?;
        let counts = stats::collect(ledger.manifest(), site.protected());
        let last_synced_at = ledger.manifest().last_synced_at;

        if self.json {
            let payload = StatsJson {
                counts,
                last_synced_at,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize stats JSON")?
            );
            return Ok(());
        }

        print_table(counts, last_synced_at);
        Ok(())
    }
}

fn print_table(counts: stats::Stats, last_synced_at: Option<DateTime<Utc>>) {
    let last = last_synced_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "sitegen v{} | {} tracked pages | last sync: {}",
        env!("CARGO_PKG_VERSION"),
        counts.total,
        last
    );

    let rows = vec![
        StatsRow {
            indicator: "■".green().bold().to_string(),
            kind: "template",
            count: counts.template,
            meaning: "auto-generated, can regenerate",
        },
        StatsRow {
            indicator: "■".yellow().bold().to_string(),
            kind: "manual",
            count: counts.manual,
            meaning: "hand-edited, never regenerated",
        },
        StatsRow {
            indicator: "■".magenta().bold().to_string(),
            kind: "protected",
            count: counts.protected,
            meaning: "configured, never written",
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
