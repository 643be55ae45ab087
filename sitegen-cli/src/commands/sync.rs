//! `sitegen generate | regenerate | test`: run a sweep and print the report.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sitegen_sync::{pipeline, Decision, Mode, SyncReport};

/// Arguments shared by the three sweep commands.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, root: &Path, mode: Mode) -> Result<()> {
        match pipeline::run(root, mode) {
            Ok(report) => self.print(&report),
            Err(err) => {
                if let Some(partial) = err.partial_report() {
                    eprintln!("{}", "sync aborted; partial report follows".red().bold());
                    self.print(partial)?;
                }
                Err(err).with_context(|| format!("{} failed", command_name(mode)))
            }
        }
    }

    fn print(&self, report: &SyncReport) -> Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(report).context("failed to serialize sync report")?
            );
        } else {
            print_report(report);
        }
        Ok(())
    }
}

fn command_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Generate => "generate",
        Mode::Regenerate => "regenerate",
        Mode::Test => "test",
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let verb = if report.dry_run { "would generate" } else { "generated" };

    if report.template_changed {
        println!("{prefix}template changed; template pages are regenerated");
    }

    for outcome in &report.outcomes {
        let marker = match outcome.decision {
            Decision::Generate if outcome.written => "✎",
            Decision::Generate if report.dry_run => "~",
            Decision::Generate => continue,
            Decision::SkipProtected => "🔒",
            Decision::SkipManual => "✋",
            Decision::SkipUpToDate => continue,
        };
        println!("  {marker}  {}", outcome.path);
    }

    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning.message);
    }
    for failure in &report.failures {
        eprintln!(
            "{} {} ({})",
            "render failed:".red().bold(),
            failure.path,
            failure.message
        );
    }

    println!(
        "{prefix}✓ {verb} {} | protected {} | manual {} | up to date {}",
        report.generated, report.skipped_protected, report.skipped_manual, report.skipped_up_to_date
    );
}
