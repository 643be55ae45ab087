//! `sitegen clean`: remove tracked pages whose record no longer exists.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use sitegen_sync::{
    orphans::{self, OrphanAction},
    pipeline::Site,
};

/// Arguments for `sitegen clean`.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Also remove orphaned pages marked manual.
    #[arg(long)]
    pub confirm_manual: bool,

    /// Show what would be removed without deleting anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let site = Site::open(root).context("failed to open site")?;
        let catalog = site.catalog().context("failed to load record catalog")?;
        let mut ledger = site.ledger().context("failed to load manifest")?;

        let plan = orphans::plan(
            &ledger,
            site.resolver(),
            site.protected(),
            site.resolver().locales().codes(),
            &catalog.records,
            self.confirm_manual,
        )
        .context("failed to plan cleanup")?;

        if plan.is_empty() {
            println!("No orphaned pages.");
            return Ok(());
        }

        for orphan in plan.kept() {
            let reason = match orphan.action {
                OrphanAction::KeepProtected => "protected",
                OrphanAction::KeepManual => "manual, pass --confirm-manual to remove",
                OrphanAction::Remove => continue,
            };
            println!("  ·  {} (kept: {reason})", orphan.path);
        }

        if self.dry_run {
            for orphan in plan.to_remove() {
                println!("  ~  {}", orphan.path);
            }
            println!("[dry-run] {} page(s) would be removed", plan.to_remove().count());
            return Ok(());
        }

        let removed = orphans::apply(&mut ledger, &site.output_dir(), &plan)
            .context("cleanup failed")?;
        for path in &removed {
            println!("  🗑  {path}");
        }
        println!("✓ Removed {} orphaned page(s)", removed.len());
        Ok(())
    }
}
