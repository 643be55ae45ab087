//! `sitegen edits [--apply]`: find hand-edited template pages.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use sitegen_sync::{edits, pipeline::Site};

/// Arguments for `sitegen edits`.
#[derive(Args, Debug)]
pub struct EditsArgs {
    /// Mark every edited page manual so future sweeps leave it alone.
    #[arg(long)]
    pub apply: bool,
}

impl EditsArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let site = Site::open(root).context("failed to open site")?;
        let mut ledger = site.ledger().context("failed to load manifest")?;
        let edited =
            edits::detect(&ledger, &site.output_dir()).context("edit detection failed")?;

        if edited.is_empty() {
            println!("No hand-edited template pages.");
            return Ok(());
        }

        for artifact in &edited {
            println!("  ✎  {}", artifact.path);
        }

        if self.apply {
            let changed = edits::mark_manual(&mut ledger, &edited)
                .context("failed to update manifest")?;
            println!("✓ Marked {changed} page(s) manual");
        } else {
            println!(
                "{} edited page(s). Run 'sitegen edits --apply' to mark them manual.",
                edited.len()
            );
        }
        Ok(())
    }
}
