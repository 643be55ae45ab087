//! `sitegen diff`: show unified diffs for what generate would write.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use sitegen_sync::{diff, pipeline::Site, Decision};

/// Arguments for `sitegen diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let site = Site::open(root).context("failed to open site")?;
        let catalog = site.catalog().context("failed to load record catalog")?;
        let engine = site.engine().context("failed to build renderer")?;
        let ledger = site.ledger().context("failed to load manifest")?;

        let diffs = diff::preview(
            &engine,
            &ledger,
            site.resolver().locales().codes(),
            &catalog.records,
        )
        .context("diff failed")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            if diff.decision == Decision::SkipUpToDate {
                println!("# {} differs but generate will not rewrite it (use regenerate)", diff.path);
            }
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
