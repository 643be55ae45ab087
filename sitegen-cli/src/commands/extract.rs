//! `sitegen extract <pricelist> [--metadata <overlay>]`: build the record catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sitegen_core::{catalog, config};

/// Arguments for `sitegen extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Pricelist JSON keyed "<Country> - <Provider>" with a `p` price field.
    pub pricelist: PathBuf,

    /// YAML overlay with per-record slug, metadata and locale overrides.
    #[arg(long, short = 'm')]
    pub metadata: Option<PathBuf>,
}

impl ExtractArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let site = config::load_at(root).context("failed to load sitegen.yaml")?;
        let overlay = match &self.metadata {
            Some(path) => catalog::load_overlay(path)
                .with_context(|| format!("failed to read overlay '{}'", path.display()))?,
            None => catalog::MetadataOverlay::new(),
        };

        let extracted = catalog::extract_file(&self.pricelist, &overlay)
            .with_context(|| format!("failed to extract '{}'", self.pricelist.display()))?;
        let out = site.records_path(root);
        catalog::save(&out, &extracted)
            .with_context(|| format!("failed to write catalog '{}'", out.display()))?;

        let sub_items: usize = extracted.records.iter().map(|r| r.sub_items.len()).sum();
        println!(
            "✓ Extracted {} record(s) with {} sub-item(s)",
            extracted.records.len(),
            sub_items
        );
        println!("  Saved to: {}", out.display());
        Ok(())
    }
}
