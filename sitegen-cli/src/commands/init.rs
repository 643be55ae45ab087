//! `sitegen init`: scaffold `sitegen.yaml` in the site root.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use sitegen_core::config;

/// Write the default site configuration.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        let existed = config::config_path_at(root).exists();
        let site = config::init_at(root)
            .with_context(|| format!("failed to init site at '{}'", root.display()))?;

        if existed {
            println!("✓ {} already exists; left unchanged", config::CONFIG_FILE);
        } else {
            println!("✓ Wrote {}", config::config_path_at(root).display());
        }
        println!(
            "  {} locale(s), {} protected page(s), output under {}",
            site.locales.len(),
            site.protected.len(),
            site.output_dir.display()
        );
        println!("  Next: sitegen extract <pricelist.json>");
        Ok(())
    }
}
