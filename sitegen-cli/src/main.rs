//! sitegen: localized country page generator.
//!
//! # Usage
//!
//! ```text
//! sitegen [--root <dir>] [-v] init
//! sitegen extract <pricelist.json> [--metadata <overlay.yaml>]
//! sitegen generate [--json]
//! sitegen regenerate [--json]
//! sitegen test [--json]
//! sitegen stats [--json]
//! sitegen diff
//! sitegen edits [--apply]
//! sitegen clean [--confirm-manual] [--dry-run]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    clean::CleanArgs, diff::DiffArgs, edits::EditsArgs, extract::ExtractArgs, init::InitArgs,
    stats::StatsArgs, sync::SyncArgs,
};
use sitegen_sync::Mode;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sitegen",
    version,
    about = "Generate and keep in sync localized country pages",
    long_about = None,
)]
struct Cli {
    /// Site root containing sitegen.yaml.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log decisions and writes (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default sitegen.yaml.
    Init(InitArgs),

    /// Build the record catalog from a pricelist.
    Extract(ExtractArgs),

    /// Generate new pages and regenerate stale template pages.
    Generate(SyncArgs),

    /// Regenerate every template page (manual and protected pages are kept).
    Regenerate(SyncArgs),

    /// Dry run: report what generate would do without writing anything.
    Test(SyncArgs),

    /// Show manifest counts by origin.
    Stats(StatsArgs),

    /// Show unified diff of what generate would write.
    Diff(DiffArgs),

    /// Find hand-edited template pages, and optionally mark them manual.
    Edits(EditsArgs),

    /// Remove tracked pages whose record no longer exists.
    Clean(CleanArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let root = cli.root;
    tracing::debug!(root = %root.display(), "sitegen starting");
    match cli.command {
        Commands::Init(args) => args.run(&root),
        Commands::Extract(args) => args.run(&root),
        Commands::Generate(args) => args.run(&root, Mode::Generate),
        Commands::Regenerate(args) => args.run(&root, Mode::Regenerate),
        Commands::Test(args) => args.run(&root, Mode::Test),
        Commands::Stats(args) => args.run(&root),
        Commands::Diff(args) => args.run(&root),
        Commands::Edits(args) => args.run(&root),
        Commands::Clean(args) => args.run(&root),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
