//! Shared pipeline entrypoint used by every CLI command.
//!
//! Everything fallible about the configuration is checked while opening the
//! site, before any artifact is written.

use std::path::{Path, PathBuf};

use sitegen_core::{catalog, config, LocaleCode, ProtectedSet, RecordCatalog, SiteConfig};
use sitegen_renderer::PageRenderer;

use crate::engine::{SyncEngine, SyncOptions};
use crate::manifest::Ledger;
use crate::paths::PathResolver;
use crate::report::SyncReport;
use crate::SyncError;

/// Only locale older tracking files (bare file-name keys) were written for.
const LEGACY_LOCALE: &str = "en";

/// Which sweep to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write new and stale template pages.
    Generate,
    /// Rewrite every template page (`force`).
    Regenerate,
    /// Classify only (`dry_run`).
    Test,
}

impl Mode {
    pub fn options(self) -> SyncOptions {
        match self {
            Mode::Generate => SyncOptions::default(),
            Mode::Regenerate => SyncOptions {
                force: true,
                dry_run: false,
            },
            Mode::Test => SyncOptions {
                force: false,
                dry_run: true,
            },
        }
    }
}

/// A site root with its validated configuration.
#[derive(Debug, Clone)]
pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    resolver: PathResolver,
    protected: ProtectedSet,
}

impl Site {
    /// Load `sitegen.yaml` under `root` and validate locales and protected paths.
    pub fn open(root: &Path) -> Result<Self, SyncError> {
        let config = config::load_at(root)?;
        let resolver = PathResolver::from_config(&config)?;
        let protected = config.protected_set()?;
        Ok(Site {
            root: root.to_path_buf(),
            config,
            resolver,
            protected,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn protected(&self) -> &ProtectedSet {
        &self.protected
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir(&self.root)
    }

    pub fn catalog(&self) -> Result<RecordCatalog, SyncError> {
        Ok(catalog::load(&self.config.records_path(&self.root))?)
    }

    /// Load the manifest, moving bare legacy keys under the `en` locale
    /// directory older tracking files were written for.
    pub fn ledger(&self) -> Result<Ledger, SyncError> {
        let mut ledger = Ledger::load(&self.config.manifest_path(&self.root))?;
        let legacy_locale = LocaleCode::parse(LEGACY_LOCALE)?;
        let moved = ledger.adopt_bare_keys(&self.resolver.locale_dir(&legacy_locale));
        if moved > 0 {
            tracing::info!("adopted {moved} legacy manifest entries");
        }
        Ok(ledger)
    }

    /// Engine backed by the Tera page renderer and any user template overrides.
    pub fn engine(&self) -> Result<SyncEngine<PageRenderer>, SyncError> {
        let template_dir = self.config.template_dir(&self.root);
        let renderer = PageRenderer::with_template_dir(template_dir.as_deref())?;
        Ok(SyncEngine::new(
            renderer,
            self.resolver.clone(),
            self.protected.clone(),
            self.output_dir(),
        ))
    }
}

/// Run a full sweep of the site at `root`.
///
/// This is the canonical entrypoint for `generate`, `regenerate` and `test`.
pub fn run(root: &Path, mode: Mode) -> Result<SyncReport, SyncError> {
    let site = Site::open(root)?;
    let catalog = site.catalog()?;
    let engine = site.engine()?;
    let mut ledger = site.ledger()?;
    tracing::info!(
        "{mode:?}: {} record(s) x {} locale(s)",
        catalog.records.len(),
        site.resolver().locales().codes().len()
    );
    engine.sync(
        &mut ledger,
        site.resolver().locales().codes(),
        &catalog.records,
        mode.options(),
    )
}
