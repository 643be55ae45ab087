//! Synchronization engine.
//!
//! For every `(locale, record)` pair the engine resolves the artifact path,
//! classifies it, and on [`Decision::Generate`] renders, writes and records
//! the artifact in the ledger. The ledger is saved once, after the sweep.
//!
//! ## Classification (first match wins)
//!
//! 1. path is protected → `SkipProtected` (ledger not consulted)
//! 2. ledger entry is `Manual` → `SkipManual`, even with `force`
//! 3. `force`, or no file on disk, or template changed and entry is `Template` → `Generate`
//! 4. otherwise → `SkipUpToDate`
//!
//! A file on disk with no ledger entry is left alone on a template change.
//! Only `force` rewrites it.
//!
//! ## Failure policy
//!
//! - bad locale configuration: `SyncError::Config` before any write
//! - bad record (`DataError`): warning, record skipped for every locale
//! - render failure for one pair: failure entry, ledger untouched, sweep continues
//! - artifact write or manifest save failure: `SyncError::Aborted` with the
//!   partial report, manifest not saved

use std::path::{Path, PathBuf};

use chrono::Utc;

use sitegen_core::{CanonicalRecord, LocaleCode, ProtectedSet, RecordId};
use sitegen_renderer::{Render, RenderError};

use crate::error::{io_err, SyncError};
use crate::fingerprint::{current_fingerprint, fingerprint};
use crate::manifest::{Ledger, LedgerEntry, OriginType};
use crate::paths::{ArtifactPath, PathResolver};
use crate::report::{Decision, PairFailure, PairOutcome, RecordWarning, SyncReport};

/// Run options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Regenerate every pair that is neither protected nor manual.
    pub force: bool,
    /// Classify and report only: no render, no write, no manifest save.
    pub dry_run: bool,
}

/// What the engine knows about one artifact when classifying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactState {
    pub protected: bool,
    pub origin: Option<OriginType>,
    pub exists: bool,
}

/// Pure classification of one artifact.
pub fn classify(state: ArtifactState, template_changed: bool, force: bool) -> Decision {
    if state.protected {
        return Decision::SkipProtected;
    }
    if state.origin == Some(OriginType::Manual) {
        return Decision::SkipManual;
    }
    let stale_template = template_changed && state.origin == Some(OriginType::Template);
    if force || !state.exists || stale_template {
        Decision::Generate
    } else {
        Decision::SkipUpToDate
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct SyncEngine<R> {
    renderer: R,
    resolver: PathResolver,
    protected: ProtectedSet,
    output_dir: PathBuf,
}

impl<R: Render> SyncEngine<R> {
    pub fn new(
        renderer: R,
        resolver: PathResolver,
        protected: ProtectedSet,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        SyncEngine {
            renderer,
            resolver,
            protected,
            output_dir: output_dir.into(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn protected(&self) -> &ProtectedSet {
        &self.protected
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Classify one pair against `ledger` and the filesystem, without side effects.
    pub fn classify_pair(
        &self,
        ledger: &Ledger,
        path: &ArtifactPath,
        template_changed: bool,
        force: bool,
    ) -> Result<Decision, SyncError> {
        let protected = self.protected.contains(path.as_str());
        if protected {
            return Ok(Decision::SkipProtected);
        }
        let origin = ledger.get(path.as_str()).map(|entry| entry.origin_type);
        let fs_path = path.to_fs_path(&self.output_dir);
        let exists = fs_path.try_exists().map_err(|e| io_err(&fs_path, e))?;
        Ok(classify(
            ArtifactState {
                protected,
                origin,
                exists,
            },
            template_changed,
            force,
        ))
    }

    /// Sweep `locales × records` and bring the artifacts in line with the renderer.
    pub fn sync(
        &self,
        ledger: &mut Ledger,
        locales: &[LocaleCode],
        records: &[CanonicalRecord],
        options: SyncOptions,
    ) -> Result<SyncReport, SyncError> {
        for locale in locales {
            self.resolver.locales().prefix_for(locale)?;
        }

        let template_fingerprint = current_fingerprint(&self.renderer)?;
        let template_changed = template_fingerprint != ledger.manifest().template_fingerprint;
        if template_changed {
            tracing::info!("template fingerprint changed; template pages will be regenerated");
        }

        let mut report = SyncReport::new(options.dry_run, template_changed);
        let valid = self.valid_records(records, &mut report);

        for locale in locales {
            for record in &valid {
                let path = self.resolver.resolve(locale, record)?;
                let decision =
                    match self.classify_pair(ledger, &path, template_changed, options.force) {
                        Ok(decision) => decision,
                        Err(source) => return Err(abort(report, source)),
                    };
                log_decision(&path, decision, options.dry_run);

                let mut written = false;
                if decision == Decision::Generate && !options.dry_run {
                    match self.generate(ledger, locale, record, &path) {
                        Ok(Ok(())) => written = true,
                        Ok(Err(err)) => {
                            tracing::warn!("render failed for {path}: {err}");
                            report.failures.push(PairFailure {
                                locale: locale.clone(),
                                record: record.id.clone(),
                                path: path.clone(),
                                message: err.to_string(),
                            });
                        }
                        Err(source) => return Err(abort(report, source)),
                    }
                }

                report.record(PairOutcome {
                    locale: locale.clone(),
                    record: record.id.clone(),
                    path,
                    decision,
                    written,
                });
            }
        }

        if !options.dry_run {
            ledger.mark_synced(template_fingerprint, Utc::now());
            if let Err(source) = ledger.save() {
                return Err(abort(report, source));
            }
        }

        tracing::info!(
            "sync finished: {} generated, {} protected, {} manual, {} up to date",
            report.generated,
            report.skipped_protected,
            report.skipped_manual,
            report.skipped_up_to_date
        );
        Ok(report)
    }

    fn valid_records<'a>(
        &self,
        records: &'a [CanonicalRecord],
        report: &mut SyncReport,
    ) -> Vec<&'a CanonicalRecord> {
        records
            .iter()
            .filter(|record| match record.validate() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!("skipping record: {err}");
                    report.warnings.push(RecordWarning {
                        record: RecordId::from(err.record()),
                        message: err.to_string(),
                    });
                    false
                }
            })
            .collect()
    }

    /// Render, write and record one artifact.
    ///
    /// The outer error is a storage failure and ends the sweep; the inner one
    /// is a render failure for this pair only.
    fn generate(
        &self,
        ledger: &mut Ledger,
        locale: &LocaleCode,
        record: &CanonicalRecord,
        path: &ArtifactPath,
    ) -> Result<Result<(), RenderError>, SyncError> {
        let content = match self.renderer.render(locale, record) {
            Ok(content) => content.replace("\r\n", "\n"),
            Err(err) => return Ok(Err(err)),
        };
        let content_fingerprint = fingerprint(&content);
        write_artifact(&path.to_fs_path(&self.output_dir), &content)?;

        let mut entry = LedgerEntry::template(content_fingerprint, Utc::now());
        entry.record = Some(record.id.0.clone());
        entry.sub_item_count = Some(record.sub_items.len());
        ledger.put(path.clone(), entry);
        Ok(Ok(()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Write `content` to `path` through a `.sitegen.tmp` sibling and rename.
pub(crate) fn write_artifact(path: &Path, content: &str) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.sitegen.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn abort(report: SyncReport, source: SyncError) -> SyncError {
    tracing::error!("sync aborted: {source}");
    SyncError::Aborted {
        partial: Box::new(report),
        source: Box::new(source),
    }
}

fn log_decision(path: &ArtifactPath, decision: Decision, dry_run: bool) {
    match decision {
        Decision::Generate if dry_run => tracing::info!("[dry-run] would generate: {path}"),
        Decision::Generate => tracing::info!("generating: {path}"),
        Decision::SkipProtected => tracing::debug!("protected: {path}"),
        Decision::SkipManual => tracing::debug!("manual: {path}"),
        Decision::SkipUpToDate => tracing::debug!("up to date: {path}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state(protected: bool, origin: Option<OriginType>, exists: bool) -> ArtifactState {
        ArtifactState {
            protected,
            origin,
            exists,
        }
    }

    const ORIGINS: [Option<OriginType>; 3] =
        [None, Some(OriginType::Template), Some(OriginType::Manual)];

    #[test]
    fn protected_wins_over_everything() {
        for origin in ORIGINS {
            for exists in [false, true] {
                for changed in [false, true] {
                    for force in [false, true] {
                        assert_eq!(
                            classify(state(true, origin, exists), changed, force),
                            Decision::SkipProtected
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn manual_is_skipped_even_when_forced_or_missing() {
        for exists in [false, true] {
            for changed in [false, true] {
                for force in [false, true] {
                    assert_eq!(
                        classify(state(false, Some(OriginType::Manual), exists), changed, force),
                        Decision::SkipManual
                    );
                }
            }
        }
    }

    #[test]
    fn generate_rules() {
        // force
        assert_eq!(classify(state(false, None, true), false, true), Decision::Generate);
        // first-time generation
        assert_eq!(classify(state(false, None, false), false, false), Decision::Generate);
        assert_eq!(
            classify(state(false, Some(OriginType::Template), false), false, false),
            Decision::Generate
        );
        // template change on a template entry
        assert_eq!(
            classify(state(false, Some(OriginType::Template), true), true, false),
            Decision::Generate
        );
    }

    #[test]
    fn untracked_existing_file_survives_template_change() {
        assert_eq!(
            classify(state(false, None, true), true, false),
            Decision::SkipUpToDate
        );
    }

    #[test]
    fn unchanged_template_entry_is_up_to_date() {
        assert_eq!(
            classify(state(false, Some(OriginType::Template), true), false, false),
            Decision::SkipUpToDate
        );
    }

    #[test]
    fn write_artifact_creates_parents_and_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("en").join("country").join("send-sms-chad.astro");
        write_artifact(&path, "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
        let tmp_path = PathBuf::from(format!("{}.sitegen.tmp", path.display()));
        assert!(!tmp_path.exists());
    }

    #[test]
    fn write_artifact_fails_when_parent_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("en");
        std::fs::write(&blocker, "file").unwrap();
        let err = write_artifact(&blocker.join("page.astro"), "x").unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
