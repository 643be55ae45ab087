//! Unified diff preview for `sitegen diff`.
//!
//! Renders every pair the engine is allowed to write and compares the result
//! with the artifact on disk. Nothing is written.

use std::io::ErrorKind;
use std::path::Path;

use similar::TextDiff;

use sitegen_core::{CanonicalRecord, LocaleCode};
use sitegen_renderer::Render;

use crate::engine::SyncEngine;
use crate::error::{io_err, SyncError};
use crate::fingerprint::has_template_changed;
use crate::manifest::Ledger;
use crate::paths::ArtifactPath;
use crate::report::Decision;

/// A single rendered artifact that differs from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDiff {
    pub path: ArtifactPath,
    /// What a non-forced sync would do with this artifact.
    pub decision: Decision,
    pub unified_diff: String,
}

/// Diff the renderer's current output against disk for every writable pair.
///
/// Protected and manual artifacts are not rendered. Records that fail
/// validation and pairs whose render fails are skipped, as in a sync.
pub fn preview<R: Render>(
    engine: &SyncEngine<R>,
    ledger: &Ledger,
    locales: &[LocaleCode],
    records: &[CanonicalRecord],
) -> Result<Vec<ArtifactDiff>, SyncError> {
    let template_changed = has_template_changed(engine.renderer(), ledger.manifest())?;
    let mut diffs = Vec::new();

    for locale in locales {
        for record in records {
            if let Err(err) = record.validate() {
                tracing::debug!("diff: skipping record: {err}");
                continue;
            }
            let path = engine.resolver().resolve(locale, record)?;
            let decision = engine.classify_pair(ledger, &path, template_changed, false)?;
            if matches!(decision, Decision::SkipProtected | Decision::SkipManual) {
                continue;
            }

            let rendered = match engine.renderer().render(locale, record) {
                Ok(content) => normalize_line_endings(&content),
                Err(err) => {
                    tracing::warn!("diff: render failed for {path}: {err}");
                    continue;
                }
            };
            let existing = read_existing_or_empty(&path.to_fs_path(engine.output_dir()))?;
            if existing == rendered {
                continue;
            }

            let old_header = format!("a/{path}");
            let new_header = format!("b/{path}");
            let unified = TextDiff::from_lines(&existing, &rendered)
                .unified_diff()
                .header(&old_header, &new_header)
                .context_radius(3)
                .to_string();

            diffs.push(ArtifactDiff {
                path,
                decision,
                unified_diff: unified,
            });
        }
    }

    Ok(diffs)
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use sitegen_core::{LocaleConfig, LocaleTable, ProtectedSet, SubItem};
    use sitegen_renderer::RenderError;
    use tempfile::TempDir;

    use crate::engine::SyncOptions;
    use crate::paths::PathResolver;

    use super::*;

    struct Versioned(Cell<u32>);

    impl Render for Versioned {
        fn render(&self, locale: &LocaleCode, record: &CanonicalRecord) -> Result<String, RenderError> {
            if record.id.0 == "Broken" {
                return Err(RenderError::Rejected {
                    record: record.id.to_string(),
                    reason: "unrenderable".to_string(),
                });
            }
            Ok(format!("v{}\n{}\n{}\n", self.0.get(), locale, record.id))
        }
    }

    fn engine(out: &Path) -> SyncEngine<Versioned> {
        let table = LocaleTable::new(
            vec![LocaleConfig {
                code: LocaleCode::parse("en").unwrap(),
                url_prefix: "send-sms-".to_string(),
            }],
            None,
        )
        .unwrap();
        SyncEngine::new(
            Versioned(Cell::new(1)),
            PathResolver::new(table, "country", ".astro"),
            ProtectedSet::default(),
            out,
        )
    }

    fn records() -> Vec<CanonicalRecord> {
        let mut chad = CanonicalRecord::new("Chad", "chad");
        chad.sub_items.push(SubItem {
            name: "Airtel".to_string(),
            value: 0.05,
        });
        vec![chad]
    }

    #[test]
    fn no_diffs_after_clean_sync() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(&tmp.path().join("pages"));
        let mut ledger = Ledger::empty(&tmp.path().join("manifest.json"));
        let locales = [LocaleCode::parse("en").unwrap()];
        engine
            .sync(&mut ledger, &locales, &records(), SyncOptions::default())
            .unwrap();

        let diffs = preview(&engine, &ledger, &locales, &records()).unwrap();
        assert!(diffs.is_empty(), "synced site should have no diff");
    }

    #[test]
    fn diff_shows_template_change_without_writing() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(&tmp.path().join("pages"));
        let mut ledger = Ledger::empty(&tmp.path().join("manifest.json"));
        let locales = [LocaleCode::parse("en").unwrap()];
        engine
            .sync(&mut ledger, &locales, &records(), SyncOptions::default())
            .unwrap();
        let page = tmp.path().join("pages/en/country/send-sms-chad.astro");
        let before = std::fs::read_to_string(&page).unwrap();

        engine.renderer().0.set(2);
        let diffs = preview(&engine, &ledger, &locales, &records()).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].decision, Decision::Generate);
        assert!(diffs[0].unified_diff.contains("-v1"));
        assert!(diffs[0].unified_diff.contains("+v2"));
        assert!(diffs[0]
            .unified_diff
            .contains("a/en/country/send-sms-chad.astro"));
        assert_eq!(std::fs::read_to_string(&page).unwrap(), before, "diff must not write");
    }

    #[test]
    fn render_failure_skips_the_pair_and_keeps_previewing() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(&tmp.path().join("pages"));
        let ledger = Ledger::empty(&tmp.path().join("manifest.json"));
        let locales = [LocaleCode::parse("en").unwrap()];
        let mut broken = CanonicalRecord::new("Broken", "broken");
        broken.sub_items.push(SubItem {
            name: "Nobody".to_string(),
            value: 0.01,
        });
        let mut all = vec![broken];
        all.extend(records());

        let diffs = preview(&engine, &ledger, &locales, &all).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path.as_str(), "en/country/send-sms-chad.astro");
    }

    #[test]
    fn missing_artifact_diffs_against_empty() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(&tmp.path().join("pages"));
        let ledger = Ledger::empty(&tmp.path().join("manifest.json"));
        let locales = [LocaleCode::parse("en").unwrap()];
        let diffs = preview(&engine, &ledger, &locales, &records()).unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].unified_diff.contains("+Chad"));
    }
}
