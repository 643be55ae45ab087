//! Orphan reconciliation for `sitegen clean`.
//!
//! An orphan is a tracked manifest path that no current `(locale, record)`
//! pair resolves to, because the record left the catalog or its slug changed.
//! Protected paths are never removed. Manual orphans are removed only when the
//! caller confirms it explicitly.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use sitegen_core::{CanonicalRecord, LocaleCode, ProtectedSet};

use crate::error::{io_err, SyncError};
use crate::manifest::{Ledger, OriginType};
use crate::paths::{ArtifactPath, PathResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OrphanAction {
    Remove,
    KeepProtected,
    /// Manual orphan left in place because removal was not confirmed.
    KeepManual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Orphan {
    pub path: ArtifactPath,
    pub origin_type: OriginType,
    pub action: OrphanAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanPlan {
    pub orphans: Vec<Orphan>,
}

impl OrphanPlan {
    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    pub fn to_remove(&self) -> impl Iterator<Item = &Orphan> {
        self.orphans
            .iter()
            .filter(|orphan| orphan.action == OrphanAction::Remove)
    }

    pub fn kept(&self) -> impl Iterator<Item = &Orphan> {
        self.orphans
            .iter()
            .filter(|orphan| orphan.action != OrphanAction::Remove)
    }
}

/// Work out which tracked paths are orphans and what to do with each.
pub fn plan(
    ledger: &Ledger,
    resolver: &PathResolver,
    protected: &ProtectedSet,
    locales: &[LocaleCode],
    records: &[CanonicalRecord],
    confirm_manual: bool,
) -> Result<OrphanPlan, SyncError> {
    let mut expected = BTreeSet::new();
    for locale in locales {
        for record in records {
            expected.insert(resolver.resolve(locale, record)?);
        }
    }

    let orphans = ledger
        .entries()
        .filter(|(key, _)| !expected.contains(&ArtifactPath::new(*key)))
        .map(|(key, entry)| {
            let action = if protected.contains(key) {
                OrphanAction::KeepProtected
            } else if entry.is_manual() && !confirm_manual {
                OrphanAction::KeepManual
            } else {
                OrphanAction::Remove
            };
            Orphan {
                path: ArtifactPath::new(key),
                origin_type: entry.origin_type,
                action,
            }
        })
        .collect();

    Ok(OrphanPlan { orphans })
}

/// Delete every `Remove` orphan from disk and from the ledger, then save once.
///
/// Returns the removed paths.
pub fn apply(
    ledger: &mut Ledger,
    output_dir: &Path,
    plan: &OrphanPlan,
) -> Result<Vec<ArtifactPath>, SyncError> {
    let mut removed = Vec::new();
    for orphan in plan.to_remove() {
        let fs_path = orphan.path.to_fs_path(output_dir);
        match std::fs::remove_file(&fs_path) {
            Ok(()) => tracing::info!("deleted orphan: {}", orphan.path),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("orphan already gone from disk: {}", orphan.path);
            }
            Err(err) => return Err(io_err(&fs_path, err)),
        }
        ledger.remove(orphan.path.as_str());
        removed.push(orphan.path.clone());
    }
    if !removed.is_empty() {
        ledger.save()?;
    }
    Ok(removed)
}
