//! Hand-edit detection for `sitegen edits`.
//!
//! A `Template` entry whose file on disk no longer matches the recorded
//! content fingerprint has been edited by hand. Marking it `Manual` takes it
//! out of every future sweep. The sync engine itself never reclassifies.

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::error::{io_err, SyncError};
use crate::fingerprint::fingerprint;
use crate::manifest::{Ledger, OriginType};
use crate::paths::ArtifactPath;

/// A template-typed artifact whose content drifted from what was generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedArtifact {
    pub path: ArtifactPath,
    pub recorded_fingerprint: String,
    pub current_fingerprint: String,
}

/// Find template entries whose on-disk content changed since generation.
///
/// Missing files are not edits; the next sync regenerates them.
pub fn detect(ledger: &Ledger, output_dir: &Path) -> Result<Vec<EditedArtifact>, SyncError> {
    let mut edited = Vec::new();
    for (key, entry) in ledger.entries() {
        if entry.origin_type != OriginType::Template {
            continue;
        }
        let path = ArtifactPath::new(key);
        let fs_path = path.to_fs_path(output_dir);
        let content = match std::fs::read_to_string(&fs_path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(io_err(&fs_path, err)),
        };
        let current = fingerprint(&content);
        if current != entry.content_fingerprint {
            tracing::debug!("hand edit detected: {key}");
            edited.push(EditedArtifact {
                path,
                recorded_fingerprint: entry.content_fingerprint.clone(),
                current_fingerprint: current,
            });
        }
    }
    Ok(edited)
}

/// Reclassify `edited` artifacts as `Manual` and save the ledger once.
///
/// Returns the number of entries changed.
pub fn mark_manual(ledger: &mut Ledger, edited: &[EditedArtifact]) -> Result<usize, SyncError> {
    let mut changed = 0;
    for artifact in edited {
        if ledger.set_origin(artifact.path.as_str(), OriginType::Manual) {
            tracing::info!("marked manual: {}", artifact.path);
            changed += 1;
        }
    }
    if changed > 0 {
        ledger.save()?;
    }
    Ok(changed)
}
