//! Manifest (ledger): provenance of every generated artifact.
//!
//! Persists a pretty-printed JSON document at the configured manifest path:
//!
//! ```json
//! {
//!   "version": 1,
//!   "templateFingerprint": "<sha256>",
//!   "lastSyncedAt": "2026-01-01T00:00:00Z",
//!   "entries": {
//!     "et/country/saada-sms-estonia.astro": {
//!       "originType": "template",
//!       "contentFingerprint": "<sha256>",
//!       "generatedAt": "2026-01-01T00:00:00Z",
//!       "record": "Estonia",
//!       "subItemCount": 1
//!     }
//!   }
//! }
//! ```
//!
//! Older tracking files (`templateHash`, `lastGenerated`, `pages`, `type`,
//! `contentHash`, `country`, `providerCount`) load through serde aliases and
//! are rewritten with the current names on the next save. Their `version` is
//! a semver string and is ignored. Their keys are bare file names, which
//! [`Ledger::adopt_bare_keys`] moves under the directory they were written to.
//!
//! The whole file is rewritten on every save, through the same `.tmp` +
//! rename pattern as the site configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{io_err, SyncError};
use crate::paths::ArtifactPath;

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// How an artifact came to be in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginType {
    /// Written by the engine; may be regenerated.
    Template,
    /// Hand-edited; never overwritten or deleted by the engine.
    Manual,
}

/// Provenance of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(alias = "type")]
    pub origin_type: OriginType,
    #[serde(default, alias = "contentHash")]
    pub content_fingerprint: String,
    pub generated_at: DateTime<Utc>,
    /// Backing record id, informational.
    #[serde(default, alias = "country", skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    #[serde(default, alias = "providerCount", skip_serializing_if = "Option::is_none")]
    pub sub_item_count: Option<usize>,
}

impl LedgerEntry {
    /// Entry for an artifact the engine just wrote.
    pub fn template(content_fingerprint: String, generated_at: DateTime<Utc>) -> Self {
        LedgerEntry {
            origin_type: OriginType::Template,
            content_fingerprint,
            generated_at,
            record: None,
            sub_item_count: None,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.origin_type == OriginType::Manual
    }
}

/// On-disk manifest payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default = "default_version", deserialize_with = "any_version")]
    pub version: u32,
    #[serde(default, alias = "templateHash")]
    pub template_fingerprint: String,
    #[serde(default, alias = "lastGenerated")]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "pages")]
    pub entries: BTreeMap<String, LedgerEntry>,
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

/// Accept whatever an older writer stored (`1`, `"1.0.0"`); the schema is
/// always read as the current one.
fn any_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(MANIFEST_VERSION)
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            version: MANIFEST_VERSION,
            template_fingerprint: String::new(),
            last_synced_at: None,
            entries: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger: the manifest plus where it lives
// ---------------------------------------------------------------------------

/// A loaded manifest bound to its file. Mutations stay in memory until
/// [`Ledger::save`].
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    manifest: Manifest,
}

impl Ledger {
    /// Load the manifest at `path`, or start an empty one if the file is absent.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        if !path.exists() {
            tracing::debug!("no manifest at {}, starting empty", path.display());
            return Ok(Ledger::empty(path));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let mut manifest: Manifest =
            serde_json::from_str(&contents).map_err(|e| SyncError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        manifest.version = MANIFEST_VERSION;
        Ok(Ledger {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// A fresh ledger that will be saved to `path`.
    pub fn empty(path: &Path) -> Self {
        Ledger {
            path: path.to_path_buf(),
            manifest: Manifest::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn get(&self, path: &str) -> Option<&LedgerEntry> {
        self.manifest.entries.get(path)
    }

    pub fn put(&mut self, path: ArtifactPath, entry: LedgerEntry) {
        self.manifest.entries.insert(path.into(), entry);
    }

    pub fn remove(&mut self, path: &str) -> Option<LedgerEntry> {
        self.manifest.entries.remove(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.manifest
            .entries
            .iter()
            .map(|(path, entry)| (path.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.manifest.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.entries.is_empty()
    }

    /// Reclassify a tracked artifact. Returns `false` if `path` is untracked.
    pub fn set_origin(&mut self, path: &str, origin: OriginType) -> bool {
        match self.manifest.entries.get_mut(path) {
            Some(entry) => {
                entry.origin_type = origin;
                true
            }
            None => false,
        }
    }

    /// Move entries keyed by a bare file name under `dir` (`<locale>/<section>`).
    ///
    /// When the new key is already tracked, the existing entry is kept unless
    /// the bare one is manual. Returns the number of keys moved.
    pub fn adopt_bare_keys(&mut self, dir: &str) -> usize {
        let bare: Vec<String> = self
            .manifest
            .entries
            .keys()
            .filter(|key| !key.contains('/'))
            .cloned()
            .collect();
        let mut moved = 0;
        for key in bare {
            let Some(entry) = self.manifest.entries.remove(&key) else {
                continue;
            };
            let target = format!("{dir}/{key}");
            let keep_existing = self
                .manifest
                .entries
                .get(&target)
                .is_some_and(|existing| existing.is_manual() || !entry.is_manual());
            if keep_existing {
                tracing::warn!("dropping legacy manifest key {key}: {target} is already tracked");
                continue;
            }
            tracing::info!("migrated legacy manifest key {key} -> {target}");
            self.manifest.entries.insert(target, entry);
            moved += 1;
        }
        moved
    }

    /// Record the fingerprint and time of a completed sweep.
    pub fn mark_synced(&mut self, template_fingerprint: String, at: DateTime<Utc>) {
        self.manifest.template_fingerprint = template_fingerprint;
        self.manifest.last_synced_at = Some(at);
    }

    /// Atomically persist the full manifest.
    ///
    /// Writes to `<path>.tmp` then renames to `<path>`.
    pub fn save(&self) -> Result<(), SyncError> {
        let path = &self.path;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let json = serde_json::to_string_pretty(&self.manifest).map_err(|e| SyncError::Json {
            path: path.clone(),
            source: e,
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(path, e));
        }
        tracing::debug!("saved manifest ({} entries) to {}", self.len(), path.display());
        Ok(())
    }
}
