//! Record catalog: the canonical record store, and extraction from a pricelist.
//!
//! The catalog is a JSON document `{ generatedAt, records: [...] }` written by
//! `sitegen extract` and read (never mutated) by every sync run.
//!
//! A pricelist is a flat JSON object keyed `"<Country> - <Provider>"` whose
//! values carry the per-message price in `p`. An optional YAML overlay keyed by
//! country name supplies slugs, page metadata and per-locale overrides.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::{
    CanonicalRecord, LocaleCode, LocaleOverride, RecordId, RecordMetadata, SubItem,
};

/// On-disk record catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCatalog {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub records: Vec<CanonicalRecord>,
}

impl RecordCatalog {
    pub fn new(records: Vec<CanonicalRecord>) -> Self {
        RecordCatalog {
            generated_at: Utc::now(),
            records,
        }
    }
}

/// Per-record overlay entry (one key of the metadata YAML).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEntry {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub metadata: Option<RecordMetadata>,
    #[serde(default)]
    pub overrides: BTreeMap<LocaleCode, LocaleOverride>,
}

/// Metadata overlay keyed by record id.
pub type MetadataOverlay = BTreeMap<String, OverlayEntry>;

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load the record catalog at `path`.
pub fn load(path: &Path) -> Result<RecordCatalog, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::CatalogNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomically save `catalog` to `path` (`.tmp` sibling + rename).
pub fn save(path: &Path, catalog: &RecordCatalog) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(catalog).map_err(|e| ConfigError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Load a metadata overlay (YAML). Returns an empty overlay when `path` is absent.
pub fn load_overlay(path: &Path) -> Result<MetadataOverlay, ConfigError> {
    if !path.exists() {
        return Ok(MetadataOverlay::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Read a pricelist file and build a catalog, applying `overlay`.
pub fn extract_file(
    pricelist: &Path,
    overlay: &MetadataOverlay,
) -> Result<RecordCatalog, ConfigError> {
    let contents = std::fs::read_to_string(pricelist).map_err(|e| io_err(pricelist, e))?;
    let entries: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
            path: pricelist.to_path_buf(),
            source: e,
        })?;
    Ok(extract(&entries, overlay))
}

/// Group pricelist entries into one record per country.
///
/// Keys that are not `<country> - <provider>` or lack a numeric `p` are skipped.
/// Sub-items are sorted by ascending value; records are sorted by id.
pub fn extract(
    pricelist: &BTreeMap<String, serde_json::Value>,
    overlay: &MetadataOverlay,
) -> RecordCatalog {
    let mut grouped: BTreeMap<String, Vec<SubItem>> = BTreeMap::new();
    for (key, entry) in pricelist {
        let Some((country, provider)) = split_pricelist_key(key) else {
            tracing::debug!("skipping pricelist key without provider: {key}");
            continue;
        };
        let Some(price) = entry.get("p").and_then(serde_json::Value::as_f64) else {
            tracing::debug!("skipping pricelist key without price: {key}");
            continue;
        };
        grouped.entry(country.to_string()).or_default().push(SubItem {
            name: provider.to_string(),
            value: price,
        });
    }

    let records = grouped
        .into_iter()
        .map(|(country, mut sub_items)| {
            sub_items.sort_by(|a, b| a.value.total_cmp(&b.value));
            let entry = overlay.get(&country).cloned().unwrap_or_default();
            let default_slug = entry
                .slug
                .filter(|slug| !slug.is_empty())
                .unwrap_or_else(|| slugify(&country));
            CanonicalRecord {
                id: RecordId::from(country),
                default_slug,
                sub_items,
                overrides: entry.overrides,
                metadata: entry.metadata,
            }
        })
        .collect();

    RecordCatalog::new(records)
}

/// Split `"<country> - <provider>"` at the first whitespace-surrounded dash.
fn split_pricelist_key(key: &str) -> Option<(&str, &str)> {
    for (i, ch) in key.char_indices() {
        if ch != '-' {
            continue;
        }
        let before = &key[..i];
        let after = &key[i + ch.len_utf8()..];
        let spaced = before.chars().last().is_some_and(char::is_whitespace)
            && after.chars().next().is_some_and(char::is_whitespace);
        if !spaced {
            continue;
        }
        let country = before.trim();
        let provider = after.trim();
        if !country.is_empty() && !provider.is_empty() {
            return Some((country, provider));
        }
    }
    None
}

/// Lower-case `name` and collapse every run of characters outside `[a-z0-9]` to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}
