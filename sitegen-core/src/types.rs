//! Domain types for canonical records, locales, and the protected set.
//!
//! Records are read-only inputs to a sync run. Locale and protection tables
//! are static configuration, validated once into [`LocaleTable`] and
//! [`ProtectedSet`] before anything is written.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DataError};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Primary identity of a canonical record (the country name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A well-formed locale code: `xx`, or `xx-` plus a 2 to 4 character region,
/// lowercase ASCII.
///
/// Deserialization goes through [`LocaleCode::parse`], so a malformed code in
/// a config or catalog file fails at load time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleCode(String);

impl LocaleCode {
    pub fn parse(code: &str) -> Result<Self, ConfigError> {
        if is_well_formed_locale(code) {
            Ok(Self(code.to_owned()))
        } else {
            Err(ConfigError::MalformedLocale {
                code: code.to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for LocaleCode {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<LocaleCode> for String {
    fn from(code: LocaleCode) -> Self {
        code.0
    }
}

fn is_well_formed_locale(code: &str) -> bool {
    let (primary, region) = match code.split_once('-') {
        Some((primary, region)) => (primary, Some(region)),
        None => (code, None),
    };
    let primary_ok = primary.len() == 2 && primary.bytes().all(|b| b.is_ascii_lowercase());
    let region_ok = region.map_or(true, |r| {
        (2..=4).contains(&r.len())
            && r.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    });
    primary_ok && region_ok
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// A priced sub-item of a record (a mobile provider and its per-message price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubItem {
    pub name: String,
    pub value: f64,
}

/// Per-locale name and slug override.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocaleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Descriptive metadata shown on a record's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub code: String,
    pub flag: String,
    pub currency: String,
    pub calling_code: String,
    pub timezone: String,
    pub population: String,
    pub mobile_users: String,
}

impl RecordMetadata {
    /// Metadata used for records that carry none of their own.
    pub fn fallback_for(id: &RecordId) -> Self {
        RecordMetadata {
            code: id.0.to_lowercase().chars().take(2).collect(),
            flag: "🌍".to_string(),
            currency: "USD".to_string(),
            calling_code: "+?".to_string(),
            timezone: "UTC".to_string(),
            population: "N/A".to_string(),
            mobile_users: "N/A".to_string(),
        }
    }
}

/// A source-of-truth entity driving artifact generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub id: RecordId,
    pub default_slug: String,
    #[serde(default)]
    pub sub_items: Vec<SubItem>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<LocaleCode, LocaleOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
}

impl CanonicalRecord {
    /// Minimal record with no overrides or metadata.
    pub fn new(id: impl Into<RecordId>, default_slug: impl Into<String>) -> Self {
        CanonicalRecord {
            id: id.into(),
            default_slug: default_slug.into(),
            sub_items: Vec::new(),
            overrides: BTreeMap::new(),
            metadata: None,
        }
    }

    /// Slug for `locale`: the override when present and non-empty, else the default slug.
    pub fn slug_for(&self, locale: &LocaleCode) -> &str {
        self.overrides
            .get(locale)
            .and_then(|o| o.slug.as_deref())
            .filter(|slug| !slug.is_empty())
            .unwrap_or(&self.default_slug)
    }

    /// Display name for `locale`, falling back to the record id.
    pub fn name_for(&self, locale: &LocaleCode) -> &str {
        self.overrides
            .get(locale)
            .and_then(|o| o.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id.0)
    }

    /// Lowest sub-item value, or `None` when there are no sub-items.
    pub fn starting_value(&self) -> Option<f64> {
        self.sub_items
            .iter()
            .map(|item| item.value)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// The record's metadata, or the generic fallback.
    pub fn metadata_or_fallback(&self) -> RecordMetadata {
        self.metadata
            .clone()
            .unwrap_or_else(|| RecordMetadata::fallback_for(&self.id))
    }

    /// Check the fields generation depends on.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.default_slug.trim().is_empty() {
            return Err(DataError::EmptySlug {
                record: self.id.0.clone(),
            });
        }
        let override_slugs = self.overrides.values().filter_map(|o| o.slug.as_deref());
        if let Some(bad) = std::iter::once(self.default_slug.as_str())
            .chain(override_slugs)
            .find(|slug| !is_path_segment(slug))
        {
            return Err(DataError::UnsafeSlug {
                record: self.id.0.clone(),
                slug: bad.to_owned(),
            });
        }
        if self.sub_items.is_empty() {
            return Err(DataError::NoSubItems {
                record: self.id.0.clone(),
            });
        }
        if let Some(bad) = self
            .sub_items
            .iter()
            .find(|item| !item.value.is_finite() || item.value < 0.0)
        {
            return Err(DataError::InvalidValue {
                record: self.id.0.clone(),
                item: bad.name.clone(),
                value: bad.value,
            });
        }
        Ok(())
    }
}

/// Empty override slugs are allowed (they fall back to the default slug).
fn is_path_segment(slug: &str) -> bool {
    !slug.contains(['/', '\\']) && slug != "." && slug != ".."
}

// ---------------------------------------------------------------------------
// Locales
// ---------------------------------------------------------------------------

/// One supported locale and the URL prefix its artifact names start with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub code: LocaleCode,
    pub url_prefix: String,
}

/// Validated locale table with an optional default prefix for unconfigured locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTable {
    prefixes: BTreeMap<LocaleCode, String>,
    order: Vec<LocaleCode>,
    default_prefix: Option<String>,
}

impl LocaleTable {
    pub fn new(
        locales: impl IntoIterator<Item = LocaleConfig>,
        default_prefix: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut prefixes = BTreeMap::new();
        let mut order = Vec::new();
        for locale in locales {
            if prefixes.contains_key(&locale.code) {
                return Err(ConfigError::DuplicateLocale {
                    code: locale.code.to_string(),
                });
            }
            ensure_path_safe("url_prefix", &locale.url_prefix)?;
            order.push(locale.code.clone());
            prefixes.insert(locale.code, locale.url_prefix);
        }
        if let Some(prefix) = &default_prefix {
            ensure_path_safe("default_prefix", prefix)?;
        }
        Ok(LocaleTable {
            prefixes,
            order,
            default_prefix,
        })
    }

    /// Configured locale codes in configuration order.
    pub fn codes(&self) -> &[LocaleCode] {
        &self.order
    }

    pub fn is_configured(&self, locale: &LocaleCode) -> bool {
        self.prefixes.contains_key(locale)
    }

    /// URL prefix for `locale`, falling back to the default prefix.
    pub fn prefix_for(&self, locale: &LocaleCode) -> Result<&str, ConfigError> {
        self.prefixes
            .get(locale)
            .or(self.default_prefix.as_ref())
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingLocale {
                code: locale.to_string(),
            })
    }
}

/// Reject a path fragment that could leave its directory.
pub(crate) fn ensure_path_safe(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains(['/', '\\']) || value.contains("..") {
        return Err(ConfigError::UnsafePathPart {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Protected set
// ---------------------------------------------------------------------------

/// Site-relative artifact paths that are never written by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectedSet(BTreeSet<String>);

impl ProtectedSet {
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for entry in entries {
            let entry = entry.into();
            validate_protected_entry(&entry)?;
            set.insert(entry);
        }
        Ok(ProtectedSet(set))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

fn validate_protected_entry(entry: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidProtectedEntry {
        entry: entry.to_owned(),
        reason,
    };
    if entry.trim().is_empty() {
        return Err(invalid("empty path"));
    }
    if entry.starts_with('/') {
        return Err(invalid("must be relative to the output directory"));
    }
    if entry.contains('\\') {
        return Err(invalid("use '/' as the separator"));
    }
    if entry
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid("empty, '.' or '..' path segment"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
