//! Path resolver: maps a `(locale, record)` pair to its artifact path.
//!
//! Artifact paths are site-relative and `/`-separated:
//! `<locale>/<section>/<url_prefix><slug><extension>`. The same string is the
//! manifest key and the form protected entries are written in.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sitegen_core::{CanonicalRecord, ConfigError, LocaleCode, LocaleTable, SiteConfig};

/// Site-relative artifact path, e.g. `et/country/saada-sms-estonia.astro`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactPath(String);

impl ArtifactPath {
    /// Wrap an already-resolved path such as a manifest key.
    pub fn new(path: impl Into<String>) -> Self {
        ArtifactPath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Location of the artifact on disk under `output_dir`.
    pub fn to_fs_path(&self, output_dir: &Path) -> PathBuf {
        self.0
            .split('/')
            .fold(output_dir.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ArtifactPath> for String {
    fn from(path: ArtifactPath) -> Self {
        path.0
    }
}

/// Pure `(locale, record) -> ArtifactPath` mapping.
#[derive(Debug, Clone)]
pub struct PathResolver {
    locales: LocaleTable,
    section: String,
    extension: String,
}

impl PathResolver {
    pub fn new(locales: LocaleTable, section: impl Into<String>, extension: impl Into<String>) -> Self {
        PathResolver {
            locales,
            section: section.into(),
            extension: extension.into(),
        }
    }

    /// Build a resolver from the site configuration, validating its locales
    /// and path layout.
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        config.check_layout()?;
        Ok(PathResolver::new(
            config.locale_table()?,
            config.section.clone(),
            config.extension.clone(),
        ))
    }

    pub fn locales(&self) -> &LocaleTable {
        &self.locales
    }

    /// Resolve the artifact path of `record` for `locale`.
    ///
    /// Fails only when `locale` is unconfigured and no default prefix exists.
    pub fn resolve(
        &self,
        locale: &LocaleCode,
        record: &CanonicalRecord,
    ) -> Result<ArtifactPath, ConfigError> {
        let prefix = self.locales.prefix_for(locale)?;
        let slug = record.slug_for(locale);
        Ok(ArtifactPath(format!(
            "{}/{prefix}{slug}{}",
            self.locale_dir(locale),
            self.extension
        )))
    }

    /// `<locale>/<section>`, or just `<locale>` when the section is empty.
    pub fn locale_dir(&self, locale: &LocaleCode) -> String {
        if self.section.is_empty() {
            locale.to_string()
        } else {
            format!("{locale}/{}", self.section)
        }
    }
}
