//! Site configuration (`sitegen.yaml`).
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   sitegen.yaml                         (this file)
//!   data/records.json                    (record catalog, see `catalog`)
//!   data/generated-pages-tracking.json   (manifest, owned by sitegen-sync)
//!   src/pages/<locale>/<section>/...     (artifacts)
//! ```
//!
//! All relative paths in the file are resolved against the site root.
//! Every function takes the root explicitly so tests can point it at a `TempDir`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::{ensure_path_safe, LocaleCode, LocaleConfig, LocaleTable, ProtectedSet};

/// File name of the site configuration, relative to the site root.
pub const CONFIG_FILE: &str = "sitegen.yaml";

/// Locales of the original site with their URL prefixes.
const DEFAULT_LOCALES: &[(&str, &str)] = &[
    ("en", "send-sms-"),
    ("et", "saada-sms-"),
    ("ru", "otpravit-sms-"),
    ("es", "enviar-sms-"),
    ("de", "sms-senden-"),
    ("fr", "envoyer-sms-"),
    ("lv", "sutit-sms-"),
    ("lt", "siusti-sms-"),
];

/// Hand-curated pages that must never be regenerated.
const DEFAULT_PROTECTED: &[&str] = &[
    "en/country/send-sms-estonia.astro",
    "en/country/send-sms-united-kingdom.astro",
    "en/country/send-sms-germany.astro",
    "en/country/send-sms-france.astro",
    "en/country/send-sms-spain.astro",
];

/// Contents of `sitegen.yaml`.
///
/// Missing keys take their value from [`SiteConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Record catalog (JSON).
    pub records: PathBuf,
    /// Root directory artifacts are written under.
    pub output_dir: PathBuf,
    /// Path segment between the locale directory and the artifact file.
    pub section: String,
    /// Artifact file extension, including the leading dot.
    pub extension: String,
    /// Manifest (ledger) location.
    pub manifest: PathBuf,
    /// Optional directory of `.tera` files overriding the embedded templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    /// Prefix used for locales requested but not listed in `locales`.
    pub default_prefix: Option<String>,
    pub locales: Vec<LocaleConfig>,
    pub protected: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            records: PathBuf::from("data").join("records.json"),
            output_dir: PathBuf::from("src").join("pages"),
            section: "country".to_string(),
            extension: ".astro".to_string(),
            manifest: PathBuf::from("data").join("generated-pages-tracking.json"),
            template_dir: None,
            default_prefix: Some("send-sms-".to_string()),
            locales: DEFAULT_LOCALES
                .iter()
                .filter_map(|(code, prefix)| {
                    LocaleCode::parse(code).ok().map(|code| LocaleConfig {
                        code,
                        url_prefix: (*prefix).to_string(),
                    })
                })
                .collect(),
            protected: DEFAULT_PROTECTED.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl SiteConfig {
    /// Validate the locale entries into a [`LocaleTable`].
    pub fn locale_table(&self) -> Result<LocaleTable, ConfigError> {
        LocaleTable::new(self.locales.iter().cloned(), self.default_prefix.clone())
    }

    /// Check that `section` and `extension` stay within one path segment.
    pub fn check_layout(&self) -> Result<(), ConfigError> {
        ensure_path_safe("section", &self.section)?;
        ensure_path_safe("extension", &self.extension)
    }

    /// Validate the protected entries into a [`ProtectedSet`].
    pub fn protected_set(&self) -> Result<ProtectedSet, ConfigError> {
        ProtectedSet::new(self.protected.iter().cloned())
    }

    pub fn records_path(&self, root: &Path) -> PathBuf {
        root.join(&self.records)
    }

    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    pub fn template_dir(&self, root: &Path) -> Option<PathBuf> {
        self.template_dir.as_ref().map(|dir| root.join(dir))
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<root>/sitegen.yaml`: pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load `<root>/sitegen.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = config_path_at(root);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<root>/sitegen.yaml`.
///
/// Write flow: serialize → `sitegen.yaml.tmp` sibling → `rename`.
pub fn save_at(root: &Path, config: &SiteConfig) -> Result<(), ConfigError> {
    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
    let path = config_path_at(root);
    let tmp_path = path.with_file_name(format!("{CONFIG_FILE}.tmp"));

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(&path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Scaffold `<root>/sitegen.yaml` with the default configuration.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(root: &Path) -> Result<SiteConfig, ConfigError> {
    if config_path_at(root).exists() {
        return load_at(root);
    }
    let config = SiteConfig::default();
    save_at(root, &config)?;
    tracing::info!("wrote default configuration to {}", config_path_at(root).display());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
