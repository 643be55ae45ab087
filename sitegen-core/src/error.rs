//! Error types for sitegen-core.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration and input-loading errors.
///
/// Every variant is raised before the first artifact is written.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with file path and serde_yaml line context.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON error while reading or writing the record catalog or a pricelist.
    #[error("failed to read JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `sitegen.yaml` did not exist at the expected path.
    #[error("site configuration not found at {path}; run `sitegen init` first")]
    ConfigNotFound { path: PathBuf },

    /// The record catalog did not exist at the configured path.
    #[error("record catalog not found at {path}; run `sitegen extract` first")]
    CatalogNotFound { path: PathBuf },

    /// A locale code that is not `xx` or `xx-` plus a 2 to 4 character region.
    #[error("malformed locale code '{code}'")]
    MalformedLocale { code: String },

    /// The same locale configured twice.
    #[error("locale '{code}' is configured more than once")]
    DuplicateLocale { code: String },

    /// A locale was requested that has no entry and no default prefix exists.
    #[error("locale '{code}' is not configured and no default_prefix is set")]
    MissingLocale { code: String },

    /// A prefix, section or extension that would place artifacts outside
    /// `<output_dir>/<locale>/<section>`.
    #[error("{field} '{value}' must not contain '/', '\\' or '..'")]
    UnsafePathPart { field: &'static str, value: String },

    /// A protected-set entry that cannot name an artifact path.
    #[error("invalid protected entry '{entry}': {reason}")]
    InvalidProtectedEntry { entry: String, reason: &'static str },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

/// A canonical record that cannot drive generation.
///
/// Recoverable: the engine skips the record and reports a warning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("record '{record}' has no sub-items; starting value is undefined")]
    NoSubItems { record: String },

    #[error("record '{record}' has an empty default slug")]
    EmptySlug { record: String },

    #[error("record '{record}' has slug '{slug}' that is not a single path segment")]
    UnsafeSlug { record: String, slug: String },

    #[error("record '{record}' has invalid value {value} for '{item}'")]
    InvalidValue {
        record: String,
        item: String,
        value: f64,
    },
}

impl DataError {
    /// Identity of the offending record.
    pub fn record(&self) -> &str {
        match self {
            DataError::NoSubItems { record }
            | DataError::EmptySlug { record }
            | DataError::UnsafeSlug { record, .. }
            | DataError::InvalidValue { record, .. } => record,
        }
    }
}
