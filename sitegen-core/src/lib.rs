//! sitegen core library: domain types, site configuration, record catalog, errors.
//!
//! - [`types`]: records, locales, protected set
//! - [`error`]: [`ConfigError`], [`DataError`]
//! - [`config`]: `sitegen.yaml` load / save / init
//! - [`catalog`]: record catalog load / save and pricelist extraction

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::RecordCatalog;
pub use config::SiteConfig;
pub use error::{ConfigError, DataError};
pub use types::{
    CanonicalRecord, LocaleCode, LocaleConfig, LocaleOverride, LocaleTable, ProtectedSet,
    RecordId, RecordMetadata, SubItem,
};
