//! # sitegen-sync
//!
//! Artifact synchronization: decides for every `(locale, record)` pair whether
//! a page is generated, left alone because a human edited it, or skipped
//! because it is protected, and keeps the manifest in step with the files.
//!
//! - [`paths`]: `(locale, record)` → artifact path
//! - [`manifest`]: the persisted ledger
//! - [`fingerprint`]: content digests and template change detection
//! - [`engine`]: classification and the sweep itself
//! - [`stats`], [`diff`], [`edits`], [`orphans`]: read-mostly tools around the ledger
//! - [`pipeline`]: open a site root and run a sweep

pub mod diff;
pub mod edits;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod orphans;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use engine::{classify, ArtifactState, SyncEngine, SyncOptions};
pub use error::SyncError;
pub use manifest::{Ledger, LedgerEntry, Manifest, OriginType};
pub use paths::{ArtifactPath, PathResolver};
pub use pipeline::{run, Mode, Site};
pub use report::{Decision, PairFailure, PairOutcome, RecordWarning, SyncReport};
