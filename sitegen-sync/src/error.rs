//! Error types for sitegen-sync.

use std::path::PathBuf;

use thiserror::Error;

use sitegen_core::ConfigError;
use sitegen_renderer::RenderError;

use crate::report::SyncReport;

/// All errors that can arise from sync operations.
///
/// `Io` and `Json` are storage failures. Raised during a sweep they arrive
/// wrapped in [`SyncError::Aborted`] together with the partial report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fatal configuration problem, raised before any artifact is written.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Renderer failure outside the per-pair loop (construction, sentinel input).
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest (de)serialization error.
    #[error("manifest JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A storage failure stopped the sweep; `partial` lists what was written.
    #[error("sync aborted after writing {} artifact(s): {source}", .partial.generated)]
    Aborted {
        partial: Box<SyncReport>,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    /// The partial report attached to an aborted sweep, if any.
    pub fn partial_report(&self) -> Option<&SyncReport> {
        match self {
            SyncError::Aborted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
