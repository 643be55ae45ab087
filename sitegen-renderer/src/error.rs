//! Error types for sitegen-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from rendering a page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// A [`crate::Render`] implementation refused a specific record.
    #[error("cannot render '{record}': {reason}")]
    Rejected { record: String, reason: String },
}
