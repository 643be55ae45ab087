//! Content fingerprints and template change detection.
//!
//! The renderer is opaque, so a template change is inferred by rendering a
//! fixed sentinel record and comparing the digest with the one stored in the
//! manifest. A change that leaves the sentinel's output untouched (for example
//! a string used only by another locale) is not detected.

use sha2::{Digest, Sha256};

use sitegen_core::{CanonicalRecord, LocaleCode, RecordMetadata};
use sitegen_renderer::Render;

use crate::error::SyncError;
use crate::manifest::Manifest;

/// Locale the sentinel record is rendered in.
pub const SENTINEL_LOCALE: &str = "en";

/// SHA-256 hex digest of `content` after LF normalisation.
pub fn fingerprint(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let mut h = Sha256::new();
    h.update(normalized.as_bytes());
    hex::encode(h.finalize())
}

/// The fixed synthetic record. Must never change between releases, or every
/// template-typed artifact is regenerated once.
pub fn sentinel_record() -> CanonicalRecord {
    let mut record = CanonicalRecord::new("Test Country", "test");
    record.metadata = Some(RecordMetadata {
        code: "xx".to_string(),
        flag: "🏴".to_string(),
        currency: "EUR".to_string(),
        calling_code: "+999".to_string(),
        timezone: "UTC".to_string(),
        population: "1M".to_string(),
        mobile_users: "1M".to_string(),
    });
    record
}

/// Fingerprint of the renderer's output for the sentinel record.
pub fn current_fingerprint<R: Render + ?Sized>(renderer: &R) -> Result<String, SyncError> {
    let locale = LocaleCode::parse(SENTINEL_LOCALE)?;
    let content = renderer.render(&locale, &sentinel_record())?;
    Ok(fingerprint(&content))
}

/// `true` iff the current sentinel fingerprint differs from the manifest's.
pub fn has_template_changed<R: Render + ?Sized>(
    renderer: &R,
    manifest: &Manifest,
) -> Result<bool, SyncError> {
    Ok(current_fingerprint(renderer)? != manifest.template_fingerprint)
}
