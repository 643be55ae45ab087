//! Manifest statistics for `sitegen stats`.

use serde::Serialize;

use sitegen_core::ProtectedSet;

use crate::manifest::{Manifest, OriginType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Tracked artifacts.
    pub total: usize,
    pub template: usize,
    pub manual: usize,
    /// Size of the configured protected set (protected pages are not tracked).
    pub protected: usize,
}

pub fn collect(manifest: &Manifest, protected: &ProtectedSet) -> Stats {
    let mut stats = Stats {
        total: manifest.entries.len(),
        protected: protected.len(),
        ..Stats::default()
    };
    for entry in manifest.entries.values() {
        match entry.origin_type {
            OriginType::Template => stats.template += 1,
            OriginType::Manual => stats.manual += 1,
        }
    }
    stats
}
