//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use sitegen_core::{
    CanonicalRecord, LocaleCode, LocaleConfig, LocaleOverride, LocaleTable, ProtectedSet, SubItem,
};
use sitegen_renderer::{Render, RenderError};
use sitegen_sync::{Ledger, PathResolver, SyncEngine};
use tempfile::TempDir;

/// Deterministic renderer whose output can be changed between runs.
#[derive(Default)]
pub struct StubRenderer {
    /// Appears in every page, including the sentinel.
    pub version: Cell<u32>,
    /// Appears only in `et` pages, never in the sentinel.
    pub et_banner: RefCell<String>,
    /// Record id whose render fails.
    pub fail_for: RefCell<Option<String>>,
    pub calls: Cell<usize>,
}

impl Render for StubRenderer {
    fn render(&self, locale: &LocaleCode, record: &CanonicalRecord) -> Result<String, RenderError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail_for.borrow().as_deref() == Some(record.id.0.as_str()) {
            return Err(RenderError::Rejected {
                record: record.id.to_string(),
                reason: "stub failure".to_string(),
            });
        }
        let banner = if locale.as_str() == "et" {
            self.et_banner.borrow().clone()
        } else {
            String::new()
        };
        Ok(format!(
            "---\nversion: {}\nlocale: {}\nname: {}\nslug: {}\nproviders: {}\n---\n{}",
            self.version.get(),
            locale,
            record.name_for(locale),
            record.slug_for(locale),
            record.sub_items.len(),
            banner,
        ))
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn locale(code: &str) -> LocaleCode {
    LocaleCode::parse(code).expect("valid locale")
}

pub fn record(id: &str, slug: &str, value: f64) -> CanonicalRecord {
    let mut record = CanonicalRecord::new(id, slug);
    record.sub_items.push(SubItem {
        name: format!("{id} Mobile"),
        value,
    });
    record
}

pub fn estonia() -> CanonicalRecord {
    let mut record = CanonicalRecord::new("Estonia", "estonia");
    record.sub_items.push(SubItem {
        name: "Telia".to_string(),
        value: 0.032,
    });
    record
}

pub fn with_override(mut record: CanonicalRecord, code: &str, slug: &str) -> CanonicalRecord {
    record.overrides.insert(
        locale(code),
        LocaleOverride {
            name: None,
            slug: Some(slug.to_string()),
        },
    );
    record
}

/// Temp site with an `en`/`et` locale table and a configurable protected set.
pub struct Site {
    pub tmp: TempDir,
    pub engine: SyncEngine<StubRenderer>,
}

impl Site {
    pub fn new(protected: &[&str]) -> Self {
        Self::with_default_prefix(protected, None)
    }

    pub fn with_default_prefix(protected: &[&str], default_prefix: Option<&str>) -> Self {
        init_logging();
        let tmp = TempDir::new().expect("tempdir");
        let table = LocaleTable::new(
            vec![
                LocaleConfig {
                    code: locale("en"),
                    url_prefix: "send-sms-".to_string(),
                },
                LocaleConfig {
                    code: locale("et"),
                    url_prefix: "saada-sms-".to_string(),
                },
            ],
            default_prefix.map(str::to_string),
        )
        .expect("locale table");
        let engine = SyncEngine::new(
            StubRenderer::default(),
            PathResolver::new(table, "country", ".astro"),
            ProtectedSet::new(protected.iter().copied()).expect("protected set"),
            tmp.path().join("pages"),
        );
        Site { tmp, engine }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.tmp.path().join("pages")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.tmp.path().join("data").join("generated-pages-tracking.json")
    }

    pub fn ledger(&self) -> Ledger {
        Ledger::load(&self.manifest_path()).expect("load ledger")
    }

    pub fn page(&self, artifact: &str) -> PathBuf {
        artifact
            .split('/')
            .fold(self.output_dir(), |path, segment| path.join(segment))
    }

    pub fn read(&self, artifact: &str) -> String {
        std::fs::read_to_string(self.page(artifact)).expect("read page")
    }

    /// Put a file on disk without touching the ledger.
    pub fn write_untracked(&self, artifact: &str, content: &str) {
        let path = self.page(artifact);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, content).expect("write");
    }

    pub fn renderer(&self) -> &StubRenderer {
        self.engine.renderer()
    }
}

/// Push a file's mtime a day into the past and return it.
pub fn age(path: &Path) -> FileTime {
    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(24 * 60 * 60));
    set_file_mtime(path, old).expect("set mtime");
    old
}

pub fn mtime(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&std::fs::metadata(path).expect("metadata"))
}
