//! Site configuration error-message, atomic-write-safety, and validation tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use sitegen_core::{
    config::{self, SiteConfig},
    ConfigError, LocaleCode,
};

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("sitegen.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("sitegen.yaml"), "must contain file path, got: {err}");
}

#[test]
fn malformed_locale_in_config_fails_to_load() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("sitegen.yaml")
        .write_str("locales:\n  - { code: English, url_prefix: send-sms- }\n")
        .expect("write");

    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("malformed locale"), "got: {err}");
}

#[test]
fn invalid_protected_entry_surfaces_on_validation() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("sitegen.yaml")
        .write_str("protected:\n  - /etc/passwd\n")
        .expect("write");

    let loaded = config::load_at(root.path()).expect("load");
    let err = loaded.protected_set().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidProtectedEntry { .. }), "got: {err}");
    assert!(err.to_string().contains("/etc/passwd"));
}

#[test]
fn missing_default_prefix_rejects_unconfigured_locale() {
    let mut cfg = SiteConfig::default();
    cfg.default_prefix = None;
    let table = cfg.locale_table().expect("table");
    let err = table
        .prefix_for(&LocaleCode::parse("fi").unwrap())
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingLocale { .. }));
    assert!(err.to_string().contains("'fi'"));
}

#[test]
fn section_or_extension_with_separators_fails_layout_check() {
    let mut cfg = SiteConfig::default();
    cfg.check_layout().expect("default layout is safe");

    cfg.section = "../outside".to_string();
    let err = cfg.check_layout().unwrap_err();
    assert!(matches!(err, ConfigError::UnsafePathPart { field: "section", .. }));
    assert!(err.to_string().contains("../outside"));

    cfg.section = "country".to_string();
    cfg.extension = ".astro/x".to_string();
    let err = cfg.check_layout().unwrap_err();
    assert!(matches!(err, ConfigError::UnsafePathPart { field: "extension", .. }));
}

#[test]
fn url_prefix_with_separator_fails_locale_table() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("sitegen.yaml")
        .write_str("locales:\n  - { code: en, url_prefix: ../send-sms- }\n")
        .expect("write");

    let loaded = config::load_at(root.path()).expect("load");
    let err = loaded.locale_table().unwrap_err();
    assert!(matches!(err, ConfigError::UnsafePathPart { field: "url_prefix", .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Init + atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn init_writes_config_and_no_tmp() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    config::init_at(root.path()).expect("init");

    root.child("sitegen.yaml").assert(predicate::path::exists());
    root.child("sitegen.yaml.tmp").assert(predicate::path::missing());
    root.child("sitegen.yaml")
        .assert(predicate::str::contains("saada-sms-"));
}

#[test]
fn init_into_missing_root_creates_it() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let nested = root.child("site").child("nested");
    config::init_at(nested.path()).expect("init");
    nested.child("sitegen.yaml").assert(predicate::path::exists());
}
