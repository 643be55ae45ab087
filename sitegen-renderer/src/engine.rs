//! Tera rendering engine: the [`Render`] seam and the [`PageRenderer`] behind it.
//!
//! The sync engine only ever sees `dyn Render`/`impl Render`, so tests can
//! substitute a deterministic stub. [`PageRenderer`] is the production
//! implementation: one embedded country-page template, overridable by a
//! user template directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::{Tera, Value};

use sitegen_core::types::{CanonicalRecord, LocaleCode};

use crate::context::PageContext;
use crate::error::RenderError;

/// Name of the page template every artifact is rendered from.
pub const PAGE_TEMPLATE: &str = "country/page.astro.tera";

// ---------------------------------------------------------------------------
// Embedded templates, baked in via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("shared/_header.tera", include_str!("templates/_partials/header.tera")),
    ("shared/_providers.tera", include_str!("templates/_partials/providers.tera")),
    (PAGE_TEMPLATE, include_str!("templates/country.astro.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files.sort();
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

/// Escape a value for use inside a single-quoted JavaScript string.
fn js_str(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    Ok(Value::String(escaped))
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.register_filter("js_str", js_str);
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded defaults.
/// Template names are normalised to lowercase and relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`], loading embedded templates plus any
    /// overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the template `name` with `ctx`. Line endings are normalised to LF.
    pub fn render(&self, name: &str, ctx: &PageContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let content = self.tera.render(name, &tera_ctx)?;
        Ok(content.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Render seam
// ---------------------------------------------------------------------------

/// Pure rendering function `(locale, record) -> document content`.
///
/// Implementations must be deterministic for a fixed input; the sync engine
/// fingerprints their output to detect template changes.
pub trait Render {
    fn render(&self, locale: &LocaleCode, record: &CanonicalRecord) -> Result<String, RenderError>;
}

impl<R: Render + ?Sized> Render for &R {
    fn render(&self, locale: &LocaleCode, record: &CanonicalRecord) -> Result<String, RenderError> {
        (**self).render(locale, record)
    }
}

// ---------------------------------------------------------------------------
// PageRenderer
// ---------------------------------------------------------------------------

/// Tera-backed [`Render`] implementation for country pages.
///
/// Create once with [`PageRenderer::new`] and reuse across the whole sweep.
pub struct PageRenderer {
    engine: TemplateEngine,
}

impl PageRenderer {
    /// Construct a [`PageRenderer`] with embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_template_dir(None)
    }

    /// Construct a [`PageRenderer`] whose embedded templates may be overridden
    /// by `.tera` files under `dir`.
    pub fn with_template_dir(dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(PageRenderer {
            engine: TemplateEngine::new(dir)?,
        })
    }
}

impl Render for PageRenderer {
    fn render(&self, locale: &LocaleCode, record: &CanonicalRecord) -> Result<String, RenderError> {
        let ctx = PageContext::build(locale, record);
        self.engine.render(PAGE_TEMPLATE, &ctx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
