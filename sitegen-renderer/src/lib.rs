//! # sitegen-renderer
//!
//! Tera-based renderer that turns a canonical record into a localized page.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sitegen_renderer::{PageRenderer, Render};
//! use sitegen_core::types::{CanonicalRecord, LocaleCode};
//!
//! fn render_one(record: &CanonicalRecord) {
//!     let Ok(locale) = LocaleCode::parse("en") else { return };
//!     if let Ok(renderer) = PageRenderer::new() {
//!         if let Ok(page) = renderer.render(&locale, record) {
//!             println!("{} bytes", page.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{PageContext, ProviderCtx};
pub use engine::{PageRenderer, Render, TemplateEngine, PAGE_TEMPLATE};
pub use error::RenderError;
