//! Page context: serializable rendering payload built from a [`CanonicalRecord`].

use serde::{Deserialize, Serialize};

use sitegen_core::types::{CanonicalRecord, LocaleCode, RecordMetadata};

use crate::error::RenderError;

/// Everything a page template can reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    pub locale: String,
    pub record_id: String,
    /// Localized display name (override name, else record id).
    pub name: String,
    /// Localized slug (override slug, else default slug).
    pub slug: String,
    pub meta: RecordMetadata,
    /// Sub-items sorted by ascending price.
    pub providers: Vec<ProviderCtx>,
    pub provider_count: usize,
    /// Lowest price with three decimals; `0.000` when there are no providers.
    pub starting_price: String,
}

/// One priced provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCtx {
    pub name: String,
    pub price: f64,
}

impl PageContext {
    /// Build a [`PageContext`] for `record` as seen from `locale`.
    pub fn build(locale: &LocaleCode, record: &CanonicalRecord) -> Self {
        let mut providers: Vec<ProviderCtx> = record
            .sub_items
            .iter()
            .map(|item| ProviderCtx {
                name: item.name.clone(),
                price: item.value,
            })
            .collect();
        providers.sort_by(|a, b| a.price.total_cmp(&b.price));

        let starting_price = format!("{:.3}", record.starting_value().unwrap_or(0.0));

        PageContext {
            locale: locale.to_string(),
            record_id: record.id.0.clone(),
            name: record.name_for(locale).to_string(),
            slug: record.slug_for(locale).to_string(),
            meta: record.metadata_or_fallback(),
            provider_count: providers.len(),
            providers,
            starting_price,
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
