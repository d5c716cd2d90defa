//! Typed slot extractors.
//!
//! Every extractor takes normalized (lower-cased, trimmed) text and
//! returns `Some(value)` or `None`. Extractors never fail: malformed
//! input, unresolvable references and invalid calendar dates are all
//! "not found".

mod lines;
mod reference;
mod structured;
mod text;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use command_hub_core::{Catalog, SlotSpec, SlotType, SlotValue};

/// Tunables shared by the extractors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Minimum normalized similarity for fuzzy reference matches.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Currency assumed for bare amounts.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_fuzzy_threshold() -> f64 {
    0.8
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            default_currency: default_currency(),
        }
    }
}

/// Extracts typed values from text, resolving references against the
/// catalog. One instance serves all intents.
pub struct SlotExtractor {
    catalog: Arc<dyn Catalog>,
    config: ExtractorConfig,
}

impl SlotExtractor {
    pub fn new(catalog: Arc<dyn Catalog>, config: ExtractorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    /// Dispatch on the slot's declared type.
    pub fn extract(&self, text: &str, spec: &SlotSpec) -> Option<SlotValue> {
        match spec.slot_type {
            SlotType::Partner => self.extract_partner(text),
            SlotType::Product => self.extract_product(text),
            SlotType::ProductLines => self.extract_product_lines(text),
            SlotType::Quantity => structured::extract_quantity(text).map(SlotValue::number),
            SlotType::Money => structured::extract_money(text, &self.config.default_currency),
            SlotType::Date => structured::extract_date(text),
            SlotType::Boolean => {
                structured::extract_boolean(text, &spec.name).map(SlotValue::boolean)
            }
            SlotType::Text => text::extract_text(text, spec).map(SlotValue::text),
        }
    }

    pub fn extract_partner(&self, text: &str) -> Option<SlotValue> {
        reference::extract_partner(text, self.catalog.as_ref(), self.config.fuzzy_threshold)
            .map(|p| SlotValue::reference(p.id, p.name))
    }

    pub fn extract_product(&self, text: &str) -> Option<SlotValue> {
        reference::extract_product(text, self.catalog.as_ref(), self.config.fuzzy_threshold)
            .map(|p| SlotValue::reference(p.id, p.name))
    }

    pub fn extract_product_lines(&self, text: &str) -> Option<SlotValue> {
        let items = lines::extract_product_lines(
            text,
            self.catalog.as_ref(),
            self.config.fuzzy_threshold,
        );
        if items.is_empty() {
            None
        } else {
            Some(SlotValue::lines(items))
        }
    }

    pub fn extract_quantity(&self, text: &str) -> Option<f64> {
        structured::extract_quantity(text)
    }

    pub fn extract_money(&self, text: &str) -> Option<SlotValue> {
        structured::extract_money(text, &self.config.default_currency)
    }

    pub fn extract_date(&self, text: &str) -> Option<SlotValue> {
        structured::extract_date(text)
    }

    pub fn extract_boolean(&self, text: &str, slot_name: &str) -> Option<bool> {
        structured::extract_boolean(text, slot_name)
    }

    pub fn extract_text(&self, text: &str, spec: &SlotSpec) -> Option<String> {
        text::extract_text(text, spec)
    }
}
