//! Slot-filling orchestration and semantic validation.
//!
//! The filler is the top of the NLU stack: it resolves the intent,
//! walks the schema extracting every slot (oracle first, deterministic
//! extractors as fallback), applies declared defaults, computes the
//! missing-required list in schema order, and runs semantic rules that
//! may push a structurally valid slot back onto the missing list with a
//! clarification prompt.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use command_hub_core::{
    AssistOracle, Catalog, Error, IntentDefinition, ProductKind, Result, RiskLevel, SlotMap,
};

use crate::extract::SlotExtractor;
use crate::normalize;
use crate::resolve::IntentResolver;

/// Outcome of parsing one transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub intent_key: String,
    pub slots: SlotMap,
    /// Required slots still unfilled, in schema order.
    pub missing_slots: Vec<String>,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    /// Present when semantic validation reinstated a slot as missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification: Option<Clarification>,
}

/// A semantic-validation rejection turned into a follow-up question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarification {
    pub slot: String,
    pub message: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Intent-specific check running after extraction. Returning a
/// clarification reinstates the named slot as missing without
/// discarding the other resolved slots.
pub trait SemanticRule: Send + Sync {
    fn check(
        &self,
        intent: &IntentDefinition,
        slots: &SlotMap,
        catalog: &dyn Catalog,
    ) -> Option<Clarification>;
}

/// Rejects a product that cannot track stock for quantity-adjusting
/// intents, suggesting stockable alternatives instead.
pub struct StockableProductRule {
    intent_key: String,
    slot_name: String,
    max_suggestions: usize,
}

impl StockableProductRule {
    pub fn new(intent_key: impl Into<String>, slot_name: impl Into<String>) -> Self {
        Self {
            intent_key: intent_key.into(),
            slot_name: slot_name.into(),
            max_suggestions: 5,
        }
    }
}

impl Default for StockableProductRule {
    fn default() -> Self {
        Self::new("inventory_adjust", "product")
    }
}

impl SemanticRule for StockableProductRule {
    fn check(
        &self,
        intent: &IntentDefinition,
        slots: &SlotMap,
        catalog: &dyn Catalog,
    ) -> Option<Clarification> {
        if intent.key != self.intent_key {
            return None;
        }
        let (product_id, product_name) = slots.get(&self.slot_name)?.as_reference()?;
        let product = catalog.products().into_iter().find(|p| p.id == product_id)?;
        if product.kind == ProductKind::Stockable {
            return None;
        }

        let stockable = catalog.stockable_products();
        if stockable.is_empty() {
            return None;
        }
        let suggestions: Vec<String> = stockable.iter().map(|p| p.name.clone()).collect();
        let mut suggestion_text = suggestions
            .iter()
            .take(self.max_suggestions)
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ");
        if suggestions.len() > self.max_suggestions {
            suggestion_text.push_str(&format!(
                " and {} more...",
                suggestions.len() - self.max_suggestions
            ));
        }

        Some(Clarification {
            slot: self.slot_name.clone(),
            message: format!(
                "The product \"{}\" is consumable. Suggesting alternatives...",
                product_name
            ),
            question: format!(
                "I found that \"{}\" is a consumable product and can't track \
                 inventory adjustments.\n\nHere are some stockable products you can \
                 adjust instead: {}\n\nWhich product did you actually mean to adjust?",
                product_name, suggestion_text
            ),
            suggestions,
        })
    }
}

/// Ties the resolver, the extractors and the semantic rules together.
pub struct SlotFiller {
    resolver: IntentResolver,
    extractor: SlotExtractor,
    oracle: Arc<dyn AssistOracle>,
    rules: Vec<Box<dyn SemanticRule>>,
}

impl SlotFiller {
    pub fn new(
        resolver: IntentResolver,
        extractor: SlotExtractor,
        oracle: Arc<dyn AssistOracle>,
        rules: Vec<Box<dyn SemanticRule>>,
    ) -> Self {
        Self {
            resolver,
            extractor,
            oracle,
            rules,
        }
    }

    pub fn resolver(&self) -> &IntentResolver {
        &self.resolver
    }

    /// Parse one transcript into a resolution.
    pub fn parse(&self, text: &str) -> Result<Resolution> {
        let text = normalize(text);
        if text.is_empty() {
            return Err(Error::EmptyTranscript);
        }

        let (intent, confidence) = self.resolver.select_intent(&text)?;
        let mut slots = self.extract_slots(&text, &intent);

        let mut missing_slots: Vec<String> = intent
            .required_slots()
            .filter(|spec| !slots.contains_key(&spec.name))
            .map(|spec| spec.name.clone())
            .collect();

        let mut clarification = None;
        for rule in &self.rules {
            if let Some(c) = rule.check(&intent, &slots, self.extractor.catalog().as_ref()) {
                warn!(
                    intent = %intent.key,
                    slot = %c.slot,
                    message = %c.message,
                    "semantic validation reinstated slot as missing"
                );
                slots.remove(&c.slot);
                missing_slots = vec![c.slot.clone()];
                clarification = Some(c);
                break;
            }
        }

        Ok(Resolution {
            intent_key: intent.key.clone(),
            slots,
            missing_slots,
            risk_level: intent.risk_level,
            confidence,
            clarification,
        })
    }

    /// Walk the schema in declared order. The oracle gets the first
    /// shot at each slot; any decline falls through silently to the
    /// deterministic extractor. Declared defaults apply to optional
    /// slots that stayed empty.
    fn extract_slots(&self, text: &str, intent: &IntentDefinition) -> SlotMap {
        let mut slots = SlotMap::new();

        for spec in &intent.slots {
            let value = self
                .oracle
                .extract_slot(text, spec, &intent.key)
                .or_else(|| self.extractor.extract(text, spec));

            match value {
                Some(value) => {
                    debug!(intent = %intent.key, slot = %spec.name, %value, "slot extracted");
                    slots.insert(spec.name.clone(), value);
                }
                None => {
                    if !spec.required {
                        if let Some(default) = &spec.default {
                            slots.insert(spec.name.clone(), default.clone());
                        }
                    }
                }
            }
        }

        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractorConfig;
    use crate::resolve::ResolverConfig;
    use command_hub_core::{
        InMemoryCatalog, IntentRegistry, NullOracle, Partner, Product, SlotValue,
    };

    fn catalog() -> Arc<InMemoryCatalog> {
        Arc::new(InMemoryCatalog::new(
            vec![Partner::new(1, "John Smith")],
            vec![
                Product::new(10, "Apples", ProductKind::Stockable),
                Product::new(11, "Chocolate", ProductKind::Consumable),
                Product::new(12, "Oranges", ProductKind::Stockable),
            ],
        ))
    }

    fn filler() -> SlotFiller {
        let registry = IntentRegistry::builtin();
        let oracle: Arc<dyn AssistOracle> = Arc::new(NullOracle);
        let catalog = catalog();
        SlotFiller::new(
            IntentResolver::new(registry, oracle.clone(), ResolverConfig::default()),
            SlotExtractor::new(catalog, ExtractorConfig::default()),
            oracle,
            vec![Box::new(StockableProductRule::default())],
        )
    }

    #[test]
    fn test_empty_transcript() {
        let err = filler().parse("   ").unwrap_err();
        assert_eq!(err, Error::EmptyTranscript);
    }

    #[test]
    fn test_sale_scenario_fully_filled() {
        let resolution = filler().parse("sell 5 apples to John").unwrap();
        assert_eq!(resolution.intent_key, "sale_create");
        assert!(resolution.missing_slots.is_empty());
        assert!(resolution.clarification.is_none());

        let lines = resolution.slots["product_lines"].as_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "Apples");
        assert_eq!(lines[0].qty, 5.0);
        assert_eq!(
            resolution.slots["partner"],
            SlotValue::reference(1, "John Smith")
        );
    }

    #[test]
    fn test_consumable_product_clarification() {
        let resolution = filler().parse("increase chocolate stock by 200").unwrap();
        assert_eq!(resolution.intent_key, "inventory_adjust");
        assert_eq!(resolution.missing_slots, vec!["product".to_string()]);
        assert!(!resolution.slots.contains_key("product"));
        // Other resolved slots survive the clarification.
        assert_eq!(resolution.slots["qty_delta"], SlotValue::number(200.0));

        let clarification = resolution.clarification.unwrap();
        assert_eq!(clarification.slot, "product");
        assert!(clarification.message.contains("Chocolate"));
        assert_eq!(
            clarification.suggestions,
            vec!["Apples".to_string(), "Oranges".to_string()]
        );
    }

    #[test]
    fn test_missing_required_slots_in_schema_order() {
        let resolution = filler().parse("create a sale order").unwrap();
        assert_eq!(resolution.intent_key, "sale_create");
        assert_eq!(
            resolution.missing_slots,
            vec!["partner".to_string(), "product_lines".to_string()]
        );
    }

    #[test]
    fn test_defaults_applied_to_optional_slots() {
        let resolution = filler().parse("create a sale order").unwrap();
        assert_eq!(resolution.slots["confirm"], SlotValue::boolean(true));
        assert_eq!(resolution.slots["invoice_now"], SlotValue::boolean(false));
    }

    #[test]
    fn test_suggestion_summary_truncates_after_five() {
        let products: Vec<Product> = (0..8)
            .map(|i| Product::new(i, format!("Item {}", i), ProductKind::Stockable))
            .chain(std::iter::once(Product::new(
                99,
                "Chocolate",
                ProductKind::Consumable,
            )))
            .collect();
        let catalog = InMemoryCatalog::new(vec![], products);
        let rule = StockableProductRule::default();
        let registry = IntentRegistry::builtin();
        let intent = registry.get("inventory_adjust").unwrap();
        let mut slots = SlotMap::new();
        slots.insert("product".into(), SlotValue::reference(99, "Chocolate"));

        let clarification = rule.check(&intent, &slots, &catalog).unwrap();
        assert_eq!(clarification.suggestions.len(), 8);
        assert!(clarification.question.contains("and 3 more..."));
    }
}
