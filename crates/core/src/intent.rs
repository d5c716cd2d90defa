//! Intent definitions and the registry they live in.
//!
//! Definitions are administrator-curated and read-only to the NLU core.
//! The registry is an explicit object passed by reference to the
//! resolver and the gateway; usage statistics are the only mutable part
//! and sit behind a lock of their own.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::slot::{SlotSpec, SlotType, SlotValue};

/// Coarse classification of an action's consequentiality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When the session must obtain explicit user confirmation.
///
/// `Threshold` derives the requirement from the risk level; `Always`
/// and `Never` override the derivation for this intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmPolicy {
    Always,
    #[default]
    Threshold,
    Never,
}

/// One registered intent: training phrases, slot schema, scoring
/// keywords, risk and access metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_sequence")]
    pub sequence: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub training_phrases: Vec<String>,
    #[serde(default)]
    pub slots: Vec<SlotSpec>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub confirm_policy: ConfirmPolicy,
    /// Score +0.2 each when found in text.
    #[serde(default)]
    pub strong_keywords: Vec<String>,
    /// Score +0.08 each, suppressed when any negative keyword fires.
    #[serde(default)]
    pub weak_keywords: Vec<String>,
    /// Score -0.25 when any is found in text.
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    /// User must hold at least one of these capability groups.
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    /// Backend modules that must be installed.
    #[serde(default)]
    pub required_modules: Vec<String>,
}

fn default_category() -> String {
    "custom".to_string()
}

fn default_sequence() -> i32 {
    10
}

fn default_active() -> bool {
    true
}

impl IntentDefinition {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: String::new(),
            category: default_category(),
            sequence: default_sequence(),
            active: true,
            training_phrases: Vec::new(),
            slots: Vec::new(),
            risk_level: RiskLevel::Low,
            confirm_policy: ConfirmPolicy::Threshold,
            strong_keywords: Vec::new(),
            weak_keywords: Vec::new(),
            negative_keywords: Vec::new(),
            required_capabilities: Vec::new(),
            required_modules: Vec::new(),
        }
    }

    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn required_slots(&self) -> impl Iterator<Item = &SlotSpec> {
        self.slots.iter().filter(|s| s.required)
    }
}

/// Execution statistics for one intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentUsage {
    pub count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

/// Holds all registered intents plus their usage statistics.
///
/// Shared as `Arc<IntentRegistry>` between the resolver and the
/// gateway; interior locks keep the public API `&self`.
#[derive(Debug)]
pub struct IntentRegistry {
    intents: RwLock<Vec<IntentDefinition>>,
    usage: RwLock<HashMap<String, IntentUsage>>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self {
            intents: RwLock::new(Vec::new()),
            usage: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_intents(intents: Vec<IntentDefinition>) -> Self {
        let registry = Self::new();
        for intent in intents {
            registry.register(intent);
        }
        registry
    }

    /// Parse a YAML document containing a list of intent definitions.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let intents: Vec<IntentDefinition> = serde_yaml::from_str(yaml)
            .map_err(|e| Error::validation(format!("invalid intent config: {}", e)))?;
        Ok(Self::with_intents(intents))
    }

    /// Register or replace (same key) a definition.
    pub fn register(&self, intent: IntentDefinition) {
        debug!(key = %intent.key, "registering intent definition");
        let mut intents = self.intents.write();
        if let Some(existing) = intents.iter_mut().find(|i| i.key == intent.key) {
            *existing = intent;
        } else {
            intents.push(intent);
        }
    }

    pub fn get(&self, key: &str) -> Option<IntentDefinition> {
        self.intents.read().iter().find(|i| i.key == key).cloned()
    }

    /// Active definitions, ordered by sequence then name.
    pub fn active(&self) -> Vec<IntentDefinition> {
        let mut result: Vec<IntentDefinition> =
            self.intents.read().iter().filter(|i| i.active).cloned().collect();
        result.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)));
        result
    }

    pub fn len(&self) -> usize {
        self.intents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.intents.read().iter().map(|i| i.key.clone()).collect()
    }

    /// Bump the usage counter and last-used timestamp for an intent.
    pub fn record_usage(&self, key: &str) {
        let mut usage = self.usage.write();
        let entry = usage.entry(key.to_string()).or_default();
        entry.count += 1;
        entry.last_used = Some(Utc::now());
    }

    pub fn usage(&self, key: &str) -> IntentUsage {
        self.usage.read().get(key).cloned().unwrap_or_default()
    }

    /// The stock intent set shipped with the hub.
    pub fn builtin() -> Arc<Self> {
        Arc::new(Self::with_intents(vec![
            sale_create(),
            purchase_create(),
            inventory_adjust(),
            crm_lead_create(),
            invoice_register_payment(),
        ]))
    }
}

impl Default for IntentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sale_create() -> IntentDefinition {
    IntentDefinition {
        description: "Create a sale order for a customer".into(),
        category: "sales".into(),
        sequence: 10,
        training_phrases: phrases(&[
            "create a sale order",
            "sell products to a customer",
            "make a new sale",
            "customer wants to buy products",
        ]),
        slots: vec![
            SlotSpec::new("partner", SlotType::Partner)
                .required()
                .with_question("Who is the customer?"),
            SlotSpec::new("product_lines", SlotType::ProductLines)
                .required()
                .with_question("What products and quantities?"),
            SlotSpec::new("confirm", SlotType::Boolean)
                .with_default(SlotValue::boolean(true))
                .with_question("Confirm the order immediately?"),
            SlotSpec::new("invoice_now", SlotType::Boolean)
                .with_default(SlotValue::boolean(false))
                .with_question("Create and post invoice now?"),
            SlotSpec::new("warehouse", SlotType::Text)
                .with_question("Which warehouse?")
                .with_keywords(&["warehouse", "from warehouse"]),
        ],
        risk_level: RiskLevel::Medium,
        strong_keywords: phrases(&["sell", "sale"]),
        weak_keywords: phrases(&["buy", "purchase", "invoice", "from me"]),
        negative_keywords: phrases(&["i buy", "i purchase", "i order", "vendor"]),
        required_capabilities: phrases(&["sales_user"]),
        required_modules: phrases(&["sale"]),
        ..IntentDefinition::new("sale_create", "Create Sale Order")
    }
}

fn purchase_create() -> IntentDefinition {
    IntentDefinition {
        description: "Create a purchase order with a vendor".into(),
        category: "purchase".into(),
        sequence: 20,
        training_phrases: phrases(&[
            "create a purchase order",
            "order products from a vendor",
            "i want to buy products",
            "procure items from a vendor",
        ]),
        slots: vec![
            SlotSpec::new("vendor", SlotType::Partner)
                .required()
                .with_question("Who is the vendor?"),
            SlotSpec::new("product_lines", SlotType::ProductLines)
                .required()
                .with_question("What products and quantities?"),
            SlotSpec::new("confirm", SlotType::Boolean)
                .with_default(SlotValue::boolean(false))
                .with_question("Confirm the purchase order immediately?"),
            SlotSpec::new("bill_now", SlotType::Boolean)
                .with_default(SlotValue::boolean(false))
                .with_question("Create vendor bill now?"),
            SlotSpec::new("expected_date", SlotType::Date)
                .with_question("When do you expect delivery?"),
        ],
        risk_level: RiskLevel::Medium,
        strong_keywords: phrases(&["i buy", "i purchase", "i order", "procure"]),
        weak_keywords: phrases(&["vendor", "order"]),
        negative_keywords: phrases(&["sell"]),
        required_capabilities: phrases(&["purchase_user"]),
        required_modules: phrases(&["purchase"]),
        ..IntentDefinition::new("purchase_create", "Create Purchase Order")
    }
}

fn inventory_adjust() -> IntentDefinition {
    IntentDefinition {
        description: "Adjust the stock quantity of a product".into(),
        category: "inventory".into(),
        sequence: 30,
        training_phrases: phrases(&[
            "adjust inventory level",
            "increase stock of a product",
            "decrease stock of a product",
            "update warehouse quantity",
        ]),
        slots: vec![
            SlotSpec::new("product", SlotType::Product)
                .required()
                .with_question("Which product?"),
            SlotSpec::new("qty_delta", SlotType::Quantity)
                .required()
                .with_question("By how much should the quantity change?"),
            SlotSpec::new("location", SlotType::Text)
                .with_question("Which stock location?")
                .with_keywords(&["location", "warehouse"]),
            SlotSpec::new("lot", SlotType::Text)
                .with_question("Which lot or serial number?")
                .with_keywords(&["lot", "serial"]),
            SlotSpec::new("reason", SlotType::Text)
                .with_question("Reason for the adjustment?")
                .with_keywords(&["because", "reason"]),
        ],
        risk_level: RiskLevel::High,
        strong_keywords: phrases(&["inventory", "stock", "warehouse"]),
        weak_keywords: phrases(&["update", "adjust"]),
        required_capabilities: phrases(&["stock_user"]),
        required_modules: phrases(&["stock"]),
        ..IntentDefinition::new("inventory_adjust", "Adjust Inventory")
    }
}

fn crm_lead_create() -> IntentDefinition {
    IntentDefinition {
        description: "Create a CRM lead or opportunity".into(),
        category: "crm".into(),
        sequence: 40,
        training_phrases: phrases(&[
            "create a new lead",
            "add an opportunity",
            "register a prospect",
            "new contact opportunity",
        ]),
        slots: vec![
            SlotSpec::new("contact", SlotType::Text)
                .required()
                .with_question("Contact name or company?")
                .with_keywords(&["lead for", "opportunity with", "prospect"]),
            SlotSpec::new("title", SlotType::Text)
                .with_question("Opportunity title?")
                .with_keywords(&["about", "regarding"]),
            SlotSpec::new("expected_revenue", SlotType::Money)
                .with_question("Expected revenue?"),
            SlotSpec::new("probability", SlotType::Quantity)
                .with_question("Probability (0-100)?"),
            SlotSpec::new("source", SlotType::Text)
                .with_question("Lead source?")
                .with_keywords(&["from", "via"]),
        ],
        risk_level: RiskLevel::Low,
        strong_keywords: phrases(&["lead", "opportunity", "prospect"]),
        weak_keywords: phrases(&["contact", "pipeline"]),
        required_capabilities: phrases(&["sales_user"]),
        required_modules: phrases(&["crm"]),
        ..IntentDefinition::new("crm_lead_create", "Create CRM Lead")
    }
}

fn invoice_register_payment() -> IntentDefinition {
    IntentDefinition {
        description: "Register a payment against an invoice".into(),
        category: "accounting".into(),
        sequence: 50,
        training_phrases: phrases(&[
            "register a payment",
            "record payment for an invoice",
            "customer paid an invoice",
            "settle an invoice",
        ]),
        slots: vec![
            SlotSpec::new("invoice_ref", SlotType::Text)
                .required()
                .with_question("Invoice reference or number?")
                .with_keywords(&["invoice", "for invoice"]),
            SlotSpec::new("amount", SlotType::Money).with_question("Payment amount?"),
            SlotSpec::new("journal", SlotType::Text)
                .with_question("Payment method/journal?")
                .with_keywords(&["by", "via", "through"]),
            SlotSpec::new("date", SlotType::Date).with_question("Payment date?"),
            SlotSpec::new("communication", SlotType::Text)
                .with_question("Payment reference/memo?")
                .with_keywords(&["memo", "reference"]),
        ],
        risk_level: RiskLevel::High,
        strong_keywords: phrases(&["payment", "settle"]),
        weak_keywords: phrases(&["pay", "receive"]),
        required_capabilities: phrases(&["account_user"]),
        required_modules: phrases(&["account"]),
        ..IntentDefinition::new("invoice_register_payment", "Register Invoice Payment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = IntentRegistry::builtin();
        assert_eq!(registry.len(), 5);

        let sale = registry.get("sale_create").unwrap();
        assert_eq!(sale.risk_level, RiskLevel::Medium);
        assert_eq!(sale.required_slots().count(), 2);
        assert_eq!(sale.slot("partner").unwrap().slot_type, SlotType::Partner);
    }

    #[test]
    fn test_register_replaces_same_key() {
        let registry = IntentRegistry::new();
        registry.register(IntentDefinition::new("a", "First"));
        registry.register(IntentDefinition::new("a", "Second"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().name, "Second");
    }

    #[test]
    fn test_active_respects_flag_and_order() {
        let registry = IntentRegistry::new();
        let mut hidden = IntentDefinition::new("hidden", "Hidden");
        hidden.active = false;
        registry.register(hidden);
        let mut late = IntentDefinition::new("late", "Late");
        late.sequence = 99;
        registry.register(late);
        let mut early = IntentDefinition::new("early", "Early");
        early.sequence = 1;
        registry.register(early);

        let active = registry.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].key, "early");
        assert_eq!(active[1].key, "late");
    }

    #[test]
    fn test_usage_tracking() {
        let registry = IntentRegistry::builtin();
        assert_eq!(registry.usage("sale_create").count, 0);
        registry.record_usage("sale_create");
        registry.record_usage("sale_create");
        let usage = registry.usage("sale_create");
        assert_eq!(usage.count, 2);
        assert!(usage.last_used.is_some());
    }

    #[test]
    fn test_registry_from_yaml() {
        let yaml = r#"
- key: timesheet_log
  name: Log Timesheet
  training_phrases:
    - log my hours
    - record time on a project
  slots:
    - name: project
      type: text
      required: true
      question: "Which project?"
    - name: hours
      type: quantity
      required: true
  risk_level: low
  strong_keywords: [timesheet, hours]
"#;
        let registry = IntentRegistry::from_yaml(yaml).unwrap();
        let intent = registry.get("timesheet_log").unwrap();
        assert_eq!(intent.training_phrases.len(), 2);
        assert_eq!(intent.slots[1].slot_type, SlotType::Quantity);
        assert_eq!(intent.confirm_policy, ConfirmPolicy::Threshold);
    }

    #[test]
    fn test_registry_from_invalid_yaml() {
        let err = IntentRegistry::from_yaml("key: not-a-list").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
