//! Typed slot values and slot schema definitions.
//!
//! Slot values are a tagged union so extraction and validation code can
//! pattern-match exhaustively instead of probing untyped maps. "Not
//! found" is always represented by the absence of the slot in the map,
//! never by an empty string or zero.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Slot values keyed by slot name. BTreeMap keeps snapshot output stable.
pub type SlotMap = BTreeMap<String, SlotValue>;

/// One product line extracted from text (product + quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: u32,
    pub product_name: String,
    pub qty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
}

/// An extracted, typed slot value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotValue {
    Text { value: String },
    Number { value: f64 },
    Money { amount: f64, currency: String },
    Date { value: NaiveDate },
    Boolean { value: bool },
    /// Resolved catalog record (partner or product).
    Reference { id: u32, name: String },
    Lines { items: Vec<LineItem> },
}

impl SlotValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { value: value.into() }
    }

    pub fn number(value: f64) -> Self {
        Self::Number { value }
    }

    pub fn money(amount: f64, currency: impl Into<String>) -> Self {
        Self::Money {
            amount,
            currency: currency.into(),
        }
    }

    pub fn date(value: NaiveDate) -> Self {
        Self::Date { value }
    }

    pub fn boolean(value: bool) -> Self {
        Self::Boolean { value }
    }

    pub fn reference(id: u32, name: impl Into<String>) -> Self {
        Self::Reference {
            id,
            name: name.into(),
        }
    }

    pub fn lines(items: Vec<LineItem>) -> Self {
        Self::Lines { items }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number { value } => Some(*value),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean { value } => Some(*value),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<(u32, &str)> {
        match self {
            Self::Reference { id, name } => Some((*id, name)),
            _ => None,
        }
    }

    pub fn as_lines(&self) -> Option<&[LineItem]> {
        match self {
            Self::Lines { items } => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { value } => write!(f, "{}", value),
            Self::Number { value } => write!(f, "{}", value),
            Self::Money { amount, currency } => write!(f, "{} {}", amount, currency),
            Self::Date { value } => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::Boolean { value } => write!(f, "{}", value),
            Self::Reference { name, .. } => write!(f, "{}", name),
            Self::Lines { items } => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|l| format!("{} x {}", l.qty, l.product_name))
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// Declared type of a slot, driving extractor dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    Partner,
    Product,
    ProductLines,
    Quantity,
    Money,
    Date,
    Boolean,
    Text,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partner => "partner",
            Self::Product => "product",
            Self::ProductLines => "product_lines",
            Self::Quantity => "quantity",
            Self::Money => "money",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One slot definition inside an intent's schema.
///
/// Schema order matters: missing required slots are queued, and asked
/// about, in the order their specs are declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    #[serde(default)]
    pub required: bool,
    /// Applied when the slot is optional and extraction found nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SlotValue>,
    /// Fallback follow-up question for this slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Regex patterns tried first by the free-text extractor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    /// Keywords anchoring the free-text word-window fallback.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl SlotSpec {
    pub fn new(name: impl Into<String>, slot_type: SlotType) -> Self {
        Self {
            name: name.into(),
            slot_type,
            required: false,
            default: None,
            question: None,
            help: None,
            patterns: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_default(mut self, default: SlotValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }
}
