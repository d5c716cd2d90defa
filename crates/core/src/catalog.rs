//! Record catalog contract used by the reference extractors.
//!
//! The catalog is read-only from the core's perspective; mutation is the
//! persistence collaborator's responsibility. `InMemoryCatalog` backs
//! tests and demos.

use serde::{Deserialize, Serialize};

/// A partner/contact record visible to the extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Set when the partner is a known supplier.
    #[serde(default)]
    pub is_vendor: bool,
}

impl Partner {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            phone: None,
            is_vendor: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// How a product tracks (or does not track) stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Tracked quantity; eligible for inventory adjustments.
    Stockable,
    /// Consumed without tracking.
    Consumable,
    Service,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    /// Internal reference code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub kind: ProductKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, kind: ProductKind) -> Self {
        Self {
            id,
            name: name.into(),
            reference: None,
            kind,
            uom: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Lookup surface the extractors need from the persistence layer.
///
/// Field lookups are case-insensitive exact matches; enumeration order
/// is stable per catalog instance (it drives extractor tie-breaks).
pub trait Catalog: Send + Sync {
    fn partners(&self) -> Vec<Partner>;
    fn products(&self) -> Vec<Product>;
    fn partner_by_email(&self, email: &str) -> Option<Partner>;
    fn partner_by_phone(&self, phone: &str) -> Option<Partner>;
    fn product_by_reference(&self, reference: &str) -> Option<Product>;

    fn stockable_products(&self) -> Vec<Product> {
        self.products()
            .into_iter()
            .filter(|p| p.kind == ProductKind::Stockable)
            .collect()
    }
}

/// Fixed catalog for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    partners: Vec<Partner>,
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(partners: Vec<Partner>, products: Vec<Product>) -> Self {
        Self { partners, products }
    }
}

impl Catalog for InMemoryCatalog {
    fn partners(&self) -> Vec<Partner> {
        self.partners.clone()
    }

    fn products(&self) -> Vec<Product> {
        self.products.clone()
    }

    fn partner_by_email(&self, email: &str) -> Option<Partner> {
        self.partners
            .iter()
            .find(|p| p.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .cloned()
    }

    fn partner_by_phone(&self, phone: &str) -> Option<Partner> {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
        self.partners
            .iter()
            .find(|p| {
                p.phone.as_deref().is_some_and(|stored| {
                    let stored_digits: String = stored
                        .chars()
                        .filter(|c| c.is_ascii_digit() || *c == '+')
                        .collect();
                    stored_digits == digits
                })
            })
            .cloned()
    }

    fn product_by_reference(&self, reference: &str) -> Option<Product> {
        self.products
            .iter()
            .find(|p| p.reference.as_deref().is_some_and(|r| r.eq_ignore_ascii_case(reference)))
            .cloned()
    }
}
