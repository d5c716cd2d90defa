//! Reference extractors: resolve partner and product mentions against
//! the catalog.
//!
//! Priority per entry kind: direct name mention (the full catalog name
//! contained in the text, or a whole word of the name appearing as a
//! word of the text) wins outright, then fixed-pattern lookups
//! (email/phone for partners, reference code for products), then the
//! best fuzzy match at or above the threshold. Among fuzzy candidates a
//! strictly greater score replaces the current best; ties keep the
//! earliest-seen entry.

use once_cell::sync::Lazy;
use regex::Regex;
use strsim::normalized_levenshtein;
use tracing::trace;

use command_hub_core::{Catalog, Partner, Product};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\d[\d\s\-\(\)]{7,}\d").unwrap());

/// Internal reference codes look like "apl-1" or "wh-03-a".
static REF_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z0-9]+(?:-[a-z0-9]+)+\b").unwrap());

/// Words this short ("to", "co") would mention half the catalog.
const MIN_NAME_TOKEN_LEN: usize = 3;

/// Full-name containment, or a whole word of the name (first name,
/// surname, brand word) appearing as a whole word of the text.
fn name_mentioned(text: &str, name: &str) -> bool {
    if text.contains(name) {
        return true;
    }
    name.split_whitespace()
        .filter(|token| token.len() >= MIN_NAME_TOKEN_LEN)
        .any(|token| text.split_whitespace().any(|word| word == token))
}

pub fn extract_partner(text: &str, catalog: &dyn Catalog, threshold: f64) -> Option<Partner> {
    let mut best: Option<Partner> = None;
    let mut best_score = 0.0;

    for partner in catalog.partners() {
        let name = partner.name.to_lowercase();
        if name.is_empty() {
            continue;
        }
        if name_mentioned(text, &name) {
            return Some(partner);
        }
        let score = normalized_levenshtein(&name, text);
        if score > best_score && score >= threshold {
            trace!(name = %partner.name, score, "fuzzy partner candidate");
            best_score = score;
            best = Some(partner);
        }
    }

    if let Some(email) = EMAIL_RE.find(text) {
        if let Some(partner) = catalog.partner_by_email(email.as_str()) {
            return Some(partner);
        }
    }

    if let Some(phone) = PHONE_RE.find(text) {
        if let Some(partner) = catalog.partner_by_phone(phone.as_str()) {
            return Some(partner);
        }
    }

    best
}

pub fn extract_product(text: &str, catalog: &dyn Catalog, threshold: f64) -> Option<Product> {
    let mut best: Option<Product> = None;
    let mut best_score = 0.0;

    for product in catalog.products() {
        let name = product.name.to_lowercase();
        if name.is_empty() {
            continue;
        }
        if name_mentioned(text, &name) {
            return Some(product);
        }
        let score = normalized_levenshtein(&name, text);
        if score > best_score && score >= threshold {
            trace!(name = %product.name, score, "fuzzy product candidate");
            best_score = score;
            best = Some(product);
        }
    }

    for code in REF_CODE_RE.find_iter(text) {
        if let Some(product) = catalog.product_by_reference(code.as_str()) {
            return Some(product);
        }
    }

    // Codes without a separator ("apl1") never match REF_CODE_RE; they
    // still resolve by containment of the stored reference.
    for product in catalog.products() {
        if product
            .reference
            .as_deref()
            .is_some_and(|r| !r.is_empty() && text.contains(&r.to_lowercase()))
        {
            return Some(product);
        }
    }

    best
}
