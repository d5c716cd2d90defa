//! Product-line extraction: quantity/product pairs from free text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use command_hub_core::{Catalog, LineItem};

use super::reference;

/// `<number><whitespace><word-run>` up to the next boundary.
static LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s+([a-zA-Z\s]+?)(?:\s|$|,|\.)").unwrap());

/// Scan for quantity + product-name runs. Runs that do not resolve to a
/// catalog product are dropped silently; a line is never emitted with a
/// missing product. With zero hits the whole text is tried as a single
/// product at quantity 1.
pub fn extract_product_lines(
    text: &str,
    catalog: &dyn Catalog,
    threshold: f64,
) -> Vec<LineItem> {
    let mut lines = Vec::new();

    for caps in LINE_RE.captures_iter(text) {
        let qty: f64 = match caps[1].parse() {
            Ok(q) => q,
            Err(_) => continue,
        };
        let run = caps[2].trim();
        if run.is_empty() {
            continue;
        }
        match reference::extract_product(run, catalog, threshold) {
            Some(product) => lines.push(LineItem {
                product_id: product.id,
                product_name: product.name,
                qty,
                uom: product.uom,
            }),
            None => debug!(run, "unresolved product run dropped"),
        }
    }

    if lines.is_empty() {
        if let Some(product) = reference::extract_product(text, catalog, threshold) {
            lines.push(LineItem {
                product_id: product.id,
                product_name: product.name,
                qty: 1.0,
                uom: product.uom,
            });
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_hub_core::{InMemoryCatalog, Product, ProductKind};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(
            vec![],
            vec![
                Product::new(10, "Apples", ProductKind::Stockable),
                Product::new(11, "Oranges", ProductKind::Stockable),
            ],
        )
    }

    #[test]
    fn test_multiple_lines() {
        let c = catalog();
        let lines = extract_product_lines("sell 5 apples and 10 oranges", &c, 0.8);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_name, "Apples");
        assert_eq!(lines[0].qty, 5.0);
        assert_eq!(lines[1].product_name, "Oranges");
        assert_eq!(lines[1].qty, 10.0);
    }

    #[test]
    fn test_unresolved_run_dropped() {
        let c = catalog();
        let lines = extract_product_lines("sell 5 apples and 3 unicorns", &c, 0.8);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "Apples");
    }

    #[test]
    fn test_fallback_whole_text_single_product() {
        let c = catalog();
        let lines = extract_product_lines("just some oranges please", &c, 0.8);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "Oranges");
        assert_eq!(lines[0].qty, 1.0);
    }

    #[test]
    fn test_no_product_no_lines() {
        let c = catalog();
        assert!(extract_product_lines("nothing relevant", &c, 0.8).is_empty());
    }
}
