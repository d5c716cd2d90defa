//! Structured extractors: quantity, money, date, boolean.
//!
//! Each uses an ordered pattern list; the first matching pattern wins.

use chrono::{Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use command_hub_core::SlotValue;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)\b").unwrap());

static MONEY_SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+(?:\.\d{2})?)").unwrap());
static MONEY_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d{2})?)\s*(usd|eur|gbp)\b").unwrap());
static MONEY_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(usd|eur|gbp)\s*(\d+(?:\.\d{2})?)").unwrap());

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static SLASH_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})").unwrap());

const POSITIVE_WORDS: &[&str] = &[
    "yes", "true", "confirm", "do it", "proceed", "invoice now", "bill now",
];
const NEGATIVE_WORDS: &[&str] = &["no", "false", "cancel", "abort", "don't", "do not"];

/// First number in the text, decimals allowed.
pub fn extract_quantity(text: &str) -> Option<f64> {
    NUMBER_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Symbol-prefixed beats suffix-coded beats prefix-coded amounts; a
/// bare number pairs with the caller's default currency.
pub fn extract_money(text: &str, default_currency: &str) -> Option<SlotValue> {
    if let Some(c) = MONEY_SYMBOL_RE.captures(text) {
        let amount: f64 = c[1].parse().ok()?;
        return Some(SlotValue::money(amount, "USD"));
    }
    if let Some(c) = MONEY_SUFFIX_RE.captures(text) {
        let amount: f64 = c[1].parse().ok()?;
        return Some(SlotValue::money(amount, c[2].to_uppercase()));
    }
    if let Some(c) = MONEY_PREFIX_RE.captures(text) {
        let amount: f64 = c[2].parse().ok()?;
        return Some(SlotValue::money(amount, c[1].to_uppercase()));
    }
    extract_quantity(text).map(|amount| SlotValue::money(amount, default_currency))
}

pub fn extract_date(text: &str) -> Option<SlotValue> {
    extract_date_from(text, Utc::now().date_naive())
}

/// Relative keywords beat ISO dates beat slash-delimited day/month/year.
/// Invalid calendar dates are "not found", not an error.
pub fn extract_date_from(text: &str, today: NaiveDate) -> Option<SlotValue> {
    if text.contains("today") {
        return Some(SlotValue::date(today));
    }
    if text.contains("tomorrow") {
        return Some(SlotValue::date(today + Duration::days(1)));
    }
    if text.contains("yesterday") {
        return Some(SlotValue::date(today - Duration::days(1)));
    }

    if let Some(c) = ISO_DATE_RE.captures(text) {
        let (year, month, day) = (parse_i32(&c[1])?, parse_u32(&c[2])?, parse_u32(&c[3])?);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(SlotValue::date(date));
        }
    }

    if let Some(c) = SLASH_DATE_RE.captures(text) {
        let (day, month, year) = (parse_u32(&c[1])?, parse_u32(&c[2])?, parse_i32(&c[3])?);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(SlotValue::date(date));
        }
    }

    None
}

fn parse_i32(s: &str) -> Option<i32> {
    s.parse().ok()
}

fn parse_u32(s: &str) -> Option<u32> {
    s.parse().ok()
}

/// Positive word list, then negative word list, then a contextual rule
/// for invoicing/billing slots; `None` means undetermined.
pub fn extract_boolean(text: &str, slot_name: &str) -> Option<bool> {
    for word in POSITIVE_WORDS {
        if text.contains(word) {
            return Some(true);
        }
    }
    for word in NEGATIVE_WORDS {
        if text.contains(word) {
            return Some(false);
        }
    }

    if matches!(slot_name, "confirm" | "invoice_now" | "bill_now")
        && (text.contains("invoice") || text.contains("bill"))
    {
        return Some(text.contains("now") || text.contains("immediately"));
    }

    None
}
