//! Free-text extraction driven by the slot spec.

use regex::RegexBuilder;
use tracing::debug;

use command_hub_core::SlotSpec;

/// Window taken after a matched keyword.
const KEYWORD_WINDOW_WORDS: usize = 3;

/// Slot-specific patterns first (first capture group, else the whole
/// match), then a fixed-length word window after a matched keyword.
/// Patterns that fail to compile are skipped, not raised.
pub fn extract_text(text: &str, spec: &SlotSpec) -> Option<String> {
    for pattern in &spec.patterns {
        let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(err) => {
                debug!(slot = %spec.name, pattern, %err, "skipping invalid slot pattern");
                continue;
            }
        };
        if let Some(caps) = re.captures(text) {
            let value = caps
                .get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().trim().to_string());
            if let Some(value) = value {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }

    for keyword in &spec.keywords {
        let keyword = keyword.to_lowercase();
        if let Some(idx) = text.find(&keyword) {
            let after = text[idx + keyword.len()..].trim();
            let window: Vec<&str> = after.split_whitespace().take(KEYWORD_WINDOW_WORDS).collect();
            if !window.is_empty() {
                return Some(window.join(" "));
            }
        }
    }

    None
}
