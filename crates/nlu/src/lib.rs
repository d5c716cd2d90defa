//! Natural-language understanding for the command hub.
//!
//! Layered bottom-up: typed slot extractors, the intent scorer, the
//! intent resolver (scoring + disambiguation + confidence floor), and
//! the slot-filling orchestrator that ties them together and applies
//! semantic validation.

pub mod extract;
pub mod fill;
pub mod resolve;
pub mod score;

pub use extract::{ExtractorConfig, SlotExtractor};
pub use fill::{Clarification, Resolution, SemanticRule, SlotFiller, StockableProductRule};
pub use resolve::{IntentResolver, ResolverConfig};
pub use score::score_intent;

/// Lower-case and trim the transcript the way every component expects.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
