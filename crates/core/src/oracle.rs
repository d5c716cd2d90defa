//! Optional assist oracle contract.
//!
//! An external language-model service may improve disambiguation,
//! extraction, and question phrasing. It is strictly best-effort:
//! every method returns `Option`, unreachability and timeouts must
//! surface as `None`, and callers always have a deterministic fallback.
//! A declined answer is never retried within the same call.

use crate::intent::IntentDefinition;
use crate::slot::{SlotSpec, SlotValue};

pub trait AssistOracle: Send + Sync {
    /// Pick between two near-tied intents. The answer is honored only
    /// when it names one of the two candidate keys.
    fn disambiguate(&self, text: &str, candidates: [&IntentDefinition; 2]) -> Option<String>;

    /// Propose a value for one slot from the transcript.
    fn extract_slot(&self, text: &str, spec: &SlotSpec, intent_key: &str) -> Option<SlotValue>;

    /// Phrase a follow-up question more naturally than the template.
    fn generate_question(&self, spec: &SlotSpec, intent_key: &str, transcript: &str)
        -> Option<String>;
}

/// Oracle that always declines; the deterministic path runs alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl AssistOracle for NullOracle {
    fn disambiguate(&self, _text: &str, _candidates: [&IntentDefinition; 2]) -> Option<String> {
        None
    }

    fn extract_slot(&self, _text: &str, _spec: &SlotSpec, _intent_key: &str) -> Option<SlotValue> {
        None
    }

    fn generate_question(
        &self,
        _spec: &SlotSpec,
        _intent_key: &str,
        _transcript: &str,
    ) -> Option<String> {
        None
    }
}
