//! Intent scoring: phrase similarity plus keyword adjustment.

use std::collections::HashSet;

use strsim::normalized_levenshtein;

use command_hub_core::IntentDefinition;

const SUBSTRING_WEIGHT: f64 = 0.9;
const TOKEN_OVERLAP_WEIGHT: f64 = 0.8;
const CHAR_SIMILARITY_WEIGHT: f64 = 0.7;
const NEGATIVE_PENALTY: f64 = 0.25;
const STRONG_BOOST: f64 = 0.2;
const WEAK_BOOST: f64 = 0.08;

/// Score `text` (normalized) against one intent, in [0, 1].
///
/// An exact training-phrase match short-circuits to 1.0 before any
/// keyword adjustment. Negative keywords are applied before weak ones
/// on purpose: they must suppress weak boosts to resolve directional
/// ambiguity ("buy" as "I purchase" vs "customer buys from me").
pub fn score_intent(text: &str, intent: &IntentDefinition) -> f64 {
    let mut best = 0.0_f64;

    for phrase in &intent.training_phrases {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            continue;
        }
        if text == phrase {
            return 1.0;
        }
        if text.contains(&phrase) || phrase.contains(text) {
            best = best.max(SUBSTRING_WEIGHT);
        }
        best = best.max(token_overlap(text, &phrase) * TOKEN_OVERLAP_WEIGHT);
        best = best.max(normalized_levenshtein(text, &phrase) * CHAR_SIMILARITY_WEIGHT);
    }

    let mut score = best;
    let negative_fired = intent.negative_keywords.iter().any(|k| text.contains(k.as_str()));
    if negative_fired {
        score = (score - NEGATIVE_PENALTY).max(0.0);
    }
    for keyword in &intent.strong_keywords {
        if text.contains(keyword.as_str()) {
            score = (score + STRONG_BOOST).min(1.0);
        }
    }
    if !negative_fired {
        for keyword in &intent.weak_keywords {
            if text.contains(keyword.as_str()) {
                score = (score + WEAK_BOOST).min(1.0);
            }
        }
    }

    score
}

fn token_overlap(text: &str, phrase: &str) -> f64 {
    let text_words: HashSet<&str> = text.split_whitespace().collect();
    let phrase_words: HashSet<&str> = phrase.split_whitespace().collect();
    if text_words.is_empty() || phrase_words.is_empty() {
        return 0.0;
    }
    let common = text_words.intersection(&phrase_words).count();
    common as f64 / text_words.len().max(phrase_words.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_hub_core::{IntentDefinition, IntentRegistry};

    #[test]
    fn test_exact_phrase_scores_one() {
        let registry = IntentRegistry::builtin();
        for intent in registry.active() {
            for phrase in &intent.training_phrases {
                assert_eq!(
                    score_intent(&phrase.to_lowercase(), &intent),
                    1.0,
                    "phrase {:?} of {}",
                    phrase,
                    intent.key
                );
            }
        }
    }

    #[test]
    fn test_substring_scores_point_nine() {
        let mut intent = IntentDefinition::new("t", "T");
        intent.training_phrases = vec!["create a sale order".into()];
        let score = score_intent("please create a sale order now", &intent);
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_strong_keyword_boost() {
        let mut intent = IntentDefinition::new("t", "T");
        intent.training_phrases = vec!["adjust inventory level".into()];
        let base = score_intent("change chocolate numbers", &intent);
        intent.strong_keywords = vec!["chocolate".into()];
        let boosted = score_intent("change chocolate numbers", &intent);
        assert!((boosted - (base + 0.2).min(1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_keyword_never_increases_score() {
        let registry = IntentRegistry::builtin();
        let sale = registry.get("sale_create").unwrap();
        let without = score_intent("order products for the shop", &sale);
        let with = score_intent("i order products for the shop", &sale);
        assert!(with <= without);
    }

    #[test]
    fn test_negative_suppresses_weak_boost() {
        let mut intent = IntentDefinition::new("t", "T");
        intent.training_phrases = vec!["record something".into()];
        intent.weak_keywords = vec!["buy".into()];
        intent.negative_keywords = vec!["i buy".into()];

        let weak_only = score_intent("buy record something", &intent);
        let with_negative = score_intent("i buy record something", &intent);
        assert!(weak_only > with_negative);
    }

    #[test]
    fn test_score_floored_at_zero() {
        let mut intent = IntentDefinition::new("t", "T");
        intent.training_phrases = vec!["completely unrelated".into()];
        intent.negative_keywords = vec!["stock".into()];
        let score = score_intent("stock", &intent);
        assert!(score >= 0.0);
    }
}
