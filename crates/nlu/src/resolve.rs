//! Intent resolution: score all active intents, disambiguate near ties,
//! reject low confidence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use command_hub_core::{AssistOracle, Error, IntentDefinition, IntentRegistry, Result};

use crate::score::score_intent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Consult the oracle when top1 - top2 falls below this gap.
    #[serde(default = "default_gap")]
    pub disambiguation_gap: f64,
    /// Reject selections scoring below this floor.
    #[serde(default = "default_floor")]
    pub confidence_floor: f64,
}

fn default_gap() -> f64 {
    0.15
}

fn default_floor() -> f64 {
    0.3
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            disambiguation_gap: default_gap(),
            confidence_floor: default_floor(),
        }
    }
}

/// Selects the winning intent for a normalized transcript.
pub struct IntentResolver {
    registry: Arc<IntentRegistry>,
    oracle: Arc<dyn AssistOracle>,
    config: ResolverConfig,
}

impl IntentResolver {
    pub fn new(
        registry: Arc<IntentRegistry>,
        oracle: Arc<dyn AssistOracle>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            registry,
            oracle,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<IntentRegistry> {
        &self.registry
    }

    /// Pick the winning intent and its confidence.
    ///
    /// Zero-scoring intents are discarded up front. A near tie between
    /// the best two consults the oracle; its answer is honored only when
    /// it names one of the two, anything else keeps the rule-based top1.
    /// The oracle never introduces a third option.
    pub fn select_intent(&self, text: &str) -> Result<(IntentDefinition, f64)> {
        let mut candidates: Vec<(IntentDefinition, f64)> = self
            .registry
            .active()
            .into_iter()
            .map(|intent| {
                let score = score_intent(text, &intent);
                (intent, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        if candidates.is_empty() {
            return Err(Error::NoMatch);
        }

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut winner = 0;
        if candidates.len() > 1 {
            let gap = candidates[0].1 - candidates[1].1;
            if gap < self.config.disambiguation_gap {
                debug!(
                    top1 = %candidates[0].0.key,
                    top2 = %candidates[1].0.key,
                    gap,
                    "near tie, consulting disambiguation oracle"
                );
                if let Some(answer) = self
                    .oracle
                    .disambiguate(text, [&candidates[0].0, &candidates[1].0])
                {
                    if answer == candidates[1].0.key {
                        winner = 1;
                    } else if answer != candidates[0].0.key {
                        debug!(%answer, "oracle answer names neither candidate, keeping top1");
                    }
                }
            }
        }

        let (intent, score) = candidates.swap_remove(winner);
        if score < self.config.confidence_floor {
            return Err(Error::LowConfidence { score });
        }

        debug!(intent = %intent.key, confidence = score, "intent selected");
        Ok((intent, score))
    }
}
