//! Follow-up question generation.
//!
//! Templates come from the slot schema; the oracle may rephrase them
//! more naturally, with silent template fallback when it declines.

use std::sync::Arc;

use tracing::debug;

use command_hub_core::{AssistOracle, IntentDefinition, SlotSpec};

pub struct QuestionGenerator {
    oracle: Arc<dyn AssistOracle>,
}

impl QuestionGenerator {
    pub fn new(oracle: Arc<dyn AssistOracle>) -> Self {
        Self { oracle }
    }

    pub fn generate(&self, intent: &IntentDefinition, spec: &SlotSpec, transcript: &str) -> String {
        if let Some(question) = self.oracle.generate_question(spec, &intent.key, transcript) {
            debug!(slot = %spec.name, "using oracle-phrased question");
            return question;
        }
        Self::template(intent, spec)
    }

    fn template(intent: &IntentDefinition, spec: &SlotSpec) -> String {
        match &spec.question {
            Some(question) => match &spec.help {
                Some(help) => format!("{} ({})", question, help),
                None => question.clone(),
            },
            None => format!(
                "What is the {} for \"{}\"?",
                spec.name.replace('_', " "),
                intent.name
            ),
        }
    }
}
