//! Handler registry: an explicit object constructed at startup and
//! passed by reference, never a global.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use command_hub_core::IntentHandler;

/// Registry of business-action handlers keyed by intent key.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler. Replaces any handler already registered for
    /// the same intent key.
    pub fn register(&mut self, intent_key: impl Into<String>, handler: Arc<dyn IntentHandler>) {
        let key = intent_key.into();
        info!(intent = %key, "registered intent handler");
        self.handlers.insert(key, handler);
    }

    pub fn get(&self, intent_key: &str) -> Option<Arc<dyn IntentHandler>> {
        self.handlers.get(intent_key).cloned()
    }

    pub fn contains(&self, intent_key: &str) -> bool {
        self.handlers.contains_key(intent_key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn intent_keys(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_hub_core::{
        Error, ExecutionPlan, ExecutionResult, Result, RiskLevel, SlotMap,
    };

    struct StubHandler;

    impl IntentHandler for StubHandler {
        fn validate(&self, _slots: &SlotMap) -> Result<()> {
            Ok(())
        }

        fn simulate(&self, _slots: &SlotMap) -> Result<ExecutionPlan> {
            Ok(ExecutionPlan {
                action: "stub".into(),
                summary: "stub".into(),
                steps: vec![],
                risk_level: RiskLevel::Low,
                warning: None,
            })
        }

        fn execute(&self, _slots: &SlotMap) -> Result<ExecutionResult> {
            Err(Error::execution("stub"))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        registry.register("sale_create", Arc::new(StubHandler));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("sale_create"));
        assert!(registry.get("sale_create").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = HandlerRegistry::new();
        registry.register("sale_create", Arc::new(StubHandler));
        registry.register("sale_create", Arc::new(StubHandler));
        assert_eq!(registry.len(), 1);
    }
}
