//! Routing and checkpointed invocation of intent handlers.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use command_hub_core::{
    Error, ExecutionPlan, ExecutionResult, IntentHandler, IntentRegistry, Result, SlotMap,
    TransactionBoundary, UserContext,
};

use crate::registry::HandlerRegistry;

/// Resolves intents to handlers and runs them inside checkpoints.
///
/// Simulation checkpoints are rolled back unconditionally; execution
/// checkpoints commit only on success, so a failing execute leaves no
/// partial writes from its scope. Usage statistics are updated outside
/// the checkpoint and survive handler failure.
pub struct ExecutionGateway {
    intents: Arc<IntentRegistry>,
    handlers: HandlerRegistry,
    boundary: Arc<dyn TransactionBoundary>,
    installed_modules: HashSet<String>,
}

impl ExecutionGateway {
    pub fn new(
        intents: Arc<IntentRegistry>,
        handlers: HandlerRegistry,
        boundary: Arc<dyn TransactionBoundary>,
        installed_modules: HashSet<String>,
    ) -> Self {
        Self {
            intents,
            handlers,
            boundary,
            installed_modules,
        }
    }

    /// Resolve the handler for an intent, enforcing access checks.
    pub fn route(&self, intent_key: &str, user: &UserContext) -> Result<Arc<dyn IntentHandler>> {
        let intent = self
            .intents
            .get(intent_key)
            .filter(|i| i.active)
            .ok_or_else(|| Error::IntentNotFound {
                key: intent_key.to_string(),
            })?;

        if !intent.required_capabilities.is_empty()
            && !intent.required_capabilities.iter().any(|g| user.has_group(g))
        {
            warn!(intent = %intent_key, user = %user.login, "capability check failed");
            return Err(Error::AccessDenied {
                reason: "You do not have the required permissions for this action.".to_string(),
            });
        }

        for module in &intent.required_modules {
            if !self.installed_modules.contains(module) {
                return Err(Error::AccessDenied {
                    reason: format!("Required module \"{}\" is not installed.", module),
                });
            }
        }

        self.handlers.get(intent_key).ok_or_else(|| Error::HandlerNotFound {
            key: intent_key.to_string(),
        })
    }

    /// Dry-run: the checkpoint is rolled back no matter what.
    pub fn simulate(
        &self,
        intent_key: &str,
        slots: &SlotMap,
        user: &UserContext,
    ) -> Result<ExecutionPlan> {
        let handler = self.route(intent_key, user)?;
        debug!(intent = %intent_key, "simulating");

        let checkpoint = self.boundary.begin();
        let result = handler.validate(slots).and_then(|_| handler.simulate(slots));
        checkpoint.rollback();
        result
    }

    /// Real run: commit on success, roll back on failure. Usage stats
    /// are bumped as soon as routing succeeds, independent of the
    /// handler outcome.
    pub fn execute(
        &self,
        intent_key: &str,
        slots: &SlotMap,
        user: &UserContext,
    ) -> Result<ExecutionResult> {
        let handler = self.route(intent_key, user)?;
        self.intents.record_usage(intent_key);
        debug!(intent = %intent_key, "executing");

        let checkpoint = self.boundary.begin();
        match handler.validate(slots).and_then(|_| handler.execute(slots)) {
            Ok(result) => {
                checkpoint.commit();
                Ok(result)
            }
            Err(err) => {
                checkpoint.rollback();
                warn!(intent = %intent_key, error = %err, "execution rolled back");
                Err(err)
            }
        }
    }
}
