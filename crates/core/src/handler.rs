//! Business-action handler contract and its result shapes.
//!
//! Handlers are supplied by external collaborators and invoked through
//! the execution gateway. They are called at most once per gateway
//! invocation and never retried automatically.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::intent::RiskLevel;
use crate::slot::SlotMap;

/// Reference to a domain record created or updated by a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRef {
    /// Record kind, e.g. "sale.order".
    pub model: String,
    pub id: u32,
    pub name: String,
}

impl RecordRef {
    pub fn new(model: impl Into<String>, id: u32, name: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id,
            name: name.into(),
        }
    }
}

/// Dry-run description of what an execute call would do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub action: String,
    pub summary: String,
    /// Planned sub-actions, in order.
    pub steps: Vec<String>,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Outcome of a real execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_records: Vec<RecordRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updated_records: Vec<RecordRef>,
}

impl ExecutionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            created_records: Vec::new(),
            updated_records: Vec::new(),
        }
    }

    pub fn with_created(mut self, record: RecordRef) -> Self {
        self.created_records.push(record);
        self
    }

    pub fn with_updated(mut self, record: RecordRef) -> Self {
        self.updated_records.push(record);
        self
    }
}

/// One intent's business logic.
///
/// `validate` checks handler-side preconditions beyond schema
/// completeness. `simulate` must have no side effects; the gateway
/// additionally rolls back its checkpoint unconditionally.
pub trait IntentHandler: Send + Sync {
    fn validate(&self, slots: &SlotMap) -> Result<()>;
    fn simulate(&self, slots: &SlotMap) -> Result<ExecutionPlan>;
    fn execute(&self, slots: &SlotMap) -> Result<ExecutionResult>;
}
