//! Core types and collaborator contracts for the command hub.
//!
//! Everything the NLU and dialogue layers share lives here: the typed
//! slot value model, intent definitions and their registry, the error
//! type, and the traits implemented by external collaborators (business
//! handlers, the record catalog, the transactional boundary, and the
//! optional assist oracle).

pub mod catalog;
pub mod checkpoint;
pub mod error;
pub mod handler;
pub mod intent;
pub mod oracle;
pub mod slot;
pub mod user;

pub use catalog::{Catalog, InMemoryCatalog, Partner, Product, ProductKind};
pub use checkpoint::{Checkpoint, NoopBoundary, TransactionBoundary};
pub use error::{Error, Result};
pub use handler::{ExecutionPlan, ExecutionResult, IntentHandler, RecordRef};
pub use intent::{ConfirmPolicy, IntentDefinition, IntentRegistry, IntentUsage, RiskLevel};
pub use oracle::{AssistOracle, NullOracle};
pub use slot::{LineItem, SlotMap, SlotSpec, SlotType, SlotValue};
pub use user::UserContext;
