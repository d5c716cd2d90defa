//! Execution gateway: maps resolved intents to registered handlers and
//! invokes them behind access checks and transactional checkpoints.

pub mod gateway;
pub mod registry;

pub use gateway::ExecutionGateway;
pub use registry::HandlerRegistry;
