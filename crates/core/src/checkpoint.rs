//! Scoped transactional checkpoint contract.
//!
//! The gateway wraps every handler call in a checkpoint supplied by the
//! persistence collaborator. The only guarantee the core relies on:
//! rolling back leaves no partial writes from the scope. Cross-session
//! races on the same underlying records are the persistence layer's
//! problem, not ours.

/// One open checkpoint. Dropping without an explicit call is treated as
/// rollback by well-behaved implementations.
pub trait Checkpoint: Send {
    fn commit(self: Box<Self>);
    fn rollback(self: Box<Self>);
}

/// Factory for checkpoints, one per gateway invocation.
pub trait TransactionBoundary: Send + Sync {
    fn begin(&self) -> Box<dyn Checkpoint>;
}

/// No-op boundary for collaborators without transactional storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBoundary;

struct NoopCheckpoint;

impl Checkpoint for NoopCheckpoint {
    fn commit(self: Box<Self>) {}
    fn rollback(self: Box<Self>) {}
}

impl TransactionBoundary for NoopBoundary {
    fn begin(&self) -> Box<dyn Checkpoint> {
        Box::new(NoopCheckpoint)
    }
}
