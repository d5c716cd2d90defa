//! Dialogue session management: the state machine that turns parsed
//! commands into confirmed, executed actions, with an append-only audit
//! trail per session.

pub mod audit;
pub mod question;
pub mod session;

pub use audit::{AuditLogEntry, LogLevel};
pub use question::QuestionGenerator;
pub use session::{DialogueSession, NextQuestion, SessionConfig, SessionManager, SessionState};
