//! Workspace-wide error type.

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the NLU core, the session state machine, and the
/// execution gateway.
///
/// Missing required slots are not an error: they are data (the session's
/// missing-slot list) driving further dialogue.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Error {
    #[error("No command text provided")]
    EmptyTranscript,

    #[error("Could not understand the command. Please try rephrasing or check available commands.")]
    NoMatch,

    #[error("Command matched with low confidence ({score:.2}). Please rephrase.")]
    LowConfidence { score: f64 },

    #[error("Intent \"{key}\" not found or inactive")]
    IntentNotFound { key: String },

    #[error("No handler registered for intent \"{key}\"")]
    HandlerNotFound { key: String },

    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Invalid action \"{action}\" in state {state}")]
    InvalidTransition { state: String, action: String },

    #[error("This action requires confirmation before execution")]
    ConfirmationRequired,

    /// A structurally valid slot value failed semantic validation; the
    /// question carries the clarification prompt to ask next.
    #[error("{message}")]
    NeedsClarification {
        slot: String,
        message: String,
        question: String,
    },

    /// Handler precondition failure (missing or inconsistent slot data).
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Handler runtime failure during simulate or execute.
    #[error("Execution failed: {message}")]
    Execution { message: String },

    #[error("Session {id} not found")]
    SessionNotFound { id: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    pub fn session_not_found(id: impl ToString) -> Self {
        Self::SessionNotFound { id: id.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::LowConfidence { score: 0.21 };
        assert!(err.to_string().contains("0.21"));

        let err = Error::InvalidTransition {
            state: "executed".into(),
            action: "execute".into(),
        };
        assert_eq!(err.to_string(), "Invalid action \"execute\" in state executed");
    }

    #[test]
    fn test_error_serialization() {
        let err = Error::AccessDenied {
            reason: "missing group sales_manager".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"kind\":\"access_denied\""));
    }

    #[test]
    fn test_message_carrying_variants_serialize() {
        let err = Error::validation("customer is required");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"kind\":\"validation\""));
        assert!(json.contains("\"message\":\"customer is required\""));

        let err = Error::session_not_found("a1b2");
        let json = serde_json::to_string(&err).unwrap();
        let back: Error = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
