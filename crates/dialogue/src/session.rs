//! The dialogue session state machine and its manager.
//!
//! States: `collecting -> ready -> executed`, with `ready -> collecting`
//! on post-parse validation failure, `collecting|ready -> aborted` on
//! user abort and `ready -> aborted` on execution failure. Every
//! transition appends at least one audit entry; all errors are caught
//! at the transition boundary, logged with context and surfaced as a
//! single typed error.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use command_hub_core::{
    ConfirmPolicy, Error, ExecutionPlan, ExecutionResult, IntentDefinition, Result, RiskLevel,
    SlotMap, SlotValue, UserContext,
};
use command_hub_gateway::ExecutionGateway;
use command_hub_nlu::SlotFiller;

use crate::audit::{AuditLogEntry, LogLevel};
use crate::question::QuestionGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Collecting,
    Ready,
    Executed,
    Aborted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Ready => "ready",
            Self::Executed => "executed",
            Self::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One logical conversation turn sequence. Never deleted by the core;
/// soft archival is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSession {
    pub id: Uuid,
    pub transcript: String,
    pub user: UserContext,
    pub dry_run: bool,
    pub state: SessionState,
    pub intent_key: Option<String>,
    pub slots: SlotMap,
    /// Required slots still unfilled, in schema order. Drives which
    /// question is asked next.
    pub missing_slots: Vec<String>,
    pub risk_level: Option<RiskLevel>,
    pub confidence: Option<f64>,
    pub confirmation_required: bool,
    pub confirmed_by_user: bool,
    pub execution_plan: Option<ExecutionPlan>,
    pub execution_result: Option<ExecutionResult>,
    pub error_message: Option<String>,
    pub next_question: Option<String>,
    pub logs: Vec<AuditLogEntry>,
    pub created_at: DateTime<Utc>,
}

impl DialogueSession {
    fn new(transcript: String, dry_run: bool, user: UserContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript,
            user,
            dry_run,
            state: SessionState::Collecting,
            intent_key: None,
            slots: SlotMap::new(),
            missing_slots: Vec::new(),
            risk_level: None,
            confidence: None,
            confirmation_required: false,
            confirmed_by_user: false,
            execution_plan: None,
            execution_result: None,
            error_message: None,
            next_question: None,
            logs: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>, payload: serde_json::Value) {
        self.logs.push(AuditLogEntry::new(level, message, payload));
    }

    pub fn error_log_count(&self) -> usize {
        self.logs.iter().filter(|e| e.level == LogLevel::Error).count()
    }
}

/// The question the dialogue should ask next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextQuestion {
    pub slot: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Whether medium-risk intents require confirmation under the
    /// threshold policy. High always does, low never does.
    #[serde(default = "default_confirm_medium_risk")]
    pub confirm_medium_risk: bool,
}

fn default_confirm_medium_risk() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confirm_medium_risk: default_confirm_medium_risk(),
        }
    }
}

/// Owns the sessions and drives their transitions.
///
/// Single-session operations are strictly sequential: the store lock is
/// held for the whole transition, so each one runs to completion before
/// the next observes the session.
pub struct SessionManager {
    filler: SlotFiller,
    gateway: ExecutionGateway,
    questions: QuestionGenerator,
    config: SessionConfig,
    sessions: RwLock<HashMap<Uuid, DialogueSession>>,
}

impl SessionManager {
    pub fn new(
        filler: SlotFiller,
        gateway: ExecutionGateway,
        questions: QuestionGenerator,
        config: SessionConfig,
    ) -> Self {
        Self {
            filler,
            gateway,
            questions,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session for one transcript. The transcript is immutable
    /// from here on.
    pub fn create(&self, transcript: impl Into<String>, dry_run: bool, user: UserContext) -> Uuid {
        let mut session = DialogueSession::new(transcript.into(), dry_run, user);
        session.log(
            LogLevel::Info,
            "Session created",
            json!({ "dry_run": dry_run, "user": session.user.login }),
        );
        let id = session.id;
        info!(session = %id, "dialogue session created");
        self.sessions.write().insert(id, session);
        id
    }

    /// Resolve the intent and extract slots from the transcript.
    pub fn parse(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = session_mut(&mut sessions, id)?;
        guard_not_terminal(session, "parse")?;

        match self.filler.parse(&session.transcript) {
            Ok(resolution) => {
                let intent = self.intent(&resolution.intent_key)?;
                session.intent_key = Some(resolution.intent_key.clone());
                session.slots = resolution.slots;
                session.missing_slots = resolution.missing_slots;
                session.risk_level = Some(resolution.risk_level);
                session.confidence = Some(resolution.confidence);
                session.confirmation_required = confirmation_required(&intent, &self.config);
                let parsed = json!({
                    "intent": resolution.intent_key,
                    "confidence": resolution.confidence,
                    "slots": &session.slots,
                    "missing_slots": &session.missing_slots,
                });
                session.log(LogLevel::Info, "Command parsed", parsed);

                if let Some(clarification) = resolution.clarification {
                    session.state = SessionState::Collecting;
                    session.next_question = Some(clarification.question.clone());
                    session.log(
                        LogLevel::Warning,
                        "Validation failed during parse",
                        json!({
                            "error": &clarification.message,
                            "suggestions": &clarification.suggestions,
                        }),
                    );
                    return Err(Error::NeedsClarification {
                        slot: clarification.slot,
                        message: clarification.message,
                        question: clarification.question,
                    });
                }

                if session.missing_slots.is_empty() {
                    session.state = SessionState::Ready;
                    session.next_question = None;
                } else {
                    session.state = SessionState::Collecting;
                    session.next_question =
                        self.question_for(session).map(|q| q.question);
                }
                Ok(())
            }
            Err(err) => {
                session.log(
                    LogLevel::Error,
                    "Parsing failed",
                    json!({ "error": err.to_string() }),
                );
                Err(err)
            }
        }
    }

    /// Merge one slot value; cross-slot semantics are only re-checked
    /// by `parse`, never here.
    pub fn fill_slot(&self, id: Uuid, name: &str, value: SlotValue) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = session_mut(&mut sessions, id)?;
        guard_not_terminal(session, "fill_slot")?;

        session.slots.insert(name.to_string(), value.clone());
        session.missing_slots.retain(|s| s != name);
        session.log(
            LogLevel::Info,
            "Slot filled",
            json!({ "slot": name, "value": value }),
        );

        if session.intent_key.is_some() && session.missing_slots.is_empty() {
            session.state = SessionState::Ready;
            session.next_question = None;
        } else {
            session.next_question = self.question_for(session).map(|q| q.question);
        }
        Ok(())
    }

    /// First missing slot plus its prompt; `None` when nothing is
    /// missing. Pure read.
    pub fn next_question(&self, id: Uuid) -> Result<Option<NextQuestion>> {
        let sessions = self.sessions.read();
        let session = sessions
            .get(&id)
            .ok_or_else(|| Error::session_not_found(id))?;
        let Some(slot) = session.missing_slots.first() else {
            return Ok(None);
        };
        if let Some(stored) = &session.next_question {
            return Ok(Some(NextQuestion {
                slot: slot.clone(),
                question: stored.clone(),
            }));
        }
        Ok(self.question_for(session))
    }

    /// Record the user's explicit confirmation. Does not change state.
    pub fn confirm(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = session_mut(&mut sessions, id)?;
        guard_not_terminal(session, "confirm")?;

        session.confirmed_by_user = true;
        session.log(LogLevel::Info, "User confirmed execution", json!({}));
        Ok(())
    }

    /// Dry-run through the gateway; stores the plan. A failure leaves
    /// the state unchanged.
    pub fn simulate(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = session_mut(&mut sessions, id)?;
        guard_not_terminal(session, "simulate")?;
        let intent_key = session.intent_key.clone().ok_or_else(|| {
            Error::validation("No intent identified. Please parse the command first.")
        })?;

        match self.gateway.simulate(&intent_key, &session.slots, &session.user) {
            Ok(plan) => {
                session.execution_plan = Some(plan.clone());
                session.state = SessionState::Ready;
                session.log(
                    LogLevel::Info,
                    "Simulation completed",
                    serde_json::to_value(&plan).unwrap_or_default(),
                );
                Ok(())
            }
            Err(err) => {
                session.log(
                    LogLevel::Error,
                    "Simulation failed",
                    json!({ "error": err.to_string() }),
                );
                Err(err)
            }
        }
    }

    /// Execute for real. Requires `ready`, and prior confirmation
    /// whenever the derived flag demands it. Success is terminal
    /// (`executed`); failure is terminal too (`aborted`), never a
    /// silent stay in `ready`.
    pub fn execute(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = session_mut(&mut sessions, id)?;
        if session.state != SessionState::Ready {
            return Err(Error::InvalidTransition {
                state: session.state.to_string(),
                action: "execute".to_string(),
            });
        }
        if session.confirmation_required && !session.confirmed_by_user {
            session.log(
                LogLevel::Warning,
                "Execution blocked: confirmation required",
                json!({ "risk_level": session.risk_level }),
            );
            return Err(Error::ConfirmationRequired);
        }
        let intent_key = session.intent_key.clone().ok_or_else(|| {
            Error::validation("No intent identified. Please parse the command first.")
        })?;

        match self.gateway.execute(&intent_key, &session.slots, &session.user) {
            Ok(result) => {
                session.state = SessionState::Executed;
                session.dry_run = false;
                session.execution_result = Some(result.clone());
                session.log(
                    LogLevel::Info,
                    "Execution completed",
                    serde_json::to_value(&result).unwrap_or_default(),
                );
                debug!(session = %id, intent = %intent_key, "session executed");
                Ok(())
            }
            Err(err) => {
                session.state = SessionState::Aborted;
                session.error_message = Some(err.to_string());
                session.log(
                    LogLevel::Error,
                    "Execution failed",
                    json!({ "error": err.to_string() }),
                );
                Err(err)
            }
        }
    }

    /// Abort from any non-terminal state.
    pub fn abort(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = session_mut(&mut sessions, id)?;
        guard_not_terminal(session, "abort")?;

        session.state = SessionState::Aborted;
        session.log(LogLevel::Info, "Session aborted by user", json!({}));
        Ok(())
    }

    /// Read-only projection of the full session.
    pub fn snapshot(&self, id: Uuid) -> Result<DialogueSession> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::session_not_found(id))
    }

    fn intent(&self, key: &str) -> Result<IntentDefinition> {
        self.filler
            .resolver()
            .registry()
            .get(key)
            .ok_or_else(|| Error::IntentNotFound {
                key: key.to_string(),
            })
    }

    fn question_for(&self, session: &DialogueSession) -> Option<NextQuestion> {
        let key = session.intent_key.as_deref()?;
        let intent = self.filler.resolver().registry().get(key)?;
        let slot_name = session.missing_slots.first()?;
        let spec = intent.slot(slot_name)?;
        Some(NextQuestion {
            slot: slot_name.clone(),
            question: self.questions.generate(&intent, spec, &session.transcript),
        })
    }
}

fn session_mut(
    sessions: &mut HashMap<Uuid, DialogueSession>,
    id: Uuid,
) -> Result<&mut DialogueSession> {
    sessions
        .get_mut(&id)
        .ok_or_else(|| Error::session_not_found(id))
}

fn guard_not_terminal(session: &DialogueSession, action: &str) -> Result<()> {
    if session.state.is_terminal() {
        return Err(Error::InvalidTransition {
            state: session.state.to_string(),
            action: action.to_string(),
        });
    }
    Ok(())
}

fn confirmation_required(intent: &IntentDefinition, config: &SessionConfig) -> bool {
    match intent.confirm_policy {
        ConfirmPolicy::Always => true,
        ConfirmPolicy::Never => false,
        ConfirmPolicy::Threshold => match intent.risk_level {
            RiskLevel::High => true,
            RiskLevel::Medium => config.confirm_medium_risk,
            RiskLevel::Low => false,
        },
    }
}
