//! Conversation state types for the flow simulator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Step of the collection dialogue currently being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StepType {
    /// Initial prompt for a field
    #[default]
    Start,
    /// User sent nothing
    NoInput,
    /// User reply did not match the expected value
    NoMatch,
    /// Proposed value awaiting user acceptance
    Confirmation,
    /// Value accepted, acknowledgement played
    Success,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Start => "start",
            StepType::NoInput => "noInput",
            StepType::NoMatch => "noMatch",
            StepType::Confirmation => "confirmation",
            StepType::Success => "success",
        }
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Bot,
    User,
}

/// One rendered message of the simulated conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Step the bot was playing when it produced this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_type: Option<StepType>,
    /// Escalation level in effect for this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_level: Option<u8>,
}

impl ChatMessage {
    /// Create a bot message annotated with its step and escalation level.
    pub fn bot(text: impl Into<String>, step_type: StepType, escalation_level: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Bot,
            text: text.into(),
            timestamp: Utc::now(),
            step_type: Some(step_type),
            escalation_level: Some(escalation_level),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
            step_type: None,
            escalation_level: None,
        }
    }
}

/// Immutable snapshot of a running simulation.
///
/// Every transition produces a fresh value; the UI owns the current
/// reference and the engine never mutates a state it handed out. The
/// `collected` map travels inside the state, so replaying the same inputs
/// against the same engine yields identical snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    /// Step being played for the current plan target
    pub current_step: StepType,
    /// Retry counter for the current target, 1..=3
    pub escalation_level: u8,
    /// Append-only transcript, never truncated or reordered
    pub messages: Vec<ChatMessage>,
    /// Whether the UI should accept a new reply
    pub waiting_for_input: bool,
    /// True once every plan entry has a confirmed value
    pub completed: bool,
    /// Value proposed to the user, pending confirmation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
    /// Cursor into the collection plan; equals plan length only when completed
    pub planner_index: usize,
    /// Confirmed values keyed by plan index; grows monotonically
    pub collected: BTreeMap<usize, String>,
}

impl FlowState {
    /// Fresh state positioned at the first plan entry.
    pub fn initial() -> Self {
        Self {
            current_step: StepType::Start,
            escalation_level: 1,
            messages: Vec::new(),
            waiting_for_input: true,
            completed: false,
            user_input: None,
            planner_index: 0,
            collected: BTreeMap::new(),
        }
    }

    /// Last bot message, if any.
    pub fn last_bot_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.sender == Sender::Bot)
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::initial()
    }
}
