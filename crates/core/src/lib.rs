//! Core types for the DDT response flow simulator
//!
//! This crate provides the types shared by the text-analysis and engine
//! crates:
//! - The DDT node tree as serialized by the external template editor
//! - The merged translation dictionary (GUID -> localized text)
//! - Conversation state types (`StepType`, `ChatMessage`, `FlowState`)
//! - Error types

pub mod error;
pub mod node;
pub mod state;
pub mod translation;

pub use error::{Error, Result};
pub use node::{Action, ActionParameter, DdtNode, Escalation, Step, StepBody, Steps};
pub use state::{ChatMessage, FlowState, Sender, StepType};
pub use translation::TranslationMap;
