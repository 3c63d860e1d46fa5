//! Response flow simulation engine for Dialogue Data Templates
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FlowEngine                           │
//! │  start() / process_input(state, text) -> FlowState          │
//! └─────────────────────────────────────────────────────────────┘
//!          │                  │                     │
//!          ▼                  ▼                     ▼
//! ┌────────────────┐ ┌─────────────────┐ ┌────────────────────┐
//! │      Plan      │ │  TextResolver   │ │  ddt-sim-text      │
//! │  ordered       │ │  configured     │ │  validators and    │
//! │  collection    │ │  prompts with   │ │  composite         │
//! │  targets       │ │  templated      │ │  decomposers       │
//! │                │ │  fallbacks      │ │                    │
//! └────────────────┘ └─────────────────┘ └────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use ddt_sim_engine::FlowEngine;
//!
//! let engine = FlowEngine::from_json(&template_json, &translation_sources)?;
//! let mut state = engine.start();
//! for reply in user_replies {
//!     state = engine.process_input(&state, reply);
//! }
//! ```

pub mod flow;
pub mod plan;
pub mod resolver;

pub use flow::{EngineConfig, FlowEngine, TurnDisposition};
pub use plan::{build_plan, CompositeKind, Plan, PlanEntry, SubRole};
pub use resolver::TextResolver;

// Shared types re-exported for consumers that only depend on this crate
pub use ddt_sim_core::{ChatMessage, DdtNode, FlowState, Sender, StepType, TranslationMap};
pub use ddt_sim_text::Kind;
