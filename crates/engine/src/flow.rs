//! Response flow state machine
//!
//! Walks the collection plan turn by turn: prompts for each target, validates
//! replies, escalates on empty or non-matching input, proposes confirmations
//! and reassembles composite answers. Every transition is a pure function
//! from `(FlowState, input)` to a fresh `FlowState`; the `collected` map
//! travels inside the state, so nothing here mutates across calls.
//!
//! Each incoming turn is first classified into a [`TurnDisposition`] from
//! `(current step, target kind, sub or main, input)` and then dispatched,
//! keeping the branching auditable. The one non-advancing outcome,
//! [`TurnDisposition::Stuck`], is explicit and logged instead of being a
//! silent fallthrough.

use ddt_sim_core::{ChatMessage, DdtNode, Error, FlowState, Result, StepType, TranslationMap};
use ddt_sim_text::{parse_address, parse_date_parts, split_name, validate, Kind};

use crate::plan::{build_plan, CompositeKind, Plan, PlanEntry, SubRole};
use crate::resolver::TextResolver;

/// Tunables of the flow machine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Escalation ceiling for repeated noInput/noMatch on one target
    pub max_escalation_level: u8,
    /// Literal input that forces a noMatch, kept as a scripted-demo hook
    pub no_match_sentinel: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_escalation_level: 3,
            no_match_sentinel: "xxxx".to_string(),
        }
    }
}

/// Classification of one user turn against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDisposition {
    /// Nothing left after trimming
    EmptyInput,
    /// The forced-noMatch sentinel
    SentinelNoMatch,
    /// Reply failed validation for the target's kind
    InvalidInput,
    /// Reply aimed at a date main: parse parts, route to missing subs
    DatePartial,
    /// Reply aimed at a date sub-field: accepted verbatim
    DateSubAnswer,
    /// Plain field reply, to be proposed for confirmation
    PlainAnswer,
    /// Any reply while a confirmation is pending counts as acceptance
    ConfirmationReply,
    /// No transition applies; the state is returned unchanged
    Stuck,
}

/// The response flow simulation engine.
///
/// One instance per simulation session. The instance itself only holds the
/// plan, the resolver and configuration; conversation truth lives in the
/// [`FlowState`] values it hands out.
#[derive(Debug)]
pub struct FlowEngine {
    root: DdtNode,
    plan: Plan,
    resolver: TextResolver,
    config: EngineConfig,
    debug: bool,
}

impl FlowEngine {
    /// Build an engine for a template root and merged translations.
    pub fn new(root: DdtNode, translations: TranslationMap) -> Self {
        let plan = build_plan(&root);
        tracing::debug!(targets = plan.len(), "collection plan built");
        Self {
            root,
            plan,
            resolver: TextResolver::new(translations),
            config: EngineConfig::default(),
            debug: false,
        }
    }

    /// Build with custom configuration.
    pub fn with_config(root: DdtNode, translations: TranslationMap, config: EngineConfig) -> Self {
        let mut engine = Self::new(root, translations);
        engine.config = config;
        engine
    }

    /// Strict loader for editor output: rejects templates that deserialize
    /// but yield nothing to collect.
    pub fn from_json(template: &str, translation_sources: &[serde_json::Value]) -> Result<Self> {
        let root = DdtNode::from_json(template)?;
        let engine = Self::new(root, TranslationMap::from_sources(translation_sources));
        if engine.plan.is_empty() {
            return Err(Error::EmptyTemplate);
        }
        Ok(engine)
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Swap the simulated template; the caller restarts with `start()`.
    pub fn set_selected_node(&mut self, root: DdtNode) {
        self.plan = build_plan(&root);
        self.root = root;
        tracing::debug!(targets = self.plan.len(), "selected node changed, plan rebuilt");
    }

    /// Raise per-turn diagnostics from debug to info level.
    pub fn set_debug(&mut self, verbose: bool) {
        self.debug = verbose;
    }

    /// Initial state: the start prompt for the first plan target.
    pub fn start(&self) -> FlowState {
        let mut state = FlowState::initial();
        let Some(entry) = self.plan.get(0) else {
            tracing::warn!("collection plan is empty, nothing to simulate");
            state.completed = true;
            state.waiting_for_input = false;
            return state;
        };
        let text = self.prompt_text(entry, StepType::Start, 1, None);
        state.messages.push(ChatMessage::bot(text, StepType::Start, 1));
        state
    }

    /// Process one user turn, producing the next state.
    ///
    /// Never fails: malformed input escalates, unmapped situations return
    /// the input state unchanged (and log).
    pub fn process_input(&self, state: &FlowState, input: &str) -> FlowState {
        let disposition = self.classify(state, input);
        self.log_turn(state, input, disposition);
        match disposition {
            TurnDisposition::Stuck => state.clone(),
            TurnDisposition::EmptyInput => self.escalate(state, input, StepType::NoInput),
            TurnDisposition::SentinelNoMatch | TurnDisposition::InvalidInput => {
                self.escalate(state, input, StepType::NoMatch)
            },
            TurnDisposition::DatePartial => self.collect_date_main(state, input),
            TurnDisposition::DateSubAnswer => self.collect_date_sub(state, input),
            TurnDisposition::PlainAnswer => self.propose(state, input),
            TurnDisposition::ConfirmationReply => self.confirm(state, input),
        }
    }

    /// Map a turn to its disposition without applying it.
    pub fn classify(&self, state: &FlowState, input: &str) -> TurnDisposition {
        if state.completed || state.planner_index >= self.plan.len() {
            return TurnDisposition::Stuck;
        }
        let Some(entry) = self.plan.get(state.planner_index) else {
            return TurnDisposition::Stuck;
        };
        match state.current_step {
            StepType::Confirmation => TurnDisposition::ConfirmationReply,
            StepType::Success => TurnDisposition::Stuck,
            StepType::Start | StepType::NoInput | StepType::NoMatch => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    TurnDisposition::EmptyInput
                } else if trimmed.eq_ignore_ascii_case(&self.config.no_match_sentinel) {
                    TurnDisposition::SentinelNoMatch
                } else if self.is_date_main(entry) {
                    TurnDisposition::DatePartial
                } else if self.is_date_sub(entry) {
                    TurnDisposition::DateSubAnswer
                } else if !validate(entry.kind, trimmed) {
                    TurnDisposition::InvalidInput
                } else {
                    TurnDisposition::PlainAnswer
                }
            },
        }
    }

    fn is_date_main(&self, entry: &PlanEntry) -> bool {
        entry.sub_index.is_none() && self.plan.composite(entry.main_index) == Some(CompositeKind::Date)
    }

    fn is_date_sub(&self, entry: &PlanEntry) -> bool {
        entry.sub_index.is_some() && self.plan.composite(entry.main_index) == Some(CompositeKind::Date)
    }

    /// Re-prompt the same target one escalation level up (capped).
    fn escalate(&self, state: &FlowState, input: &str, step: StepType) -> FlowState {
        let Some(entry) = self.plan.get(state.planner_index) else {
            return state.clone();
        };
        let mut next = state.clone();
        push_user(&mut next, input);
        next.current_step = step;
        next.escalation_level =
            (state.escalation_level + 1).min(self.config.max_escalation_level);
        next.user_input = None;
        let text = self.prompt_text(entry, step, next.escalation_level, None);
        next.messages
            .push(ChatMessage::bot(text, step, next.escalation_level));
        next.waiting_for_input = true;
        next
    }

    /// One utterance aimed at a date main: extract whatever parts it holds,
    /// then route to the first still-missing sub or straight to confirmation
    /// of the assembled date.
    fn collect_date_main(&self, state: &FlowState, input: &str) -> FlowState {
        let Some(entry) = self.plan.get(state.planner_index) else {
            return state.clone();
        };
        let main_index = entry.main_index;
        let mut next = state.clone();
        push_user(&mut next, input);

        let parts = parse_date_parts(input);
        for (index, sub) in self.plan.subs_of_main(main_index) {
            let value = match sub.role {
                Some(SubRole::Day) => parts.day.map(|d| d.to_string()),
                Some(SubRole::Month) => parts.month.map(|m| m.to_string()),
                Some(SubRole::Year) => parts.year.map(|y| y.to_string()),
                _ => None,
            };
            if let Some(value) = value {
                next.collected.insert(index, value);
            }
        }
        self.advance_date_group(next, main_index)
    }

    /// A date sub-field answer is accepted verbatim, no per-sub confirmation.
    fn collect_date_sub(&self, state: &FlowState, input: &str) -> FlowState {
        let Some(entry) = self.plan.get(state.planner_index) else {
            return state.clone();
        };
        let mut next = state.clone();
        push_user(&mut next, input);
        next.collected
            .insert(state.planner_index, input.trim().to_string());
        self.advance_date_group(next, entry.main_index)
    }

    /// Route within a date group: prompt the first missing part, or assemble
    /// the full date and move to confirmation of the main.
    fn advance_date_group(&self, mut next: FlowState, main_index: usize) -> FlowState {
        if let Some(sub_plan_index) = self.plan.first_missing_sub(main_index, &next.collected) {
            let Some(sub) = self.plan.get(sub_plan_index) else {
                return next;
            };
            next.planner_index = sub_plan_index;
            next.current_step = StepType::Start;
            next.escalation_level = 1;
            next.user_input = None;
            let text = self.prompt_text(sub, StepType::Start, 1, None);
            next.messages.push(ChatMessage::bot(text, StepType::Start, 1));
            next.waiting_for_input = true;
            return next;
        }

        let assembled = self.plan.assemble_date(main_index, &next.collected);
        let main_plan_index = self.plan.main_entry_index(main_index);
        let (Some(iso), Some(main_plan_index)) = (assembled, main_plan_index) else {
            // Degenerate template (e.g. no year sub-field configured)
            tracing::warn!(main_index, "date group has no missing parts but cannot be assembled");
            return next;
        };
        let Some(entry) = self.plan.get(main_plan_index) else {
            return next;
        };
        next.planner_index = main_plan_index;
        next.current_step = StepType::Confirmation;
        next.escalation_level = 1;
        next.user_input = Some(iso.clone());
        let text = self.prompt_text(entry, StepType::Confirmation, 1, Some(&iso));
        next.messages
            .push(ChatMessage::bot(text, StepType::Confirmation, 1));
        next.waiting_for_input = true;
        next
    }

    /// Plain field reply: propose the raw value for confirmation.
    fn propose(&self, state: &FlowState, input: &str) -> FlowState {
        let Some(entry) = self.plan.get(state.planner_index) else {
            return state.clone();
        };
        let mut next = state.clone();
        push_user(&mut next, input);
        let proposed = input.trim().to_string();
        next.user_input = Some(proposed.clone());
        next.current_step = StepType::Confirmation;
        next.escalation_level = 1;
        let text = self.prompt_text(entry, StepType::Confirmation, 1, Some(&proposed));
        next.messages
            .push(ChatMessage::bot(text, StepType::Confirmation, 1));
        next.waiting_for_input = true;
        next
    }

    /// Any reply during confirmation accepts the proposed value. The value
    /// recorded is the one originally proposed, not the confirmation
    /// utterance itself.
    fn confirm(&self, state: &FlowState, input: &str) -> FlowState {
        let index = state.planner_index;
        let Some(entry) = self.plan.get(index) else {
            return state.clone();
        };
        let mut next = state.clone();
        push_user(&mut next, input);
        let value = state
            .user_input
            .clone()
            .unwrap_or_else(|| input.trim().to_string());
        next.collected.insert(index, value.clone());
        next.user_input = None;

        // A confirmed date sub-field routes onward through its group. Not
        // played in the normal flow (date subs skip confirmation) but kept
        // so a hand-built state cannot derail the walk.
        if entry.sub_index.is_some()
            && self.plan.composite(entry.main_index) == Some(CompositeKind::Date)
        {
            return self.advance_date_group(next, entry.main_index);
        }

        let next_index = if entry.sub_index.is_none() {
            match self.plan.composite(entry.main_index) {
                Some(CompositeKind::Date) => self.plan.next_main_start(entry.main_index),
                Some(CompositeKind::Name) => {
                    self.populate_name_subs(&mut next, entry.main_index, &value);
                    self.plan.next_main_start(entry.main_index)
                },
                Some(CompositeKind::Address) => {
                    self.populate_address_subs(&mut next, entry.main_index, &value);
                    self.plan.next_main_start(entry.main_index)
                },
                None => index + 1,
            }
        } else {
            index + 1
        };

        self.finish_target(next, entry, &value, next_index)
    }

    /// Emit the success acknowledgement and either complete the run or move
    /// to the next target's start prompt.
    fn finish_target(
        &self,
        mut next: FlowState,
        entry: &PlanEntry,
        value: &str,
        next_index: usize,
    ) -> FlowState {
        let text = self.prompt_text(entry, StepType::Success, 1, Some(value));
        next.messages
            .push(ChatMessage::bot(text, StepType::Success, 1));

        if next_index >= self.plan.len() {
            next.planner_index = self.plan.len();
            next.current_step = StepType::Success;
            next.completed = true;
            next.waiting_for_input = false;
            return next;
        }
        let Some(target) = self.plan.get(next_index) else {
            return next;
        };
        next.planner_index = next_index;
        next.current_step = StepType::Start;
        next.escalation_level = 1;
        let text = self.prompt_text(target, StepType::Start, 1, None);
        next.messages.push(ChatMessage::bot(text, StepType::Start, 1));
        next.waiting_for_input = true;
        next
    }

    /// Fill a name main's sub-entries from the confirmed value.
    fn populate_name_subs(&self, next: &mut FlowState, main_index: usize, value: &str) {
        let parts = split_name(value);
        for (index, sub) in self.plan.subs_of_main(main_index) {
            let part = match sub.role {
                Some(SubRole::FirstName) if !parts.first.is_empty() => parts.first.clone(),
                Some(SubRole::LastName) if !parts.last.is_empty() => parts.last.clone(),
                // Unmatched siblings receive the raw input
                _ => value.to_string(),
            };
            next.collected.insert(index, part);
        }
    }

    /// Fill an address main's sub-entries from the confirmed value.
    fn populate_address_subs(&self, next: &mut FlowState, main_index: usize, value: &str) {
        let parts = parse_address(value);
        for (index, sub) in self.plan.subs_of_main(main_index) {
            let part = match sub.role {
                Some(SubRole::Street) => parts.street.clone(),
                Some(SubRole::City) => parts.city.clone(),
                Some(SubRole::PostalCode) => parts.postal_code.clone(),
                Some(SubRole::State) => parts.state.clone(),
                Some(SubRole::Country) => parts.country.clone(),
                _ => None,
            };
            next.collected
                .insert(index, part.unwrap_or_else(|| value.to_string()));
        }
    }

    fn prompt_text(
        &self,
        entry: &PlanEntry,
        step: StepType,
        level: u8,
        input: Option<&str>,
    ) -> String {
        self.resolver
            .resolve(self.node_for(entry), &entry.label, step, level, input)
            .unwrap_or_else(|| format!("[{step}]"))
    }

    fn node_for(&self, entry: &PlanEntry) -> Option<&DdtNode> {
        let main = self.root.sub_data.get(entry.main_index)?;
        match entry.sub_index {
            None => Some(main),
            Some(sub_index) => main.sub_data.get(sub_index),
        }
    }

    fn log_turn(&self, state: &FlowState, input: &str, disposition: TurnDisposition) {
        if disposition == TurnDisposition::Stuck {
            tracing::warn!(
                planner_index = state.planner_index,
                step = %state.current_step,
                completed = state.completed,
                "no transition applies, returning state unchanged"
            );
            return;
        }
        let kind = self
            .plan
            .get(state.planner_index)
            .map(|e| e.kind)
            .unwrap_or(Kind::Generic);
        if self.debug {
            tracing::info!(
                ?disposition,
                planner_index = state.planner_index,
                step = %state.current_step,
                level = state.escalation_level,
                %kind,
                input_chars = input.trim().len(),
                "processing turn"
            );
        } else {
            tracing::debug!(
                ?disposition,
                planner_index = state.planner_index,
                step = %state.current_step,
                level = state.escalation_level,
                %kind,
                input_chars = input.trim().len(),
                "processing turn"
            );
        }
    }
}

/// Append the user's message unless the turn was empty.
fn push_user(state: &mut FlowState, input: &str) {
    let trimmed = input.trim();
    if !trimmed.is_empty() {
        state.messages.push(ChatMessage::user(trimmed));
    }
}
