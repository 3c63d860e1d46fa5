//! Step text resolution
//!
//! Configured prompts live on the template nodes as escalation actions whose
//! `text` parameter points into the translation dictionary. When nothing is
//! configured the resolver falls back to templated phrasing built from the
//! field label, so an unfinished template still simulates end to end.

use ddt_sim_core::{DdtNode, StepType, TranslationMap};

/// Resolves the bot line for a (node, step, escalation level) triple.
#[derive(Debug, Clone, Default)]
pub struct TextResolver {
    translations: TranslationMap,
}

impl TextResolver {
    pub fn new(translations: TranslationMap) -> Self {
        Self { translations }
    }

    pub fn translations(&self) -> &TranslationMap {
        &self.translations
    }

    /// Resolve the text for a step at an escalation level.
    ///
    /// `context_input` is the value under discussion, used by the
    /// confirmation template. Returns `None` only when nothing is configured
    /// and the label is empty; callers substitute a bracketed placeholder.
    pub fn resolve(
        &self,
        node: Option<&DdtNode>,
        label: &str,
        step_type: StepType,
        level: u8,
        context_input: Option<&str>,
    ) -> Option<String> {
        if let Some(text) = node.and_then(|n| self.configured_text(n, step_type, level)) {
            return Some(text);
        }
        self.fallback_text(label, step_type, context_input)
    }

    /// First non-empty translated action text at the requested level.
    /// A level beyond the configured ladder clamps to the last rung.
    fn configured_text(&self, node: &DdtNode, step_type: StepType, level: u8) -> Option<String> {
        let escalations = node.steps.escalations_for(step_type)?;
        if escalations.is_empty() {
            return None;
        }
        let index = (level.max(1) as usize - 1).min(escalations.len() - 1);
        for action in &escalations[index].actions {
            let Some(key) = action.text_key() else { continue };
            if let Some(text) = self.translations.resolve(key) {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
        None
    }

    fn fallback_text(
        &self,
        label: &str,
        step_type: StepType,
        context_input: Option<&str>,
    ) -> Option<String> {
        let label = label.trim();
        if label.is_empty() {
            tracing::debug!(step = %step_type, "no configured text and empty label");
            return None;
        }
        let text = match step_type {
            StepType::Start | StepType::NoInput | StepType::NoMatch => {
                format!("Please provide {label}.")
            },
            StepType::Confirmation => {
                format!(
                    "Is this correct for {label}: {}?",
                    context_input.unwrap_or_default()
                )
            },
            StepType::Success => format!("Thank you for providing your {label}."),
        };
        Some(text)
    }
}
