//! DDT node tree types
//!
//! These mirror the JSON produced by the external template editor. A template
//! is a root node whose `subData` entries are the main fields; each main may
//! carry its own `subData` (e.g. a date of birth decomposed into day, month
//! and year). Steps arrive in one of two shapes depending on editor version:
//! an array of `{type, escalations}` objects or an object keyed by step type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::state::StepType;

/// One node of a Dialogue Data Template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdtNode {
    /// Node identifier assigned by the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display label of the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Internal name, used when no label is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sub-fields (main fields on the root, decomposed parts on a main)
    #[serde(default, rename = "subData", skip_serializing_if = "Vec::is_empty")]
    pub sub_data: Vec<DdtNode>,
    /// Configured steps with their escalations
    #[serde(default)]
    pub steps: Steps,
}

impl DdtNode {
    /// Label shown to the user: `label`, falling back to `name`.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }

    /// Whether this node has anything to collect: at least one step whose
    /// escalation ladder is non-empty.
    pub fn has_usable_steps(&self) -> bool {
        match &self.steps {
            Steps::List(steps) => steps.iter().any(|s| !s.escalations.is_empty()),
            Steps::Map(steps) => steps.values().any(|s| !s.escalations.is_empty()),
        }
    }

    /// Parse a node tree from editor JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Step container, tolerant of both editor serializations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Steps {
    /// `steps: [{type: "start", escalations: [...]}, ...]`
    List(Vec<Step>),
    /// `steps: {start: {escalations: [...]}, ...}`
    Map(HashMap<String, StepBody>),
}

impl Default for Steps {
    fn default() -> Self {
        Steps::List(Vec::new())
    }
}

impl Steps {
    pub fn is_empty(&self) -> bool {
        match self {
            Steps::List(steps) => steps.is_empty(),
            Steps::Map(steps) => steps.is_empty(),
        }
    }

    /// Escalation ladder configured for a step type, if any.
    pub fn escalations_for(&self, step_type: StepType) -> Option<&[Escalation]> {
        match self {
            Steps::List(steps) => steps
                .iter()
                .find(|s| s.step_type == step_type)
                .map(|s| s.escalations.as_slice()),
            Steps::Map(steps) => steps
                .get(step_type.as_str())
                .map(|s| s.escalations.as_slice()),
        }
    }
}

/// A step in array form, carrying its own type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(default)]
    pub escalations: Vec<Escalation>,
}

/// A step in object form (the type is the map key).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepBody {
    #[serde(default)]
    pub escalations: Vec<Escalation>,
}

/// One escalation level: the actions played when this level is reached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Escalation {
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A scripted action attached to an escalation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, rename = "actionId", skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
}

impl Action {
    /// The translation key of this action's `text` parameter, if present.
    pub fn text_key(&self) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.parameter_id == "text")
            .and_then(|p| p.value.as_str())
    }
}

/// A single action parameter (`parameterId`/`value` pair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionParameter {
    #[serde(rename = "parameterId")]
    pub parameter_id: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_array_form() {
        let json = r#"{
            "label": "Email",
            "steps": [
                {"type": "start", "escalations": [{"actions": [{"actionId": "a1",
                    "parameters": [{"parameterId": "text", "value": "guid-1"}]}]}]}
            ]
        }"#;
        let node = DdtNode::from_json(json).unwrap();
        assert!(node.has_usable_steps());
        let escalations = node.steps.escalations_for(StepType::Start).unwrap();
        assert_eq!(escalations.len(), 1);
        assert_eq!(escalations[0].actions[0].text_key(), Some("guid-1"));
        assert!(node.steps.escalations_for(StepType::NoMatch).is_none());
    }

    #[test]
    fn test_steps_object_form() {
        let json = r#"{
            "name": "phone",
            "steps": {
                "start": {"escalations": [{"actions": []}]},
                "noInput": {"escalations": [{"actions": []}, {"actions": []}]}
            }
        }"#;
        let node = DdtNode::from_json(json).unwrap();
        assert_eq!(node.display_label(), "phone");
        assert_eq!(
            node.steps.escalations_for(StepType::NoInput).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_node_without_steps() {
        let node = DdtNode::from_json(r#"{"label": "Notes"}"#).unwrap();
        assert!(!node.has_usable_steps());
        assert!(node.steps.escalations_for(StepType::Start).is_none());
    }

    #[test]
    fn test_step_without_escalations_is_not_usable() {
        let node = DdtNode::from_json(
            r#"{"label": "Email", "steps": [{"type": "start", "escalations": []}]}"#,
        )
        .unwrap();
        assert!(!node.steps.is_empty());
        assert!(!node.has_usable_steps());
    }

    #[test]
    fn test_label_fallback() {
        let node = DdtNode {
            name: Some("birth_date".into()),
            ..Default::default()
        };
        assert_eq!(node.display_label(), "birth_date");
        assert_eq!(DdtNode::default().display_label(), "");
    }
}
