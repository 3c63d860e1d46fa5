//! Collection plan
//!
//! Flattens the hierarchical template into the ordered list of atomic
//! collection targets the flow machine walks: mains in template order, each
//! main's usable sub-fields immediately after it. Kind and sub-field role
//! are derived from labels once here, never re-derived during the
//! conversation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ddt_sim_core::DdtNode;
use ddt_sim_text::{parse_day, parse_month, parse_year, Kind};

/// Role of a sub-field within its composite group, derived from its label.
///
/// `Other` keeps the fallback behavior: such entries receive the raw
/// composite answer instead of a decomposed part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubRole {
    Day,
    Month,
    Year,
    FirstName,
    LastName,
    Street,
    City,
    PostalCode,
    State,
    Country,
    Other,
}

/// Bilingual label patterns, checked in order. LastName before FirstName so
/// that "cognome" is not swallowed by the "nome" pattern.
static ROLE_PATTERNS: Lazy<Vec<(Regex, SubRole)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)day|giorno").unwrap(), SubRole::Day),
        (Regex::new(r"(?i)month|mese").unwrap(), SubRole::Month),
        (Regex::new(r"(?i)year|anno").unwrap(), SubRole::Year),
        (Regex::new(r"(?i)last|surname|cognome").unwrap(), SubRole::LastName),
        (Regex::new(r"(?i)first|nome").unwrap(), SubRole::FirstName),
        (Regex::new(r"(?i)street|via|address").unwrap(), SubRole::Street),
        (Regex::new(r"(?i)city|citt[aà]").unwrap(), SubRole::City),
        (Regex::new(r"(?i)zip|postal|cap\b").unwrap(), SubRole::PostalCode),
        (Regex::new(r"(?i)state|provincia").unwrap(), SubRole::State),
        (Regex::new(r"(?i)country|paese|nazione").unwrap(), SubRole::Country),
    ]
});

impl SubRole {
    /// Derive the role from a sub-field label.
    pub fn infer(label: &str) -> Self {
        for (pattern, role) in ROLE_PATTERNS.iter() {
            if pattern.is_match(label) {
                return *role;
            }
        }
        SubRole::Other
    }

    pub fn is_date_part(&self) -> bool {
        matches!(self, SubRole::Day | SubRole::Month | SubRole::Year)
    }

    pub fn is_address_part(&self) -> bool {
        matches!(
            self,
            SubRole::Street
                | SubRole::City
                | SubRole::PostalCode
                | SubRole::State
                | SubRole::Country
        )
    }
}

/// Composite classification of a main field, derived from its sub-fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Date,
    Name,
    Address,
}

/// One atomic value to collect: a main field or one of its sub-fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Position of the owning main field in the template
    pub main_index: usize,
    /// Position among the main's sub-fields; `None` for the main itself
    pub sub_index: Option<usize>,
    /// Display label used for prompts and fallback phrasing
    pub label: String,
    /// Expected semantic kind, inferred from the label
    pub kind: Kind,
    /// Sub-field role within its composite group; `None` for mains
    pub role: Option<SubRole>,
}

impl PlanEntry {
    pub fn is_sub(&self) -> bool {
        self.sub_index.is_some()
    }
}

/// The flattened, ordered plan plus per-main composite classification.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    entries: Vec<PlanEntry>,
    composites: BTreeMap<usize, CompositeKind>,
}

/// Build the plan for a template root. The root's `subData` are the main
/// fields; nodes without a usable step (one with a non-empty escalation
/// ladder) contribute nothing to collect and are omitted together with
/// their sub-fields.
pub fn build_plan(root: &DdtNode) -> Plan {
    let mut entries = Vec::new();
    let mut composites = BTreeMap::new();

    for (main_index, main) in root.sub_data.iter().enumerate() {
        if !main.has_usable_steps() {
            tracing::debug!(main_index, label = main.display_label(), "skipping unusable field");
            continue;
        }
        let main_kind = Kind::infer(main.display_label());
        entries.push(PlanEntry {
            main_index,
            sub_index: None,
            label: main.display_label().to_string(),
            kind: main_kind,
            role: None,
        });

        let mut roles = Vec::new();
        for (sub_index, sub) in main.sub_data.iter().enumerate() {
            if !sub.has_usable_steps() {
                continue;
            }
            let role = SubRole::infer(sub.display_label());
            roles.push(role);
            entries.push(PlanEntry {
                main_index,
                sub_index: Some(sub_index),
                label: sub.display_label().to_string(),
                kind: Kind::infer(sub.display_label()),
                role: Some(role),
            });
        }

        if let Some(composite) = classify_composite(main_kind, &roles) {
            composites.insert(main_index, composite);
        }
    }

    Plan { entries, composites }
}

fn classify_composite(main_kind: Kind, sub_roles: &[SubRole]) -> Option<CompositeKind> {
    if sub_roles.is_empty() {
        return None;
    }
    if sub_roles.iter().any(SubRole::is_date_part) {
        return Some(CompositeKind::Date);
    }
    if main_kind == Kind::Name
        || sub_roles
            .iter()
            .any(|r| matches!(r, SubRole::FirstName | SubRole::LastName))
    {
        return Some(CompositeKind::Name);
    }
    if sub_roles.iter().any(SubRole::is_address_part) {
        return Some(CompositeKind::Address);
    }
    None
}

impl Plan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlanEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Composite classification of a main, if its sub-fields form a group.
    pub fn composite(&self, main_index: usize) -> Option<CompositeKind> {
        self.composites.get(&main_index).copied()
    }

    /// Plan index of the main-level entry for a main field.
    pub fn main_entry_index(&self, main_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.main_index == main_index && e.sub_index.is_none())
    }

    /// Sub-entries of a main, as (plan index, entry) pairs in plan order.
    pub fn subs_of_main(&self, main_index: usize) -> impl Iterator<Item = (usize, &PlanEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.main_index == main_index && e.sub_index.is_some())
    }

    /// First plan index past a main field and all of its sub-entries.
    pub fn next_main_start(&self, main_index: usize) -> usize {
        self.entries
            .iter()
            .position(|e| e.main_index > main_index)
            .unwrap_or(self.entries.len())
    }

    /// First sub-entry of a main still lacking a usable collected value.
    ///
    /// For date parts "usable" means the stored string actually parses as
    /// the part its role names, so a garbled day answer is re-prompted even
    /// though a value was stored for it.
    pub fn first_missing_sub(
        &self,
        main_index: usize,
        collected: &BTreeMap<usize, String>,
    ) -> Option<usize> {
        self.subs_of_main(main_index)
            .find(|(index, entry)| match collected.get(index) {
                None => true,
                Some(value) => !part_is_usable(entry.role, value),
            })
            .map(|(index, _)| index)
    }

    /// Assemble the ISO date for a main from its collected parts.
    /// `None` while any of day/month/year is missing or unparsable.
    pub fn assemble_date(
        &self,
        main_index: usize,
        collected: &BTreeMap<usize, String>,
    ) -> Option<String> {
        let mut parts = ddt_sim_text::DateParts::default();
        for (index, entry) in self.subs_of_main(main_index) {
            let Some(value) = collected.get(&index) else { continue };
            match entry.role {
                Some(SubRole::Day) => parts.day = parse_day(value),
                Some(SubRole::Month) => parts.month = parse_month(value),
                Some(SubRole::Year) => parts.year = parse_year(value),
                _ => {},
            }
        }
        parts.to_iso()
    }
}

fn part_is_usable(role: Option<SubRole>, value: &str) -> bool {
    match role {
        Some(SubRole::Day) => parse_day(value).is_some(),
        Some(SubRole::Month) => parse_month(value).is_some(),
        Some(SubRole::Year) => parse_year(value).is_some(),
        _ => !value.trim().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddt_sim_core::DdtNode;

    fn template(json: &str) -> DdtNode {
        DdtNode::from_json(json).unwrap()
    }

    const STEPS: &str = r#"[{"type": "start", "escalations": [{"actions": []}]}]"#;

    fn field(label: &str, subs: &[&str]) -> String {
        let subs = subs
            .iter()
            .map(|s| format!(r#"{{"label": "{s}", "steps": {STEPS}}}"#))
            .collect::<Vec<_>>()
            .join(",");
        format!(r#"{{"label": "{label}", "steps": {STEPS}, "subData": [{subs}]}}"#)
    }

    #[test]
    fn test_plan_ordering_and_roles() {
        let json = format!(
            r#"{{"label": "root", "subData": [{}, {}]}}"#,
            field("Date of Birth", &["Day", "Month", "Year"]),
            field("Email", &[]),
        );
        let plan = build_plan(&template(&json));

        assert_eq!(plan.len(), 5);
        assert_eq!(plan.get(0).unwrap().sub_index, None);
        assert_eq!(plan.get(0).unwrap().kind, Kind::Date);
        assert_eq!(plan.get(1).unwrap().role, Some(SubRole::Day));
        assert_eq!(plan.get(2).unwrap().role, Some(SubRole::Month));
        assert_eq!(plan.get(3).unwrap().role, Some(SubRole::Year));
        assert_eq!(plan.get(4).unwrap().kind, Kind::Email);
        assert_eq!(plan.composite(0), Some(CompositeKind::Date));
        assert_eq!(plan.composite(1), None);
        assert_eq!(plan.next_main_start(0), 4);
    }

    #[test]
    fn test_unusable_fields_omitted() {
        let json = format!(
            r#"{{"subData": [
                {{"label": "Notes"}},
                {{"label": "Fax", "steps": [{{"type": "start", "escalations": []}}]}},
                {{"label": "Email", "steps": {STEPS}}}
            ]}}"#
        );
        let plan = build_plan(&template(&json));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.get(0).unwrap().label, "Email");
        // Original template position is preserved
        assert_eq!(plan.get(0).unwrap().main_index, 2);
    }

    #[test]
    fn test_role_inference_bilingual() {
        assert_eq!(SubRole::infer("Giorno"), SubRole::Day);
        assert_eq!(SubRole::infer("Mese"), SubRole::Month);
        assert_eq!(SubRole::infer("Anno di nascita"), SubRole::Year);
        assert_eq!(SubRole::infer("Cognome"), SubRole::LastName);
        assert_eq!(SubRole::infer("Nome"), SubRole::FirstName);
        assert_eq!(SubRole::infer("First name"), SubRole::FirstName);
        assert_eq!(SubRole::infer("Postal code"), SubRole::PostalCode);
        assert_eq!(SubRole::infer("Whatever"), SubRole::Other);
    }

    #[test]
    fn test_name_composite() {
        let json = format!(
            r#"{{"subData": [{}]}}"#,
            field("Full Name", &["First name", "Last name"]),
        );
        let plan = build_plan(&template(&json));
        assert_eq!(plan.composite(0), Some(CompositeKind::Name));
    }

    #[test]
    fn test_address_composite() {
        let json = format!(
            r#"{{"subData": [{}]}}"#,
            field("Home", &["Street", "City", "Postal code", "Country"]),
        );
        let plan = build_plan(&template(&json));
        assert_eq!(plan.composite(0), Some(CompositeKind::Address));
    }

    #[test]
    fn test_first_missing_sub_is_parse_aware() {
        let json = format!(
            r#"{{"subData": [{}]}}"#,
            field("Date of Birth", &["Day", "Month", "Year"]),
        );
        let plan = build_plan(&template(&json));

        let mut collected = BTreeMap::new();
        assert_eq!(plan.first_missing_sub(0, &collected), Some(1));

        collected.insert(1, "25".to_string());
        collected.insert(2, "not a month".to_string());
        assert_eq!(plan.first_missing_sub(0, &collected), Some(2));

        collected.insert(2, "marzo".to_string());
        collected.insert(3, "1990".to_string());
        assert_eq!(plan.first_missing_sub(0, &collected), None);
        assert_eq!(plan.assemble_date(0, &collected).as_deref(), Some("1990-03-25"));
    }
}
