//! Date decomposition
//!
//! Heuristic, best-effort extraction of day/month/year from one utterance.
//! Understands numeric forms (`25/03/1990`, `25-3-90`), English and Italian
//! month names and abbreviations, and ordinal day suffixes (`3rd`). Absent
//! parts simply stay unset; the flow machine re-prompts for them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Month names in both supported locales. Abbreviations are matched as
/// prefixes of these full names.
const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("gennaio", 1),
    ("febbraio", 2),
    ("marzo", 3),
    ("aprile", 4),
    ("maggio", 5),
    ("giugno", 6),
    ("luglio", 7),
    ("agosto", 8),
    ("settembre", 9),
    ("ottobre", 10),
    ("novembre", 11),
    ("dicembre", 12),
];

static STRICT_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/\-](\d{1,2})(?:[/\-](\d{2,4}))?$").unwrap());

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9À-ÿ]+").unwrap());

static DAY_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?$").unwrap());

/// Extracted date parts; every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DateParts {
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.month.is_none() && self.year.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.day.is_some() && self.month.is_some() && self.year.is_some()
    }

    /// Zero-padded `YYYY-MM-DD`, only when all three parts are present.
    pub fn to_iso(&self) -> Option<String> {
        match (self.year, self.month, self.day) {
            (Some(y), Some(m), Some(d)) => Some(format!("{:04}-{:02}-{:02}", y, m, d)),
            _ => None,
        }
    }
}

/// Decompose one utterance into day/month/year candidates.
pub fn parse_date_parts(text: &str) -> DateParts {
    let trimmed = text.trim();
    let mut parts = DateParts::default();
    if trimmed.is_empty() {
        return parts;
    }

    // Strict d/m(/y) form first. Day-first is the default for both supported
    // locales; a component above 12 settles the ambiguity either way.
    if let Some(caps) = STRICT_NUMERIC.captures(trimmed) {
        let first: u32 = caps[1].parse().unwrap_or(0);
        let second: u32 = caps[2].parse().unwrap_or(0);
        if first <= 12 && second > 12 {
            parts.month = in_range(first, 1, 12);
            parts.day = in_range(second, 1, 31);
        } else {
            parts.day = in_range(first, 1, 31);
            parts.month = in_range(second, 1, 12);
        }
        if let Some(y) = caps.get(3) {
            parts.year = y.as_str().parse::<u32>().ok().map(expand_year);
        }
        return parts;
    }

    let tokens: Vec<&str> = SEPARATORS
        .split(trimmed)
        .filter(|t| !t.is_empty())
        .collect();
    let mut consumed = vec![false; tokens.len()];

    // Standalone 4-digit year
    for (i, token) in tokens.iter().enumerate() {
        if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
            if let Some(year) = token.parse::<i32>().ok().filter(|y| (1900..=2100).contains(y)) {
                if parts.year.is_none() {
                    parts.year = Some(year);
                    consumed[i] = true;
                }
            }
        }
    }

    // Month names and abbreviations
    for (i, token) in tokens.iter().enumerate() {
        if consumed[i] || parts.month.is_some() {
            continue;
        }
        if let Some(month) = parse_month_name(token) {
            parts.month = Some(month);
            consumed[i] = true;
        }
    }

    // Remaining small numbers: month first while unset, then day
    for (i, token) in tokens.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        let Some(n) = day_number(token) else { continue };
        if parts.month.is_none() && (1..=12).contains(&n) {
            parts.month = Some(n);
        } else if parts.day.is_none() && (1..=31).contains(&n) {
            parts.day = Some(n);
        }
    }

    parts
}

/// Interpret a collected day answer ("25", "3rd").
pub fn parse_day(text: &str) -> Option<u32> {
    day_number(text.trim()).filter(|d| (1..=31).contains(d))
}

/// Interpret a collected month answer, numeric ("3") or by name ("marzo").
pub fn parse_month(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if let Some(n) = day_number(trimmed).filter(|m| (1..=12).contains(m)) {
        return Some(n);
    }
    parse_month_name(trimmed)
}

/// Interpret a collected year answer; two-digit years are windowed.
pub fn parse_year(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    if !trimmed.chars().all(|c| c.is_ascii_digit()) || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<u32>().ok().map(expand_year)
}

/// Match a token against the bilingual month table by prefix.
///
/// At least three characters are required so "ma" never resolves; the match
/// is accepted only when every candidate month agrees (e.g. "mar" hits both
/// "march" and "marzo", which agree on 3).
fn parse_month_name(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    if token.len() < 3 || !token.chars().all(char::is_alphabetic) {
        return None;
    }
    let mut found: Option<u32> = None;
    for (name, number) in MONTH_NAMES {
        if name.starts_with(&token) {
            match found {
                Some(previous) if previous != *number => return None,
                _ => found = Some(*number),
            }
        }
    }
    found
}

fn day_number(token: &str) -> Option<u32> {
    DAY_NUMBER
        .captures(token)
        .and_then(|caps| caps[1].parse().ok())
}

fn in_range(value: u32, low: u32, high: u32) -> Option<u32> {
    (low..=high).contains(&value).then_some(value)
}

fn expand_year(value: u32) -> i32 {
    match value {
        0..=30 => 2000 + value as i32,
        31..=99 => 1900 + value as i32,
        _ => value as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_numeric() {
        let parts = parse_date_parts("25/03/1990");
        assert_eq!(parts.day, Some(25));
        assert_eq!(parts.month, Some(3));
        assert_eq!(parts.year, Some(1990));
    }

    #[test]
    fn test_strict_numeric_month_first_disambiguation() {
        // Second component above 12 forces month-first reading
        let parts = parse_date_parts("03/25/1990");
        assert_eq!(parts.day, Some(25));
        assert_eq!(parts.month, Some(3));
    }

    #[test]
    fn test_strict_numeric_two_digit_year() {
        let parts = parse_date_parts("25-3-90");
        assert_eq!(parts.year, Some(1990));
        let parts = parse_date_parts("25-3-05");
        assert_eq!(parts.year, Some(2005));
    }

    #[test]
    fn test_strict_numeric_without_year() {
        let parts = parse_date_parts("25/03");
        assert_eq!(parts.day, Some(25));
        assert_eq!(parts.month, Some(3));
        assert_eq!(parts.year, None);
    }

    #[test]
    fn test_english_month_name() {
        let parts = parse_date_parts("March 3rd 1990");
        assert_eq!(parts.day, Some(3));
        assert_eq!(parts.month, Some(3));
        assert_eq!(parts.year, Some(1990));
    }

    #[test]
    fn test_italian_month_name() {
        let parts = parse_date_parts("3 marzo 1990");
        assert_eq!(parts.day, Some(3));
        assert_eq!(parts.month, Some(3));
        assert_eq!(parts.year, Some(1990));
    }

    #[test]
    fn test_month_abbreviation() {
        assert_eq!(parse_date_parts("12 mar 1985").month, Some(3));
        assert_eq!(parse_date_parts("1 dic 2001").month, Some(12));
        // Too short to resolve
        assert_eq!(parse_date_parts("12 ma 1985").month, Some(12));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_date_parts("").is_empty());
        assert!(parse_date_parts("   ").is_empty());
    }

    #[test]
    fn test_number_assignment_rule() {
        // First small number fills month, second fills day
        let parts = parse_date_parts("3 4 1990");
        assert_eq!(parts.month, Some(3));
        assert_eq!(parts.day, Some(4));
        // A number outside 1..=12 can only be the day
        let parts = parse_date_parts("25 12 1990");
        assert_eq!(parts.day, Some(25));
        assert_eq!(parts.month, Some(12));
    }

    #[test]
    fn test_to_iso() {
        let parts = DateParts {
            day: Some(25),
            month: Some(3),
            year: Some(1990),
        };
        assert_eq!(parts.to_iso().as_deref(), Some("1990-03-25"));
        assert_eq!(
            DateParts { day: Some(5), month: Some(7), year: Some(2001) }
                .to_iso()
                .as_deref(),
            Some("2001-07-05")
        );
        assert!(DateParts { day: None, ..parts }.to_iso().is_none());
    }

    #[test]
    fn test_part_answer_helpers() {
        assert_eq!(parse_day("25"), Some(25));
        assert_eq!(parse_day("3rd"), Some(3));
        assert_eq!(parse_day("40"), None);
        assert_eq!(parse_month("marzo"), Some(3));
        assert_eq!(parse_month("3"), Some(3));
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_year("1990"), Some(1990));
        assert_eq!(parse_year("90"), Some(1990));
        assert_eq!(parse_year("soon"), None);
    }
}
