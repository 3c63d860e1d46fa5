//! Postal address decomposition
//!
//! Comma-separated tokens are assigned positionally:
//! street, city, state + postal code, country. Shorter answers reuse the
//! trailing tokens (last as country, second-to-last as city) so that
//! "Milan, Italy" still yields something useful.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMERIC_POSTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4,6}").unwrap());

// Canadian-style alternating letter/digit codes, e.g. "K1A 0B1"
static ALPHANUMERIC_POSTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[A-Z]\d[A-Z]\s?\d[A-Z]\d\b").unwrap());

/// Extracted address parts; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Decompose one address utterance by comma position.
pub fn parse_address(text: &str) -> AddressParts {
    let tokens: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    let mut parts = AddressParts::default();

    let Some(first) = tokens.first() else {
        return parts;
    };
    parts.street = Some(first.to_string());

    if tokens.len() >= 4 {
        parts.city = Some(tokens[1].to_string());
        assign_state_and_postal(&mut parts, tokens[2]);
        parts.country = Some(tokens[3].to_string());
    } else if tokens.len() >= 2 {
        // Short answers: last token doubles as country, the one before as city
        parts.city = Some(tokens[tokens.len() - 2].to_string());
        parts.country = Some(tokens[tokens.len() - 1].to_string());
        if tokens.len() == 3 {
            assign_state_and_postal(&mut parts, tokens[2]);
        }
    }

    parts
}

/// Pull the postal code out of the third token; whatever non-digit prefix
/// remains becomes the state.
fn assign_state_and_postal(parts: &mut AddressParts, token: &str) {
    let matched = ALPHANUMERIC_POSTAL
        .find(token)
        .or_else(|| NUMERIC_POSTAL.find(token));
    match matched {
        Some(m) => {
            parts.postal_code = Some(m.as_str().to_string());
            let prefix = token[..m.start()].trim().trim_end_matches(',').trim();
            if !prefix.is_empty() {
                parts.state = Some(prefix.to_string());
            }
        },
        None => {
            parts.state = Some(token.to_string());
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_tokens() {
        let parts = parse_address("Via Roma 1, Milano, MI 20121, Italia");
        assert_eq!(parts.street.as_deref(), Some("Via Roma 1"));
        assert_eq!(parts.city.as_deref(), Some("Milano"));
        assert_eq!(parts.state.as_deref(), Some("MI"));
        assert_eq!(parts.postal_code.as_deref(), Some("20121"));
        assert_eq!(parts.country.as_deref(), Some("Italia"));
    }

    #[test]
    fn test_canadian_postal() {
        let parts = parse_address("10 Main St, Ottawa, ON K1A 0B1, Canada");
        assert_eq!(parts.postal_code.as_deref(), Some("K1A 0B1"));
        assert_eq!(parts.state.as_deref(), Some("ON"));
    }

    #[test]
    fn test_three_tokens_reuses_trailing() {
        let parts = parse_address("Via Roma 1, Milano, Italia");
        assert_eq!(parts.street.as_deref(), Some("Via Roma 1"));
        assert_eq!(parts.city.as_deref(), Some("Milano"));
        assert_eq!(parts.country.as_deref(), Some("Italia"));
    }

    #[test]
    fn test_two_tokens() {
        let parts = parse_address("Milan, Italy");
        assert_eq!(parts.street.as_deref(), Some("Milan"));
        assert_eq!(parts.city.as_deref(), Some("Milan"));
        assert_eq!(parts.country.as_deref(), Some("Italy"));
    }

    #[test]
    fn test_single_token() {
        let parts = parse_address("Just a street");
        assert_eq!(parts.street.as_deref(), Some("Just a street"));
        assert!(parts.city.is_none());
        assert!(parts.country.is_none());
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse_address(""), AddressParts::default());
    }
}
