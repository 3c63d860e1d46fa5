//! Per-kind input validators
//!
//! Pure predicates. Failure never raises; the flow machine branches on the
//! boolean and escalates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::date::parse_date_parts;
use crate::kind::Kind;

static NAME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ'’\-]{2,}$").unwrap());

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").unwrap());

static SLASH_OR_DASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}$").unwrap());

/// Validate raw input against the expected kind of its field.
pub fn validate(kind: Kind, input: &str) -> bool {
    let input = input.trim();
    match kind {
        Kind::Email => validate_email(input),
        Kind::Phone => validate_phone(input),
        Kind::Date => validate_date(input),
        Kind::Name => validate_name(input),
        Kind::Generic => !input.is_empty(),
    }
}

/// Single `@`, non-empty local part, dotted domain, TLD of at least 2 chars.
fn validate_email(input: &str) -> bool {
    if input.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = input.splitn(3, '@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

/// Valid iff 7 to 16 digits remain after stripping everything else.
fn validate_phone(input: &str) -> bool {
    let digits = input.chars().filter(|c| c.is_ascii_digit()).count();
    (7..=16).contains(&digits)
}

/// ISO `yyyy-m-d`, `d/m/yy(yy)`, `d-m-yy(yy)`, or anything the generic
/// date decomposer can fully resolve (month names included).
fn validate_date(input: &str) -> bool {
    if ISO_DATE.is_match(input) || SLASH_OR_DASH_DATE.is_match(input) {
        return true;
    }
    parse_date_parts(input).is_complete()
}

/// At least two tokens of letters (accented Latin, apostrophes, hyphens),
/// each of length >= 2.
fn validate_name(input: &str) -> bool {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    tokens.len() >= 2 && tokens.iter().all(|t| NAME_TOKEN.is_match(t))
}
