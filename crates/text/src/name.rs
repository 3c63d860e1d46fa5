//! Person name decomposition

use serde::{Deserialize, Serialize};

/// First/last split of a full name answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
    pub first: String,
    pub last: String,
}

/// Split on whitespace: first token is the first name, everything else
/// joined by single spaces is the last name. Single-token input leaves the
/// last name empty.
pub fn split_name(text: &str) -> NameParts {
    let mut tokens = text.split_whitespace();
    let first = tokens.next().unwrap_or("").to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    NameParts { first, last }
}
