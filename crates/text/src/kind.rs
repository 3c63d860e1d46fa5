//! Semantic kind inference from field labels

use serde::{Deserialize, Serialize};

/// Expected semantic kind of a collected value, inferred from the field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Name,
    Email,
    Phone,
    Date,
    #[default]
    Generic,
}

impl Kind {
    /// Infer the kind from a label by case-insensitive substring match.
    ///
    /// Checked in order email, phone, date, name so that a label like
    /// "name of email contact" resolves to `Email`.
    pub fn infer(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("email") {
            Kind::Email
        } else if label.contains("phone") || label.contains("cell") || label.contains("mobile") {
            Kind::Phone
        } else if label.contains("date") || label.contains("birth") {
            Kind::Date
        } else if label.contains("name") {
            Kind::Name
        } else {
            Kind::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Name => "name",
            Kind::Email => "email",
            Kind::Phone => "phone",
            Kind::Date => "date",
            Kind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_inference() {
        assert_eq!(Kind::infer("Email Address"), Kind::Email);
        assert_eq!(Kind::infer("Cell Phone"), Kind::Phone);
        assert_eq!(Kind::infer("mobile"), Kind::Phone);
        assert_eq!(Kind::infer("Date of Birth"), Kind::Date);
        assert_eq!(Kind::infer("birthday"), Kind::Date);
        assert_eq!(Kind::infer("Full Name"), Kind::Name);
        assert_eq!(Kind::infer("Favourite colour"), Kind::Generic);
    }

    #[test]
    fn test_precedence() {
        // Email wins over name when both substrings are present
        assert_eq!(Kind::infer("name of email contact"), Kind::Email);
        assert_eq!(Kind::infer("phone owner name"), Kind::Phone);
    }

    #[test]
    fn test_empty_label() {
        assert_eq!(Kind::infer(""), Kind::Generic);
    }
}
