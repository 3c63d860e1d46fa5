//! Translation dictionary
//!
//! The authoring UI stores action texts as GUID references into per-locale
//! string tables. Before the engine is constructed those tables are merged
//! into one flat map; later sources win on key collision.

use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Flat GUID (or literal) to localized-text map.
#[derive(Debug, Clone, Default)]
pub struct TranslationMap {
    entries: HashMap<String, String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge all sources in order. Each source may be a flat
    /// `{guid: text}` object or locale-shaped `{locale: {guid: text}}`.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut map = Self::new();
        for source in sources {
            map.merge(source);
        }
        map
    }

    /// Merge one source into the dictionary.
    pub fn merge(&mut self, source: &Value) {
        let Some(object) = source.as_object() else {
            tracing::warn!("translation source is not a JSON object, skipping");
            return;
        };
        for (key, value) in object {
            match value {
                Value::String(text) => {
                    self.entries.insert(key.clone(), text.clone());
                },
                Value::Object(inner) => {
                    for (guid, text) in inner {
                        if let Value::String(text) = text {
                            self.entries.insert(guid.clone(), text.clone());
                        }
                    }
                },
                _ => {},
            }
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Resolve a key to its localized text.
    ///
    /// Keys the editor stored as literal strings (not GUIDs) resolve to
    /// themselves; an unknown GUID resolves to nothing so callers can fall
    /// back to templated phrasing.
    pub fn resolve<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if let Some(text) = self.entries.get(key) {
            return Some(text.as_str());
        }
        if Uuid::parse_str(key).is_ok() {
            None
        } else {
            Some(key)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_flat_and_locale_shaped() {
        let flat = json!({"g1": "Hello"});
        let nested = json!({"en": {"g2": "Provide your email"}, "it": {"g3": "Ciao"}});
        let map = TranslationMap::from_sources([&flat, &nested]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.resolve("g2"), Some("Provide your email"));
    }

    #[test]
    fn test_later_source_wins() {
        let mut map = TranslationMap::new();
        map.merge(&json!({"g1": "old"}));
        map.merge(&json!({"g1": "new"}));
        assert_eq!(map.resolve("g1"), Some("new"));
    }

    #[test]
    fn test_literal_passthrough_and_missing_guid() {
        let map = TranslationMap::new();
        assert_eq!(map.resolve("Just a literal prompt"), Some("Just a literal prompt"));
        assert_eq!(map.resolve("7f3b6a54-9f2c-4a31-b3f2-0d7c1f2e5a88"), None);
    }
}
