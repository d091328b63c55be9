// src/languages.rs
//
// Canonical language naming and the deduplicated result set.

use serde::Serialize;

/// Map a raw classifier code to the reported name. Codes outside the
/// table keep the raw code visible in the fallback form.
pub fn canonical_name(code: &str) -> String {
    match code {
        "en" => "English".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "ru" => "Russian".to_string(),
        "ar" => "Arabic".to_string(),
        "zh-cn" => "Simplified Chinese".to_string(),
        "zh-tw" => "Traditional Chinese".to_string(),
        other => format!("Other ({})", other),
    }
}

/// A reported language. Compares by the reported name, so two distinct
/// unmapped codes stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn from_code(code: &str) -> Self {
        Self(canonical_name(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique languages in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DetectedLanguageSet {
    items: Vec<LanguageTag>,
}

impl DetectedLanguageSet {
    /// True when the tag was not present yet.
    pub fn insert(&mut self, tag: LanguageTag) -> bool {
        if self.items.contains(&tag) {
            return false;
        }
        self.items.push(tag);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageTag> {
        self.items.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|t| t.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_table() {
        let expected = [
            ("en", "English"),
            ("fr", "French"),
            ("de", "German"),
            ("ja", "Japanese"),
            ("ko", "Korean"),
            ("ru", "Russian"),
            ("ar", "Arabic"),
            ("zh-cn", "Simplified Chinese"),
            ("zh-tw", "Traditional Chinese"),
        ];
        for (code, name) in expected {
            assert_eq!(canonical_name(code), name, "code {}", code);
        }
    }

    #[test]
    fn test_unknown_code_keeps_raw_form() {
        assert_eq!(canonical_name("xx"), "Other (xx)");
    }

    #[test]
    fn test_distinct_unknown_codes_stay_distinct() {
        let a = LanguageTag::from_code("xx");
        let b = LanguageTag::from_code("yy");
        assert_ne!(a, b);

        let mut set = DetectedLanguageSet::default();
        assert!(set.insert(a));
        assert!(set.insert(b));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut set = DetectedLanguageSet::default();
        assert!(set.insert(LanguageTag::from_code("en")));
        assert!(!set.insert(LanguageTag::from_code("en")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let mut set = DetectedLanguageSet::default();
        for code in ["ko", "en", "ko", "fr", "en", "zh-tw"] {
            set.insert(LanguageTag::from_code(code));
        }
        assert_eq!(
            set.names(),
            vec!["Korean", "English", "French", "Traditional Chinese"]
        );
    }
}
