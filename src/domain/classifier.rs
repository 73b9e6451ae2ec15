//! Classifying raw records into domain members.

use regex::Regex;

use crate::error::{ProviderError, ValidationError};

use super::source::RawRecord;
use super::ItemId;

/// Decides which raw records belong to the domain and what identity they get.
pub trait DomainClassifier {
    /// Identity of a predictable item.
    type Item;

    /// Whether `record` is a member of the domain.
    fn is_domain_member(&self, record: &RawRecord) -> bool;

    /// Identity for a member record.
    ///
    /// # Errors
    /// Returns [`ProviderError::Unclassifiable`] if the record cannot be mapped to
    /// an item. Callers treat this as "not a member".
    fn item_kind(&self, record: &RawRecord) -> Result<Self::Item, ProviderError>;
}

/// How a descriptor string is matched.
#[derive(Debug, Clone)]
pub enum DescriptorMatch {
    /// A single substring, optionally ignoring ASCII case.
    Substring {
        /// Text to look for.
        needle: String,
        /// When false, ASCII case is ignored.
        case_sensitive: bool,
    },
    /// Any of several case-sensitive substrings.
    AnyOf(Vec<String>),
    /// A regular expression searched anywhere in the descriptor.
    Pattern(Regex),
}

impl DescriptorMatch {
    /// Compile a regular expression rule.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidPattern`] if `pattern` does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, ValidationError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| ValidationError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Whether `descriptor` satisfies this rule.
    #[must_use]
    pub fn matches(&self, descriptor: &str) -> bool {
        match self {
            Self::Substring {
                needle,
                case_sensitive: true,
            } => descriptor.contains(needle.as_str()),
            Self::Substring {
                needle,
                case_sensitive: false,
            } => descriptor
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
            Self::AnyOf(needles) => needles.iter().any(|n| descriptor.contains(n.as_str())),
            Self::Pattern(re) => re.is_match(descriptor),
        }
    }
}

/// Classifier that matches the descriptor string and keys items by record key.
#[derive(Debug, Clone)]
pub struct DescriptorClassifier {
    rule: DescriptorMatch,
}

impl DescriptorClassifier {
    /// Classify with `rule`.
    #[must_use]
    pub fn new(rule: DescriptorMatch) -> Self {
        Self { rule }
    }

    /// Records whose descriptor mentions "Geode" or "geode".
    #[must_use]
    pub fn geodes() -> Self {
        Self::new(DescriptorMatch::AnyOf(vec![
            "Geode".to_string(),
            "geode".to_string(),
        ]))
    }

    /// The rule in use.
    #[must_use]
    pub fn rule(&self) -> &DescriptorMatch {
        &self.rule
    }
}

impl DomainClassifier for DescriptorClassifier {
    type Item = ItemId;

    fn is_domain_member(&self, record: &RawRecord) -> bool {
        self.rule.matches(&record.descriptor)
    }

    fn item_kind(&self, record: &RawRecord) -> Result<ItemId, ProviderError> {
        Ok(ItemId::new(record.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_respects_case_flag() {
        let sensitive = DescriptorMatch::Substring {
            needle: "Geode".to_string(),
            case_sensitive: true,
        };
        let insensitive = DescriptorMatch::Substring {
            needle: "Geode".to_string(),
            case_sensitive: false,
        };

        assert!(sensitive.matches("Magma Geode/150"));
        assert!(!sensitive.matches("a strange GEODE"));
        assert!(insensitive.matches("a strange GEODE"));
        assert!(!insensitive.matches("Quartz/25"));
    }

    #[test]
    fn any_of_matches_either_needle() {
        let rule = DescriptorMatch::AnyOf(vec!["Geode".into(), "geode".into()]);
        assert!(rule.matches("Omni Geode"));
        assert!(rule.matches("contains a geode"));
        assert!(!rule.matches("GEODE"));
    }

    #[test]
    fn pattern_rule_compiles_and_matches() {
        let rule = DescriptorMatch::pattern(r"^(Frozen |Magma |Omni )?Geode/").unwrap();
        assert!(rule.matches("Frozen Geode/100/-300"));
        assert!(!rule.matches("Geode Crusher/0/-300"));
    }

    #[test]
    fn invalid_pattern_is_a_validation_error() {
        let err = DescriptorMatch::pattern("(unclosed").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
    }

    #[test]
    fn geode_classifier_keys_by_record() {
        let classifier = DescriptorClassifier::geodes();
        let record = RawRecord::new(536, "Frozen Geode/100");
        assert!(classifier.is_domain_member(&record));
        assert_eq!(classifier.item_kind(&record).unwrap(), ItemId::new(536));
        assert!(!classifier.is_domain_member(&RawRecord::new(80, "Quartz/25")));
    }
}
