//! Scalar values held by managed fields.
//!
//! A [`FieldValue`] is what a transactional scope captures on entry and
//! writes back on exit. Only plain scalars are supported; anything richer
//! should be exposed to a scope as several independent fields.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Possible values of a managed field.
///
/// # Examples
///
/// ```
/// use foresight::FieldValue;
///
/// let count = FieldValue::Unsigned(12);
/// let flag = FieldValue::Bool(true);
///
/// assert_eq!(count.as_unsigned(), Some(12));
/// assert!(flag.is_bool());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl FieldValue {
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::Unsigned(_))
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Signed(_))
    }

    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_unsigned(&self) -> Option<u64> {
        match self {
            Self::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_signed(&self) -> Option<i64> {
        match self {
            Self::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Unsigned(_) => "unsigned",
            Self::Signed(_) => "signed",
            Self::Text(_) => "text",
        }
    }

    /// Reads an unsigned value on behalf of the named field.
    ///
    /// # Errors
    /// Returns [`FieldError::TypeMismatch`] for any other variant.
    pub fn expect_unsigned(&self, field: &str) -> Result<u64, FieldError> {
        self.as_unsigned().ok_or_else(|| FieldError::TypeMismatch {
            name: field.to_string(),
            expected: "unsigned",
            actual: self.type_name(),
        })
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Unsigned(u64::from(v))
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::Unsigned(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Signed(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_unsigned() {
        let val = FieldValue::Unsigned(42);
        assert!(val.is_unsigned());
        assert_eq!(val.as_unsigned(), Some(42));
        assert_eq!(val.as_signed(), None);
        assert_eq!(val.type_name(), "unsigned");
    }

    #[test]
    fn test_value_text() {
        let val = FieldValue::Text("spring".to_string());
        assert!(val.is_text());
        assert_eq!(val.as_text(), Some("spring"));
        assert_eq!(val.type_name(), "text");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", FieldValue::Bool(false)), "false");
        assert_eq!(format!("{}", FieldValue::Unsigned(7)), "7");
        assert_eq!(format!("{}", FieldValue::Signed(-3)), "-3");
        assert_eq!(format!("{}", FieldValue::Text("hi".into())), "\"hi\"");
    }

    #[test]
    fn test_expect_unsigned_mismatch() {
        let err = FieldValue::Bool(true).expect_unsigned("counter").unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                name: "counter".to_string(),
                expected: "unsigned",
                actual: "bool",
            }
        );
        assert_eq!(FieldValue::from(9u32).expect_unsigned("counter"), Ok(9));
    }

    #[test]
    fn test_value_serialization() {
        let val = FieldValue::Unsigned(1234);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, r#"{"type":"unsigned","value":1234}"#);
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, val);
    }
}
