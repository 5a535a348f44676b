use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A stored value. Stores only ever hold integers or strings.
///
/// Serialized untagged, so a file-backed value is just the bare JSON number
/// or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
}
impl Value {
    /// The value as an integer. Text that holds a base-10 integer counts, so
    /// values written by tools that only store strings still read back.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    /// Encoded form used by the persistent stores.
    pub fn to_json(&self) -> Vec<u8> {
        match self {
            Self::Integer(i) => i.to_string().into_bytes(),
            // Serializing a plain string cannot fail.
            Self::Text(s) => serde_json::to_vec(s).unwrap_or_default(),
        }
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"42", Value::Integer(42))]
    #[case(b"-7", Value::Integer(-7))]
    #[case(b"\"ru\"", Value::Text("ru".to_string()))]
    #[case(b" 9223372036854775807\n", Value::Integer(i64::MAX))]
    fn test_decode(#[case] raw: &[u8], #[case] expected: Value) {
        assert_eq!(serde_json::from_slice::<Value>(raw).unwrap(), expected);
    }

    #[rstest]
    #[case(b"1.5")]
    #[case(b"true")]
    #[case(b"null")]
    #[case(b"[1]")]
    #[case(b"")]
    fn test_decode_rejects_other_json(#[case] raw: &[u8]) {
        assert!(serde_json::from_slice::<Value>(raw).is_err());
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Value::Integer(5).as_integer(), Some(5));
        assert_eq!(Value::from("123").as_integer(), Some(123));
        assert_eq!(Value::from("abc").as_integer(), None);
        assert_eq!(Value::from("en").as_text(), Some("en"));
        assert_eq!(Value::Integer(1).as_text(), None);
    }

    #[test]
    fn test_to_json_reads_back() {
        for value in [Value::Integer(i64::MIN), Value::from("zh_CN"), Value::from("with \"quotes\"")] {
            assert_eq!(serde_json::from_slice::<Value>(&value.to_json()).unwrap(), value);
        }
    }
}
