//! Style identifiers
//!
//! The controller sends ids as numbers in some places and as object keys
//! (strings) in others. `StyleId` accepts both and keeps a single canonical
//! text form so the two always compare equal.

use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Stable identifier of a style resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawStyleId")]
pub struct StyleId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStyleId {
    Number(u64),
    Text(String),
}

impl From<RawStyleId> for StyleId {
    fn from(raw: RawStyleId) -> Self {
        match raw {
            RawStyleId::Number(n) => StyleId::from(n),
            RawStyleId::Text(s) => StyleId::from(s),
        }
    }
}

impl StyleId {
    /// The id as text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a number, when it is a canonical decimal integer
    pub fn as_number(&self) -> Option<u64> {
        let n: u64 = self.0.parse().ok()?;
        (n.to_string() == self.0).then_some(n)
    }
}

impl From<u64> for StyleId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for StyleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StyleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Numeric ids sort numerically and before any non-numeric id, matching the
// order the controller enumerates styles in.
impl Ord for StyleId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for StyleId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for StyleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(n) => serializer.serialize_u64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_and_string_forms_are_equal() {
        let a: StyleId = serde_json::from_str("12").unwrap();
        let b: StyleId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_number(), Some(12));
    }

    #[test]
    fn test_non_canonical_numbers_stay_text() {
        let id = StyleId::from("007");
        assert_eq!(id.as_number(), None);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"007\"");
    }

    #[test]
    fn test_numeric_ordering() {
        let mut ids = vec![
            StyleId::from("b"),
            StyleId::from(10),
            StyleId::from(2),
            StyleId::from("a"),
        ];
        ids.sort();
        let order: Vec<&str> = ids.iter().map(StyleId::as_str).collect();
        assert_eq!(order, vec!["2", "10", "a", "b"]);
    }
}
