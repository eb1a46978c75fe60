//! Value kinds shared by both metadata models
//!
//! The kind names are the odML dtype names. They double as the kind tag
//! persisted on NIX properties.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Semantic kind of a metadata value
///
/// # Example
///
/// ```rust
/// use nix_odml_converter::models::ValueKind;
///
/// let kind: ValueKind = "3-tuple".parse().unwrap();
/// assert_eq!(kind, ValueKind::Tuple(3));
/// assert_eq!(kind.to_string(), "3-tuple");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Text,
    Url,
    Person,
    Int,
    /// Floating point; `double` parses to this kind
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Binary,
    /// Tuple with the given arity (always >= 2)
    Tuple(usize),
}

impl ValueKind {
    /// Whether values of this kind are stored as plain strings
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ValueKind::String | ValueKind::Text | ValueKind::Url | ValueKind::Person
        )
    }

    /// Whether the kind is written as an explicit tag on destination properties
    ///
    /// Tuples are stored untagged and binary values are never
    /// stored at all.
    pub fn is_taggable(&self) -> bool {
        !matches!(self, ValueKind::Tuple(_) | ValueKind::Binary)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Text => write!(f, "text"),
            ValueKind::Url => write!(f, "url"),
            ValueKind::Person => write!(f, "person"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Date => write!(f, "date"),
            ValueKind::Time => write!(f, "time"),
            ValueKind::DateTime => write!(f, "datetime"),
            ValueKind::Binary => write!(f, "binary"),
            ValueKind::Tuple(n) => write!(f, "{}-tuple", n),
        }
    }
}

/// Error returned for an unrecognized kind name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown value kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ValueKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let kind = match name.as_str() {
            "string" => ValueKind::String,
            "text" => ValueKind::Text,
            "url" => ValueKind::Url,
            "person" => ValueKind::Person,
            "int" => ValueKind::Int,
            "float" | "double" => ValueKind::Float,
            "boolean" | "bool" => ValueKind::Boolean,
            "date" => ValueKind::Date,
            "time" => ValueKind::Time,
            "datetime" => ValueKind::DateTime,
            "binary" => ValueKind::Binary,
            other => {
                let arity = other
                    .strip_suffix("-tuple")
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| *n >= 2);
                match arity {
                    Some(n) => ValueKind::Tuple(n),
                    None => return Err(UnknownKind(s.to_string())),
                }
            }
        };
        Ok(kind)
    }
}

impl Serialize for ValueKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ValueKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("double".parse::<ValueKind>().unwrap(), ValueKind::Float);
        assert_eq!("FLOAT".parse::<ValueKind>().unwrap(), ValueKind::Float);
        assert_eq!("2-tuple".parse::<ValueKind>().unwrap(), ValueKind::Tuple(2));
    }

    #[test]
    fn test_rejects_degenerate_tuples() {
        assert!("1-tuple".parse::<ValueKind>().is_err());
        assert!("x-tuple".parse::<ValueKind>().is_err());
        assert!("blob".parse::<ValueKind>().is_err());
    }

    #[test]
    fn test_display_uses_odml_names() {
        assert_eq!(ValueKind::DateTime.to_string(), "datetime");
        assert_eq!(ValueKind::Tuple(3).to_string(), "3-tuple");
    }

    #[test]
    fn test_taggable() {
        assert!(ValueKind::Int.is_taggable());
        assert!(!ValueKind::Tuple(2).is_taggable());
        assert!(!ValueKind::Binary.is_taggable());
    }
}
