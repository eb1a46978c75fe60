//! odML document model
//!
//! Document → Sections → Properties → Values. Sections own their children
//! exclusively, so the tree can never contain a cycle.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::kind::ValueKind;
use super::literal::{self, DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT};

/// Sentinel section type used when a section has none
pub const TYPE_NOT_SPECIFIED: &str = "n.s.";

/// Generate a fresh opaque entity identifier
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A single typed datum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "data")]
pub enum Datum {
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Binary(Vec<u8>),
    Tuple(Vec<String>),
}

impl Datum {
    /// The kind this datum carries on its own, ignoring any declared dtype
    pub fn natural_kind(&self) -> ValueKind {
        match self {
            Datum::String(_) => ValueKind::String,
            Datum::Int(_) => ValueKind::Int,
            Datum::Float(_) => ValueKind::Float,
            Datum::Boolean(_) => ValueKind::Boolean,
            Datum::Date(_) => ValueKind::Date,
            Datum::Time(_) => ValueKind::Time,
            Datum::DateTime(_) => ValueKind::DateTime,
            Datum::Binary(_) => ValueKind::Binary,
            Datum::Tuple(c) => ValueKind::Tuple(c.len()),
        }
    }

    /// Parse text according to `kind`
    ///
    /// Text that does not parse is kept as a string datum; the coercion
    /// engine decides later whether it is acceptable.
    pub fn parse_as(kind: Option<ValueKind>, text: &str) -> Datum {
        let parsed = match kind {
            Some(ValueKind::Int) => literal::parse_int(text).map(Datum::Int),
            Some(ValueKind::Float) => literal::parse_float(text).map(Datum::Float),
            Some(ValueKind::Boolean) => literal::parse_boolean(text).map(Datum::Boolean),
            Some(ValueKind::Date) => literal::parse_date(text).map(Datum::Date),
            Some(ValueKind::Time) => literal::parse_time(text).map(Datum::Time),
            Some(ValueKind::DateTime) => literal::parse_datetime(text).map(Datum::DateTime),
            Some(ValueKind::Binary) => BASE64.decode(text.trim()).ok().map(Datum::Binary),
            Some(ValueKind::Tuple(_)) => literal::parse_tuple(text).map(Datum::Tuple),
            _ => None,
        };
        parsed.unwrap_or_else(|| Datum::String(text.to_string()))
    }

    /// Whether the datum carries no information
    pub fn is_empty(&self) -> bool {
        match self {
            Datum::String(s) => s.is_empty(),
            Datum::Binary(b) => b.is_empty(),
            Datum::Tuple(c) => c.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::String(s) => write!(f, "{}", s),
            Datum::Int(i) => write!(f, "{}", i),
            Datum::Float(x) => write!(f, "{}", x),
            Datum::Boolean(b) => write!(f, "{}", b),
            Datum::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Datum::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Datum::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Datum::Binary(b) => write!(f, "{}", BASE64.encode(b)),
            Datum::Tuple(c) => write!(f, "{}", literal::format_tuple(c)),
        }
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::String(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::String(s)
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Datum::Int(i)
    }
}

impl From<i32> for Datum {
    fn from(i: i32) -> Self {
        Datum::Int(i64::from(i))
    }
}

impl From<f64> for Datum {
    fn from(x: f64) -> Self {
        Datum::Float(x)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Boolean(b)
    }
}

impl From<NaiveDate> for Datum {
    fn from(d: NaiveDate) -> Self {
        Datum::Date(d)
    }
}

impl From<NaiveTime> for Datum {
    fn from(t: NaiveTime) -> Self {
        Datum::Time(t)
    }
}

impl From<NaiveDateTime> for Datum {
    fn from(dt: NaiveDateTime) -> Self {
        Datum::DateTime(dt)
    }
}

/// One value of a property plus its annotations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    /// The datum; `None` is an absent value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datum: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Value {
    pub fn new(datum: impl Into<Datum>) -> Self {
        Self {
            datum: Some(datum.into()),
            ..Default::default()
        }
    }

    /// An absent value
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_uncertainty(mut self, uncertainty: impl Into<String>) -> Self {
        self.uncertainty = Some(uncertainty.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

macro_rules! value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(datum: $t) -> Self {
                    Value::new(datum)
                }
            }
        )*
    };
}

value_from!(
    &str,
    String,
    i64,
    i32,
    f64,
    bool,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    Datum
);

/// A named, typed, multi-valued attribute of a section
///
/// # Example
///
/// ```rust
/// use nix_odml_converter::models::{Property, ValueKind};
///
/// let prop = Property::new("int property")
///     .with_dtype(ValueKind::Int)
///     .with_values([1, 2, 3]);
/// assert_eq!(prop.values.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Declared kind; `None` means infer from the stored data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtype: Option<ValueKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_origin: Option<String>,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::unnamed()
        }
    }

    /// A property without a name; its id stands in for the name
    pub fn unnamed() -> Self {
        Self {
            id: generate_id(),
            name: None,
            definition: None,
            dtype: None,
            unit: None,
            uncertainty: None,
            reference: None,
            dependency: None,
            dependency_value: None,
            value_origin: None,
            values: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_dtype(mut self, dtype: ValueKind) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// The human name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A named node of the metadata tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub section_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::unnamed()
        }
    }

    pub fn unnamed() -> Self {
        Self {
            id: generate_id(),
            name: None,
            section_type: None,
            definition: None,
            reference: None,
            repository: None,
            sections: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_type(mut self, section_type: impl Into<String>) -> Self {
        self.section_type = Some(section_type.into());
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// The section type, falling back to the "not specified" sentinel
    pub fn type_or_default(&self) -> &str {
        self.section_type.as_deref().unwrap_or(TYPE_NOT_SPECIFIED)
    }
}

/// Root of an odML tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            author: None,
            date: None,
            version: None,
            repository: None,
            sections: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_entities_fall_back_to_id() {
        let section = Section::unnamed();
        assert!(!section.id.is_empty());
        assert_eq!(section.display_name(), section.id);
        assert_eq!(section.type_or_default(), TYPE_NOT_SPECIFIED);

        let prop = Property::unnamed();
        assert_eq!(prop.display_name(), prop.id);
    }

    #[test]
    fn test_parse_as_falls_back_to_string() {
        assert_eq!(Datum::parse_as(Some(ValueKind::Int), "12"), Datum::Int(12));
        assert_eq!(
            Datum::parse_as(Some(ValueKind::Int), "twelve"),
            Datum::String("twelve".to_string())
        );
        assert_eq!(
            Datum::parse_as(Some(ValueKind::Tuple(2)), "(1; 2)"),
            Datum::Tuple(vec!["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn test_datum_display_is_iso() {
        let date = NaiveDate::from_ymd_opt(2011, 12, 1).unwrap();
        assert_eq!(Datum::Date(date).to_string(), "2011-12-01");
        let dt = date.and_hms_opt(1, 1, 1).unwrap();
        assert_eq!(Datum::DateTime(dt).to_string(), "2011-12-01T01:01:01");
    }
}
