//! NIX metadata model
//!
//! Sections → Properties → Values, without a document. Property values are
//! stored with a single native data type per property, and an optional
//! out-of-band kind tag (`odml_type`) records the odML kind they came from.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::kind::ValueKind;

/// Native storage type of a property's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Int64,
    Double,
    Bool,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "string"),
            DataType::Int64 => write!(f, "int64"),
            DataType::Double => write!(f, "double"),
            DataType::Bool => write!(f, "bool"),
        }
    }
}

/// A natively storable datum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NativeDatum {
    String(String),
    Int64(i64),
    Double(f64),
    Bool(bool),
}

impl NativeDatum {
    pub fn data_type(&self) -> DataType {
        match self {
            NativeDatum::String(_) => DataType::String,
            NativeDatum::Int64(_) => DataType::Int64,
            NativeDatum::Double(_) => DataType::Double,
            NativeDatum::Bool(_) => DataType::Bool,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeDatum::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for NativeDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeDatum::String(s) => write!(f, "{}", s),
            NativeDatum::Int64(i) => write!(f, "{}", i),
            NativeDatum::Double(x) => write!(f, "{}", x),
            NativeDatum::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One stored value plus its annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NixValue {
    pub data: NativeDatum,
    pub unit: Option<String>,
    pub uncertainty: Option<String>,
    pub reference: Option<String>,
}

impl NixValue {
    pub fn new(data: NativeDatum) -> Self {
        Self {
            data,
            unit: None,
            uncertainty: None,
            reference: None,
        }
    }
}

impl From<&str> for NixValue {
    fn from(s: &str) -> Self {
        NixValue::new(NativeDatum::String(s.to_string()))
    }
}

impl From<i64> for NixValue {
    fn from(i: i64) -> Self {
        NixValue::new(NativeDatum::Int64(i))
    }
}

impl From<i32> for NixValue {
    fn from(i: i32) -> Self {
        NixValue::new(NativeDatum::Int64(i64::from(i)))
    }
}

impl From<f64> for NixValue {
    fn from(x: f64) -> Self {
        NixValue::new(NativeDatum::Double(x))
    }
}

impl From<bool> for NixValue {
    fn from(b: bool) -> Self {
        NixValue::new(NativeDatum::Bool(b))
    }
}

/// Stored values share one data type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Property '{property}' mixes data types: expected {expected}, found {found}")]
pub struct DataTypeMismatch {
    pub property: String,
    pub expected: DataType,
    pub found: DataType,
}

/// A NIX property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NixProperty {
    pub id: String,
    pub name: String,
    pub definition: Option<String>,
    data_type: DataType,
    values: Vec<NixValue>,
    pub unit: Option<String>,
    pub uncertainty: Option<String>,
    pub reference: Option<String>,
    pub dependency: Option<String>,
    pub dependency_value: Option<String>,
    pub value_origin: Option<String>,
    /// Out-of-band kind tag; absent for untagged (opaque) values
    pub odml_type: Option<String>,
}

impl NixProperty {
    /// Create a property from values that must share one native data type
    ///
    /// An empty value list is stored as `DataType::String`.
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        values: Vec<NixValue>,
    ) -> Result<Self, DataTypeMismatch> {
        let name = name.into();
        let data_type = values
            .first()
            .map(|v| v.data.data_type())
            .unwrap_or(DataType::String);
        if let Some(bad) = values.iter().find(|v| v.data.data_type() != data_type) {
            return Err(DataTypeMismatch {
                property: name,
                expected: data_type,
                found: bad.data.data_type(),
            });
        }
        Ok(Self {
            id: id.into(),
            name,
            definition: None,
            data_type,
            values,
            unit: None,
            uncertainty: None,
            reference: None,
            dependency: None,
            dependency_value: None,
            value_origin: None,
            odml_type: None,
        })
    }

    /// Create a property with no values and an explicit data type
    pub fn empty(name: impl Into<String>, id: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            definition: None,
            data_type,
            values: Vec::new(),
            unit: None,
            uncertainty: None,
            reference: None,
            dependency: None,
            dependency_value: None,
            value_origin: None,
            odml_type: None,
        }
    }

    /// Create a property holding exactly one value
    pub fn single(name: impl Into<String>, id: impl Into<String>, value: NixValue) -> Self {
        let data_type = value.data.data_type();
        let mut property = Self::empty(name, id, data_type);
        property.values.push(value);
        property
    }

    pub fn with_odml_type(mut self, kind: ValueKind) -> Self {
        self.odml_type = Some(kind.to_string());
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn values(&self) -> &[NixValue] {
        &self.values
    }

    /// The parsed kind tag
    ///
    /// `Some(Err(..))` means a tag is present but unrecognized.
    pub fn kind_tag(&self) -> Option<Result<ValueKind, super::kind::UnknownKind>> {
        self.odml_type.as_deref().map(str::parse)
    }
}

/// A NIX section
///
/// Sections are assembled bottom-up and attached to their parent once
/// complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NixSection {
    pub id: String,
    pub name: String,
    pub section_type: String,
    pub definition: Option<String>,
    pub sections: Vec<NixSection>,
    pub properties: Vec<NixProperty>,
}

impl NixSection {
    pub fn new(
        name: impl Into<String>,
        section_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            section_type: section_type.into(),
            definition: None,
            sections: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn push_section(&mut self, section: NixSection) {
        self.sections.push(section);
    }

    pub fn push_property(&mut self, property: NixProperty) {
        self.properties.push(property);
    }

    pub fn property(&self, name: &str) -> Option<&NixProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}
