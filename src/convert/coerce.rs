//! Value coercion engine
//!
//! Pure functions mapping odML values to NIX native values and back. Nothing
//! here counts or logs; the tree converter decides what a failure means.
//!
//! Forward mapping per kind:
//!
//! | odML kind                    | native type     | kind tag     |
//! |------------------------------|-----------------|--------------|
//! | string, text, url, person    | string          | same name    |
//! | int                          | int64           | `int`        |
//! | float                        | double          | `float`      |
//! | boolean                      | bool            | `boolean`    |
//! | date, time, datetime         | ISO string      | same name    |
//! | n-tuple                      | `"(v1; v2)"`    | none         |
//! | binary                       | dropped         |              |
//!
//! Tuple text is stored as written; only tuples held as components are
//! joined with `"; "`.

use super::config::ConversionConfig;
use super::error::CoercionError;
use crate::models::literal::{
    self, DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT, format_tuple, parse_tuple,
};
use crate::models::{
    DataType, Datum, NativeDatum, NixProperty, NixValue, Property, Value, ValueKind,
};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Coerce one odML value into a NIX value of the given kind
///
/// Annotations (unit, uncertainty, reference) are carried over unchanged.
///
/// # Example
///
/// ```rust
/// use nix_odml_converter::convert::coerce_forward;
/// use nix_odml_converter::models::{NativeDatum, Value, ValueKind};
///
/// let stored = coerce_forward(&Value::new("42"), ValueKind::Int).unwrap();
/// assert_eq!(stored.data, NativeDatum::Int64(42));
/// ```
pub fn coerce_forward(value: &Value, kind: ValueKind) -> Result<NixValue, CoercionError> {
    let datum = value.datum.as_ref().ok_or(CoercionError::EmptySkipped)?;
    if kind == ValueKind::Binary || matches!(datum, Datum::Binary(_)) {
        return Err(CoercionError::BinarySkipped);
    }
    if datum.is_empty() {
        return Err(CoercionError::EmptySkipped);
    }

    Ok(NixValue {
        data: encode(datum, kind)?,
        unit: value.unit.clone(),
        uncertainty: value.uncertainty.clone(),
        reference: value.reference.clone(),
    })
}

fn encode(datum: &Datum, kind: ValueKind) -> Result<NativeDatum, CoercionError> {
    let reject = || CoercionError::type_coercion(kind, datum);

    let native = match kind {
        k if k.is_textual() => match datum {
            Datum::String(s) => NativeDatum::String(s.clone()),
            other => NativeDatum::String(other.to_string()),
        },
        ValueKind::Int => match datum {
            Datum::Int(i) => NativeDatum::Int64(*i),
            Datum::Float(x) => NativeDatum::Int64(whole_float(*x).ok_or_else(reject)?),
            Datum::String(s) => NativeDatum::Int64(literal::parse_int(s).ok_or_else(reject)?),
            _ => return Err(reject()),
        },
        ValueKind::Float => match datum {
            Datum::Float(x) => NativeDatum::Double(*x),
            Datum::Int(i) => NativeDatum::Double(*i as f64),
            Datum::String(s) => NativeDatum::Double(literal::parse_float(s).ok_or_else(reject)?),
            _ => return Err(reject()),
        },
        ValueKind::Boolean => match datum {
            Datum::Boolean(b) => NativeDatum::Bool(*b),
            Datum::Int(0) => NativeDatum::Bool(false),
            Datum::Int(1) => NativeDatum::Bool(true),
            Datum::String(s) => NativeDatum::Bool(literal::parse_boolean(s).ok_or_else(reject)?),
            _ => return Err(reject()),
        },
        ValueKind::Date => {
            let date = match datum {
                Datum::Date(d) => *d,
                Datum::DateTime(dt) => dt.date(),
                Datum::String(s) => literal::parse_date(s).ok_or_else(reject)?,
                _ => return Err(reject()),
            };
            NativeDatum::String(date.format(DATE_FORMAT).to_string())
        }
        ValueKind::Time => {
            let time = match datum {
                Datum::Time(t) => *t,
                Datum::DateTime(dt) => dt.time(),
                Datum::String(s) => literal::parse_time(s).ok_or_else(reject)?,
                _ => return Err(reject()),
            };
            NativeDatum::String(time.format(TIME_FORMAT).to_string())
        }
        ValueKind::DateTime => {
            let datetime = match datum {
                Datum::DateTime(dt) => *dt,
                Datum::Date(d) => d.and_hms_opt(0, 0, 0).ok_or_else(reject)?,
                Datum::String(s) => literal::parse_datetime(s).ok_or_else(reject)?,
                _ => return Err(reject()),
            };
            NativeDatum::String(datetime.format(DATETIME_FORMAT).to_string())
        }
        ValueKind::Tuple(arity) => match datum {
            Datum::Tuple(c) if c.len() == arity => NativeDatum::String(format_tuple(c)),
            Datum::String(s) => match parse_tuple(s) {
                Some(c) if c.len() == arity => NativeDatum::String(s.trim().to_string()),
                _ => return Err(reject()),
            },
            _ => return Err(reject()),
        },
        _ => return Err(reject()),
    };
    Ok(native)
}

fn whole_float(x: f64) -> Option<i64> {
    if x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

/// Coerce one NIX value back into an odML value
///
/// With no declared kind the native storage type decides: string, int,
/// float or boolean. The returned kind is the one the datum was parsed as.
pub fn coerce_reverse(
    value: &NixValue,
    declared: Option<ValueKind>,
) -> Result<(Value, ValueKind), CoercionError> {
    let kind = declared.unwrap_or_else(|| native_kind(value.data.data_type()));
    if matches!(&value.data, NativeDatum::String(s) if s.is_empty()) {
        return Err(CoercionError::EmptySkipped);
    }

    let datum = decode(&value.data, kind)?;
    let typed = Value {
        datum: Some(datum),
        unit: value.unit.clone(),
        uncertainty: value.uncertainty.clone(),
        reference: value.reference.clone(),
    };
    Ok((typed, kind))
}

fn decode(data: &NativeDatum, kind: ValueKind) -> Result<Datum, CoercionError> {
    let reject = || CoercionError::type_coercion(kind, data);

    let datum = match (kind, data) {
        (k, NativeDatum::String(s)) if k.is_textual() => Datum::String(s.clone()),
        (k, other) if k.is_textual() => Datum::String(other.to_string()),

        (ValueKind::Int, NativeDatum::Int64(i)) => Datum::Int(*i),
        (ValueKind::Int, NativeDatum::Double(x)) => Datum::Int(whole_float(*x).ok_or_else(reject)?),
        (ValueKind::Int, NativeDatum::String(s)) => {
            Datum::Int(literal::parse_int(s).ok_or_else(reject)?)
        }

        (ValueKind::Float, NativeDatum::Double(x)) => Datum::Float(*x),
        (ValueKind::Float, NativeDatum::Int64(i)) => Datum::Float(*i as f64),
        (ValueKind::Float, NativeDatum::String(s)) => {
            Datum::Float(literal::parse_float(s).ok_or_else(reject)?)
        }

        (ValueKind::Boolean, NativeDatum::Bool(b)) => Datum::Boolean(*b),
        (ValueKind::Boolean, NativeDatum::Int64(0)) => Datum::Boolean(false),
        (ValueKind::Boolean, NativeDatum::Int64(1)) => Datum::Boolean(true),
        (ValueKind::Boolean, NativeDatum::String(s)) => {
            Datum::Boolean(literal::parse_boolean(s).ok_or_else(reject)?)
        }

        (ValueKind::Date, NativeDatum::String(s)) => {
            Datum::Date(literal::parse_date(s).ok_or_else(reject)?)
        }
        (ValueKind::Time, NativeDatum::String(s)) => {
            Datum::Time(literal::parse_time(s).ok_or_else(reject)?)
        }
        (ValueKind::DateTime, NativeDatum::String(s)) => {
            Datum::DateTime(literal::parse_datetime(s).ok_or_else(reject)?)
        }

        (ValueKind::Tuple(arity), NativeDatum::String(s)) => match parse_tuple(s) {
            Some(components) if components.len() == arity => Datum::Tuple(components),
            _ => return Err(reject()),
        },

        (ValueKind::Binary, NativeDatum::String(s)) => {
            Datum::Binary(BASE64.decode(s.trim()).map_err(|_| reject())?)
        }

        _ => return Err(reject()),
    };
    Ok(datum)
}

/// The odML kind a native data type maps to when untagged
pub fn native_kind(data_type: DataType) -> ValueKind {
    match data_type {
        DataType::String => ValueKind::String,
        DataType::Int64 => ValueKind::Int,
        DataType::Double => ValueKind::Float,
        DataType::Bool => ValueKind::Boolean,
    }
}

/// The native data type values of a kind are stored as
pub fn native_type(kind: ValueKind) -> DataType {
    match kind {
        ValueKind::Int => DataType::Int64,
        ValueKind::Float => DataType::Double,
        ValueKind::Boolean => DataType::Bool,
        _ => DataType::String,
    }
}

/// Kind used to store a property's values, plus the tag to persist
///
/// A declared dtype wins and is tagged unless it is a tuple or binary.
/// Without one, the datums' own kind is used when they all agree, otherwise
/// everything is stored as strings; either way nothing is tagged.
pub fn forward_kind(property: &Property) -> (ValueKind, Option<ValueKind>) {
    if let Some(kind) = property.dtype {
        let tag = kind.is_taggable().then_some(kind);
        return (kind, tag);
    }

    let mut kinds = property
        .values
        .iter()
        .filter_map(|v| v.datum.as_ref())
        .filter(|d| !matches!(d, Datum::Binary(_)))
        .map(Datum::natural_kind);
    let kind = match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => first,
        _ => ValueKind::String,
    };
    (kind, None)
}

/// Kind to read a NIX property's values as
///
/// Order of precedence: a recognized kind tag, the native data type, the
/// tuple heuristic and optional string inference for untagged strings.
/// Returns `None` for an untagged property without values.
pub fn reverse_kind(property: &NixProperty, config: &ConversionConfig) -> Option<ValueKind> {
    if let Some(Ok(kind)) = property.kind_tag() {
        return Some(kind);
    }
    if property.values().is_empty() {
        return None;
    }
    match property.data_type() {
        DataType::String => {
            let texts: Vec<&str> = property
                .values()
                .iter()
                .filter_map(|v| v.data.as_str())
                .collect();
            if config.reconstruct_tuples {
                if let Some(arity) = tuple_arity(&texts) {
                    return Some(ValueKind::Tuple(arity));
                }
            }
            if config.infer_string_kinds {
                return Some(infer_text_kind(&texts));
            }
            Some(ValueKind::String)
        }
        other => Some(native_kind(other)),
    }
}

/// Common arity when every text is a tuple literal of the same size
pub fn tuple_arity(texts: &[&str]) -> Option<usize> {
    let mut arities = texts.iter().map(|t| parse_tuple(t).map(|c| c.len()));
    let first = arities.next()??;
    arities.all(|a| a == Some(first)).then_some(first)
}

/// The most specific kind every text parses as
pub fn infer_text_kind(texts: &[&str]) -> ValueKind {
    let all = |parses: fn(&str) -> bool| !texts.is_empty() && texts.iter().all(|t| parses(t));

    if all(|t| literal::parse_int(t).is_some()) {
        ValueKind::Int
    } else if all(|t| literal::parse_float(t).is_some()) {
        ValueKind::Float
    } else if all(|t| literal::parse_boolean(t).is_some()) {
        ValueKind::Boolean
    } else if all(|t| literal::parse_datetime(t).is_some()) {
        ValueKind::DateTime
    } else if all(|t| literal::parse_date(t).is_some()) {
        ValueKind::Date
    } else if all(|t| literal::parse_time(t).is_some()) {
        ValueKind::Time
    } else if texts.iter().any(|t| t.contains('\n')) {
        ValueKind::Text
    } else {
        ValueKind::String
    }
}
