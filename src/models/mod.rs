//! Models for both metadata trees

pub mod kind;
pub mod literal;
pub mod nix;
pub mod odml;

pub use kind::{UnknownKind, ValueKind};
pub use nix::{DataType, DataTypeMismatch, NativeDatum, NixProperty, NixSection, NixValue};
pub use odml::{Datum, Document, Property, Section, TYPE_NOT_SPECIFIED, Value, generate_id};
