//! Conversion error types

use crate::container::ContainerError;
use crate::export::ExportError;
use crate::import::ImportError;
use crate::models::ValueKind;

/// Fatal error for a whole conversion
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("No document root section named '{0}' found")]
    MissingDocumentRoot(String),
    #[error("Found {count} document root sections named '{name}', expected exactly one")]
    MultipleDocumentRoots { name: String, count: usize },
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl ConversionError {
    /// Whether the error concerns the shape of the tree rather than I/O
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ConversionError::MissingDocumentRoot(_)
                | ConversionError::MultipleDocumentRoots { .. }
                | ConversionError::UnsupportedFormat(_)
        )
    }
}

/// Why a single value was not carried over
///
/// None of these abort a conversion; the tree converter counts them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("binary value skipped")]
    BinarySkipped,
    #[error("empty value skipped")]
    EmptySkipped,
    #[error("cannot store '{value}' as {kind}")]
    TypeCoercion { kind: ValueKind, value: String },
}

impl CoercionError {
    pub(crate) fn type_coercion(kind: ValueKind, value: impl ToString) -> Self {
        CoercionError::TypeCoercion {
            kind,
            value: value.to_string(),
        }
    }
}
