//! Import functionality
//!
//! Provides the odML XML reader producing a `Document` tree.

pub mod odml;

pub use odml::OdmlImporter;

/// Error during import
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}
