//! Export functionality
//!
//! Provides the odML XML writer for `Document` trees.

pub mod odml;

pub use odml::OdmlExporter;

/// Error during export
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}
