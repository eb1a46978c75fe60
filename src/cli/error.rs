//! CLI-specific error types

use crate::container::ContainerError;
use crate::convert::ConversionError;
use crate::export::ExportError;
use crate::import::ImportError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Invalid configuration in {0}: {1}")]
    ConfigError(PathBuf, String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conversion error: {0}")]
    ConversionError(#[from] ConversionError),

    #[error("Container error: {0}")]
    ContainerError(#[from] ContainerError),

    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),

    #[error("{failed} of {total} files failed to convert")]
    BatchFailed { failed: usize, total: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(String),
}
