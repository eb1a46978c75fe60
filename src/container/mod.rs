//! NIX container
//!
//! A NIX file holds a tree of metadata sections in a typed binary container.
//! Only the metadata tree is modeled here; data arrays and the rest of the
//! NIX data model are out of scope.

pub mod nix_file;

pub use nix_file::{FORMAT_VERSION, NixFile};

use std::path::PathBuf;

/// How a container is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Read an existing container; writes are rejected
    ReadOnly,
    /// Read an existing container and write changes back
    ReadWrite,
    /// Truncate (or create) the container
    Overwrite,
}

impl FileMode {
    pub fn is_writable(&self) -> bool {
        !matches!(self, FileMode::ReadOnly)
    }
}

/// Error during container I/O
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode container: {0}")]
    Encode(String),
    #[error("Failed to decode container: {0}")]
    Decode(String),
    #[error("Not a NIX container: {0}")]
    InvalidHeader(PathBuf),
    #[error("Unsupported container format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Container is opened read-only: {0}")]
    ReadOnly(PathBuf),
    #[error(transparent)]
    DataTypeMismatch(#[from] crate::models::DataTypeMismatch),
}
