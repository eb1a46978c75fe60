//! Binary NIX container file
//!
//! Layout: 4-byte magic `NIXC`, little-endian `u32` format version, then a
//! bincode payload holding the timestamps and the section tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{ContainerError, FileMode};
use crate::models::NixSection;

const MAGIC: &[u8; 4] = b"NIXC";
const HEADER_LEN: usize = 8;

/// Container format version written by this crate
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PayloadRef<'a> {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sections: &'a [NixSection],
}

#[derive(Deserialize)]
struct Payload {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sections: Vec<NixSection>,
}

/// An open NIX container
///
/// Writable containers are flushed by `close`; a writable container that is
/// dropped with unsaved changes is flushed on drop and failures are logged.
///
/// # Example
///
/// ```rust
/// use nix_odml_converter::container::NixFile;
/// use nix_odml_converter::models::NixSection;
///
/// let mut file = NixFile::in_memory();
/// file.push_section(NixSection::new("recording", "n.s.", "id-1")).unwrap();
/// assert_eq!(file.find_sections(|s| s.name == "recording", 1).len(), 1);
/// ```
#[derive(Debug)]
pub struct NixFile {
    path: Option<PathBuf>,
    mode: FileMode,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sections: Vec<NixSection>,
    dirty: bool,
}

impl NixFile {
    /// Open a container on disk
    pub fn open(path: impl AsRef<Path>, mode: FileMode) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();

        if mode == FileMode::Overwrite {
            let now = Utc::now();
            let mut file = Self {
                path: Some(path),
                mode,
                created_at: now,
                updated_at: now,
                sections: Vec::new(),
                dirty: true,
            };
            file.flush()?;
            return Ok(file);
        }

        let bytes = fs::read(&path).map_err(|source| ContainerError::Io {
            path: path.clone(),
            source,
        })?;
        let payload = decode(&path, &bytes)?;
        debug!(
            path = %path.display(),
            sections = payload.sections.len(),
            "Opened NIX container"
        );

        Ok(Self {
            path: Some(path),
            mode,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
            sections: payload.sections,
            dirty: false,
        })
    }

    /// A writable container that never touches disk
    pub fn in_memory() -> Self {
        let now = Utc::now();
        Self {
            path: None,
            mode: FileMode::ReadWrite,
            created_at: now,
            updated_at: now,
            sections: Vec::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Top-level sections in insertion order
    pub fn sections(&self) -> &[NixSection] {
        &self.sections
    }

    /// Append a complete top-level section
    pub fn push_section(&mut self, section: NixSection) -> Result<(), ContainerError> {
        if !self.mode.is_writable() {
            return Err(ContainerError::ReadOnly(self.display_path()));
        }
        self.sections.push(section);
        self.updated_at = Utc::now();
        self.dirty = true;
        Ok(())
    }

    /// Top-level sections matching `predicate`, at most `limit` of them
    pub fn find_sections<P>(&self, predicate: P, limit: usize) -> Vec<&NixSection>
    where
        P: Fn(&NixSection) -> bool,
    {
        self.sections
            .iter()
            .filter(|s| predicate(s))
            .take(limit)
            .collect()
    }

    /// Write pending changes to disk
    ///
    /// A no-op for read-only and in-memory containers.
    pub fn flush(&mut self) -> Result<(), ContainerError> {
        let Some(path) = self.path.as_ref() else {
            self.dirty = false;
            return Ok(());
        };
        if !self.mode.is_writable() || !self.dirty {
            return Ok(());
        }

        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|source| ContainerError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Flushed NIX container");
        self.dirty = false;
        Ok(())
    }

    /// Flush and release the container
    pub fn close(mut self) -> Result<(), ContainerError> {
        self.flush()
    }

    /// Encode the container in its on-disk layout
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContainerError> {
        let payload = PayloadRef {
            created_at: self.created_at,
            updated_at: self.updated_at,
            sections: &self.sections,
        };
        let body = bincode::serialize(&payload).map_err(|e| ContainerError::Encode(e.to_string()))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    fn display_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from("<memory>"))
    }
}

impl Drop for NixFile {
    fn drop(&mut self) {
        if self.dirty && self.mode.is_writable() {
            if let Err(e) = self.flush() {
                warn!(error = %e, "Failed to flush NIX container on drop");
            }
        }
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Payload, ContainerError> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(ContainerError::InvalidHeader(path.to_path_buf()));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[4..HEADER_LEN]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(ContainerError::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| ContainerError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.nix");
        NixFile::open(&path, FileMode::Overwrite)
            .unwrap()
            .close()
            .unwrap();

        let mut file = NixFile::open(&path, FileMode::ReadOnly).unwrap();
        let err = file
            .push_section(NixSection::new("s", "n.s.", "id"))
            .unwrap_err();
        assert!(matches!(err, ContainerError::ReadOnly(_)));
    }

    #[test]
    fn test_rejects_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.nix");
        fs::write(&path, b"<odML/>").unwrap();

        let err = NixFile::open(&path, FileMode::ReadOnly).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidHeader(_)));
    }

    #[test]
    fn test_rejects_future_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.nix");
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&99u32.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let err = NixFile::open(&path, FileMode::ReadOnly).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_find_sections_is_bounded() {
        let mut file = NixFile::in_memory();
        for i in 0..3 {
            file.push_section(NixSection::new("dup", "n.s.", format!("id-{}", i)))
                .unwrap();
        }
        assert_eq!(file.find_sections(|s| s.name == "dup", 2).len(), 2);
        assert!(file.find_sections(|s| s.name == "other", 2).is_empty());
    }
}
