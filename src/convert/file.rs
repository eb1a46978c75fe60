//! File-level conversion
//!
//! Picks the direction from the input extension and wires the XML reader and
//! writer, the container and the tree converter together.

use std::path::{Path, PathBuf};
use tracing::info;

use super::config::ConversionConfig;
use super::error::ConversionError;
use super::forward::odml_to_nix;
use super::reverse::nix_to_odml;
use super::stats::ConversionReport;
use crate::container::{FileMode, NixFile};
use crate::export::OdmlExporter;
use crate::import::{ImportError, OdmlImporter};
use crate::validation::validate_xml;

/// Conversion direction, inferred from the source file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `.xml` / `.odml` → `.nix`
    OdmlToNix,
    /// `.nix` → `.xml`
    NixToOdml,
}

impl Direction {
    /// Direction for a source path; unknown extensions are an error
    pub fn from_path(path: &Path) -> Result<Self, ConversionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xml" | "odml" => Ok(Direction::OdmlToNix),
            "nix" => Ok(Direction::NixToOdml),
            _ => Err(ConversionError::UnsupportedFormat(format!(
                "{} (expected .xml, .odml or .nix)",
                path.display()
            ))),
        }
    }

    /// Extension of the files this direction produces
    pub fn output_extension(&self) -> &'static str {
        match self {
            Direction::OdmlToNix => "nix",
            Direction::NixToOdml => "xml",
        }
    }
}

/// Output path for `input`: same file stem, swapped extension, in `output_dir`
pub fn output_path(input: &Path, output_dir: &Path) -> Result<PathBuf, ConversionError> {
    let direction = Direction::from_path(input)?;
    let stem = input
        .file_stem()
        .ok_or_else(|| ConversionError::UnsupportedFormat(input.display().to_string()))?;
    let mut path = output_dir.join(stem);
    path.set_extension(direction.output_extension());
    Ok(path)
}

/// Convert `input` into `output`, overwriting it
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
) -> Result<ConversionReport, ConversionError> {
    let direction = Direction::from_path(input)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        ?direction,
        "Converting file"
    );

    match direction {
        Direction::OdmlToNix => {
            let content = std::fs::read_to_string(input)
                .map_err(|e| ImportError::IoError(format!("{}: {}", input.display(), e)))?;
            validate_xml(&content)
                .map_err(|e| ImportError::ValidationError(format!("{:#}", e)))?;
            let document = OdmlImporter::new().import(&content)?;
            let mut file = NixFile::open(output, FileMode::Overwrite)?;
            let report = odml_to_nix(&document, &mut file, config)?;
            file.close()?;
            Ok(report)
        }
        Direction::NixToOdml => {
            let file = NixFile::open(input, FileMode::ReadOnly)?;
            let (document, report) = nix_to_odml(&file, config)?;
            OdmlExporter::new().export_to_path(&document, output)?;
            Ok(report)
        }
    }
}
