//! Validate command implementation

use std::path::Path;

use crate::cli::error::CliError;
use crate::cli::output::{ReportFormat, render_structured};
use crate::container::{FileMode, NixFile};
use crate::convert::Direction;
use crate::import::OdmlImporter;
use crate::validation::{
    TreeValidationResult, validate_document, validate_nix_sections, validate_xml,
};

/// Validate an odML XML or NIX file
pub fn validate_file(input: &Path) -> Result<TreeValidationResult, CliError> {
    if !input.exists() {
        return Err(CliError::FileNotFound(input.to_path_buf()));
    }

    match Direction::from_path(input)? {
        Direction::OdmlToNix => {
            let content = std::fs::read_to_string(input)
                .map_err(|e| CliError::FileReadError(input.to_path_buf(), e.to_string()))?;
            validate_xml(&content).map_err(|e| CliError::ValidationError(format!("{:#}", e)))?;
            let document = OdmlImporter::new().import(&content)?;
            Ok(validate_document(&document))
        }
        Direction::NixToOdml => {
            let file = NixFile::open(input, FileMode::ReadOnly)?;
            Ok(validate_nix_sections(file.sections()))
        }
    }
}

/// Handle the validate command
pub fn handle_validate(input: &Path, format: ReportFormat) -> Result<(), CliError> {
    let result = validate_file(input)?;

    if format == ReportFormat::Text {
        for duplicate in &result.duplicate_ids {
            println!("Duplicate id {}: {}", duplicate.id, duplicate.paths.join(", "));
        }
        for missing in &result.missing_ids {
            println!("Missing id: {}", missing.path);
        }
    } else {
        println!("{}", render_structured(&result, format)?);
    }

    if !result.is_valid() {
        return Err(CliError::ValidationError(format!(
            "{} duplicate and {} missing identifiers",
            result.duplicate_ids.len(),
            result.missing_ids.len()
        )));
    }

    if format == ReportFormat::Text {
        println!(
            "Validation successful ({} sections, {} properties)",
            result.sections_checked, result.properties_checked
        );
    }
    Ok(())
}
