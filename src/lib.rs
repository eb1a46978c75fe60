//! odML ↔ NIX metadata converter
//!
//! Provides:
//! - Both metadata tree models (odML documents, NIX section trees)
//! - Bidirectional tree conversion with value coercion and statistics
//! - odML XML import/export
//! - The NIX container file
//! - Identifier validation
//!
//! # Example
//!
//! ```rust
//! use nix_odml_converter::container::NixFile;
//! use nix_odml_converter::convert::{ConversionConfig, nix_to_odml, odml_to_nix};
//! use nix_odml_converter::models::{Document, Property, Section, ValueKind};
//!
//! let document = Document::new().with_section(
//!     Section::new("recording")
//!         .with_property(Property::new("channels").with_dtype(ValueKind::Int).with_values([1, 2, 3])),
//! );
//!
//! let config = ConversionConfig::default();
//! let mut file = NixFile::in_memory();
//! let report = odml_to_nix(&document, &mut file, &config).unwrap();
//! assert_eq!(report.properties_written, 1);
//!
//! let (back, _) = nix_to_odml(&file, &config).unwrap();
//! assert_eq!(back.sections[0].properties[0].dtype, Some(ValueKind::Int));
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod container;
pub mod convert;
pub mod export;
pub mod import;
pub mod models;
pub mod validation;

pub use container::{ContainerError, FileMode, NixFile};
pub use convert::{
    ConversionConfig, ConversionError, ConversionReport, convert_file, nix_to_odml, odml_to_nix,
};
pub use export::{ExportError, OdmlExporter};
pub use import::{ImportError, OdmlImporter};
pub use models::{Document, NixProperty, NixSection, Property, Section, Value, ValueKind};
pub use validation::{TreeValidationResult, validate_document, validate_nix_sections};
