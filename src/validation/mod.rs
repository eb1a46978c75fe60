//! Validation functionality
//!
//! Provides validation logic for:
//! - odML XML well-formedness
//! - Section and property identifiers in both tree models

pub mod tree;
pub mod xml;

pub use tree::{
    DuplicateId, EntityKind, MissingId, TreeValidationResult, validate_document,
    validate_nix_sections,
};
pub use xml::validate_xml;
