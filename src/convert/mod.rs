//! Bidirectional odML ↔ NIX tree conversion
//!
//! The tree converter walks one tree depth-first and builds the other,
//! running every value through the coercion engine and counting what was
//! dropped. Each top-level call owns its own statistics.

pub mod coerce;
pub mod config;
pub mod document;
pub mod error;
pub mod file;
pub mod forward;
pub mod reverse;
pub mod stats;

pub use coerce::{coerce_forward, coerce_reverse};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use document::DOCUMENT_SECTION_TYPE;
pub use error::{CoercionError, ConversionError};
pub use file::{Direction, convert_file, output_path};
pub use forward::odml_to_nix;
pub use reverse::nix_to_odml;
pub use stats::{ConversionReport, ConversionStats};
