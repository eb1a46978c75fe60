//! Configuration for tree conversion

use serde::{Deserialize, Serialize};

/// Name of the root section that carries document attributes in a NIX tree
pub const DEFAULT_DOCUMENT_SECTION_NAME: &str = "odML document";

/// Configuration for tree conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionConfig {
    /// Rebuild untagged `(a; b)` string populations as tuples on reverse conversion
    pub reconstruct_tuples: bool,

    /// Infer a kind for untagged string populations on reverse conversion
    /// (int, float, boolean, datetime, date, time, or text for multi-line strings)
    pub infer_string_kinds: bool,

    /// Carry over properties that had no values in the source tree
    pub keep_empty_properties: bool,

    /// Name of the root section standing in for the odML document
    pub document_section_name: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            reconstruct_tuples: true,
            infer_string_kinds: false,
            keep_empty_properties: true,
            document_section_name: DEFAULT_DOCUMENT_SECTION_NAME.to_string(),
        }
    }
}

impl ConversionConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Debug, Default)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    /// Enable or disable the untagged tuple heuristic
    pub fn reconstruct_tuples(mut self, reconstruct: bool) -> Self {
        self.config.reconstruct_tuples = reconstruct;
        self
    }

    /// Enable or disable kind inference over untagged strings
    pub fn infer_string_kinds(mut self, infer: bool) -> Self {
        self.config.infer_string_kinds = infer;
        self
    }

    /// Keep or drop properties that had no values to begin with
    pub fn keep_empty_properties(mut self, keep: bool) -> Self {
        self.config.keep_empty_properties = keep;
        self
    }

    /// Set the document root section name; blank names keep the default
    pub fn document_section_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.config.document_section_name = name;
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConversionConfig {
        self.config
    }
}
