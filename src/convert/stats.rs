//! Conversion statistics
//!
//! A `ConversionStats` lives for exactly one top-level conversion call. The
//! tree converter owns it and threads it through the traversal; callers only
//! ever see the immutable `ConversionReport` it produces.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::CoercionError;

/// Counters accumulated during one conversion
#[derive(Debug, Default)]
pub struct ConversionStats {
    sections_read: usize,
    sections_written: usize,
    properties_read: usize,
    properties_written: usize,
    skipped_empty_properties: usize,
    skipped_binary_values: usize,
    skipped_none_values: usize,
    type_errors: usize,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section_read(&mut self) {
        self.sections_read += 1;
    }

    pub fn section_written(&mut self) {
        self.sections_written += 1;
    }

    pub fn property_read(&mut self) {
        self.properties_read += 1;
    }

    pub fn property_written(&mut self) {
        self.properties_written += 1;
    }

    pub fn empty_property_skipped(&mut self) {
        self.skipped_empty_properties += 1;
    }

    /// A property failed as a whole (e.g. mixed native types)
    pub fn property_rejected(&mut self) {
        self.type_errors += 1;
    }

    /// Count a dropped value under the matching counter
    pub fn value_dropped(&mut self, reason: &CoercionError) {
        match reason {
            CoercionError::BinarySkipped => self.skipped_binary_values += 1,
            CoercionError::EmptySkipped => self.skipped_none_values += 1,
            CoercionError::TypeCoercion { .. } => self.type_errors += 1,
        }
    }

    /// Freeze the counters into a report
    pub fn finish(self) -> ConversionReport {
        ConversionReport {
            sections_read: self.sections_read,
            sections_written: self.sections_written,
            properties_read: self.properties_read,
            properties_written: self.properties_written,
            skipped_empty_properties: self.skipped_empty_properties,
            skipped_binary_values: self.skipped_binary_values,
            skipped_none_values: self.skipped_none_values,
            type_errors: self.type_errors,
        }
    }
}

/// Final statistics of a conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub sections_read: usize,
    pub sections_written: usize,
    pub properties_read: usize,
    pub properties_written: usize,
    pub skipped_empty_properties: usize,
    pub skipped_binary_values: usize,
    pub skipped_none_values: usize,
    pub type_errors: usize,
}

impl ConversionReport {
    /// Add another report's counters to this one (batch totals)
    pub fn merge(&mut self, other: &ConversionReport) {
        self.sections_read += other.sections_read;
        self.sections_written += other.sections_written;
        self.properties_read += other.properties_read;
        self.properties_written += other.properties_written;
        self.skipped_empty_properties += other.skipped_empty_properties;
        self.skipped_binary_values += other.skipped_binary_values;
        self.skipped_none_values += other.skipped_none_values;
        self.type_errors += other.type_errors;
    }

    /// Whether anything was lost on the way
    pub fn is_lossless(&self) -> bool {
        self.skipped_empty_properties == 0
            && self.skipped_binary_values == 0
            && self.skipped_none_values == 0
            && self.type_errors == 0
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion summary:")?;
        writeln!(
            f,
            "  Sections:   {} read, {} written",
            self.sections_read, self.sections_written
        )?;
        writeln!(
            f,
            "  Properties: {} read, {} written",
            self.properties_read, self.properties_written
        )?;
        writeln!(
            f,
            "  Skipped:    {} empty properties, {} binary values, {} empty values",
            self.skipped_empty_properties, self.skipped_binary_values, self.skipped_none_values
        )?;
        write!(f, "  Type errors: {}", self.type_errors)
    }
}
