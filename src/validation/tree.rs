//! Tree identifier validation
//!
//! Every section and property must carry a non-empty identifier that is
//! unique within its tree. Findings are reported, never fatal.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Document, NixSection, Section};

/// Kind of entity an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Section,
    Property,
}

/// An identifier used by more than one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateId {
    pub id: String,
    /// Slash-separated paths of every entity carrying the id
    pub paths: Vec<String>,
}

/// An entity without an identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingId {
    pub kind: EntityKind,
    pub path: String,
}

/// Result of tree validation.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "validation results should be checked for duplicate and missing ids"]
pub struct TreeValidationResult {
    pub duplicate_ids: Vec<DuplicateId>,
    pub missing_ids: Vec<MissingId>,
    pub sections_checked: usize,
    pub properties_checked: usize,
}

impl TreeValidationResult {
    pub fn is_valid(&self) -> bool {
        self.duplicate_ids.is_empty() && self.missing_ids.is_empty()
    }
}

#[derive(Default)]
struct IdCollector {
    /// id → paths, in first-seen order
    seen: HashMap<String, Vec<String>>,
    order: Vec<String>,
    result: TreeValidationResult,
}

impl IdCollector {
    fn record(&mut self, kind: EntityKind, id: &str, path: String) {
        match kind {
            EntityKind::Section => self.result.sections_checked += 1,
            EntityKind::Property => self.result.properties_checked += 1,
        }
        if id.trim().is_empty() {
            self.result.missing_ids.push(MissingId { kind, path });
            return;
        }
        let paths = self.seen.entry(id.to_string()).or_insert_with(|| {
            self.order.push(id.to_string());
            Vec::new()
        });
        paths.push(path);
    }

    fn finish(mut self) -> TreeValidationResult {
        for id in self.order {
            if let Some(paths) = self.seen.remove(&id) {
                if paths.len() > 1 {
                    self.result.duplicate_ids.push(DuplicateId { id, paths });
                }
            }
        }
        self.result
    }
}

/// Validate identifiers of an odML document
pub fn validate_document(document: &Document) -> TreeValidationResult {
    let mut collector = IdCollector::default();
    for section in &document.sections {
        collect_section(&mut collector, section, "");
    }
    collector.finish()
}

fn collect_section(collector: &mut IdCollector, section: &Section, parent: &str) {
    let path = format!("{}/{}", parent, section.display_name());
    collector.record(EntityKind::Section, &section.id, path.clone());
    for property in &section.properties {
        let property_path = format!("{}:{}", path, property.display_name());
        collector.record(EntityKind::Property, &property.id, property_path);
    }
    for child in &section.sections {
        collect_section(collector, child, &path);
    }
}

/// Validate identifiers of a NIX section tree
pub fn validate_nix_sections(sections: &[NixSection]) -> TreeValidationResult {
    let mut collector = IdCollector::default();
    for section in sections {
        collect_nix_section(&mut collector, section, "");
    }
    collector.finish()
}

fn collect_nix_section(collector: &mut IdCollector, section: &NixSection, parent: &str) {
    let path = format!("{}/{}", parent, section.name);
    collector.record(EntityKind::Section, &section.id, path.clone());
    for property in &section.properties {
        let property_path = format!("{}:{}", path, property.name);
        collector.record(EntityKind::Property, &property.id, property_path);
    }
    for child in &section.sections {
        collect_nix_section(collector, child, &path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NixProperty, Property};

    #[test]
    fn test_generated_ids_are_valid() {
        let document = Document::new().with_section(
            Section::new("a")
                .with_property(Property::new("p"))
                .with_section(Section::new("b")),
        );
        let result = validate_document(&document);
        assert!(result.is_valid());
        assert_eq!(result.sections_checked, 2);
        assert_eq!(result.properties_checked, 1);
    }

    #[test]
    fn test_duplicates_are_reported_with_paths() {
        let document = Document::new()
            .with_section(Section::new("a").with_id("same"))
            .with_section(Section::new("b").with_property(Property::new("p").with_id("same")));
        let result = validate_document(&document);
        assert_eq!(result.duplicate_ids.len(), 1);
        assert_eq!(result.duplicate_ids[0].paths, vec!["/a", "/b:p"]);
    }

    #[test]
    fn test_empty_nix_ids_are_reported() {
        let mut section = NixSection::new("s", "n.s.", "");
        section.push_property(NixProperty::new("p", "p-1", vec!["x".into()]).unwrap());
        let result = validate_nix_sections(&[section]);
        assert_eq!(result.missing_ids.len(), 1);
        assert_eq!(result.missing_ids[0].kind, EntityKind::Section);
    }
}
