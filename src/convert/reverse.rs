//! NIX → odML tree conversion

use tracing::{debug, info, warn};

use super::coerce::{coerce_reverse, reverse_kind};
use super::config::ConversionConfig;
use super::document::{attribute_id, attribute_value, document_from_root, find_document_root};
use super::error::ConversionError;
use super::stats::{ConversionReport, ConversionStats};
use crate::container::NixFile;
use crate::models::{Document, NixProperty, NixSection, Property, Section};

/// Rebuild an odML document from the document root in `file`
///
/// Exactly one top-level section must carry the configured document root
/// name; zero or several is a structural error and no document is produced.
pub fn nix_to_odml(
    file: &NixFile,
    config: &ConversionConfig,
) -> Result<(Document, ConversionReport), ConversionError> {
    let root = find_document_root(file, config)?;
    info!(
        document = %root.id,
        sections = root.sections.len(),
        "Converting NIX document root to odML"
    );

    let mut document = document_from_root(root);
    let mut converter = ReverseConverter::new(config);
    document.sections = converter.convert_sections(&root.sections);

    Ok((document, converter.stats.finish()))
}

struct ReverseConverter<'a> {
    config: &'a ConversionConfig,
    stats: ConversionStats,
}

impl<'a> ReverseConverter<'a> {
    fn new(config: &'a ConversionConfig) -> Self {
        Self {
            config,
            stats: ConversionStats::new(),
        }
    }

    fn convert_sections(&mut self, sections: &[NixSection]) -> Vec<Section> {
        sections.iter().map(|s| self.convert_section(s)).collect()
    }

    fn convert_section(&mut self, nix: &NixSection) -> Section {
        self.stats.section_read();
        debug!(section = %nix.name, id = %nix.id, "Converting section");

        let mut section = Section::new(&nix.name)
            .with_id(&nix.id)
            .with_type(&nix.section_type);
        section.definition = nix.definition.clone();

        for property in &nix.properties {
            if self.absorb_section_attribute(&mut section, property) {
                continue;
            }
            self.stats.property_read();
            if let Some(converted) = self.convert_property(property) {
                section.properties.push(converted);
                self.stats.property_written();
            }
        }

        section.sections = self.convert_sections(&nix.sections);
        self.stats.section_written();
        section
    }

    /// Move a synthetic `reference`/`repository` property back onto the section
    ///
    /// Only properties carrying the derived attribute id are absorbed, so a
    /// user property that happens to share the name stays a property.
    fn absorb_section_attribute(&self, section: &mut Section, property: &NixProperty) -> bool {
        let name = property.name.as_str();
        if property.id != attribute_id(&section.id, name) {
            return false;
        }
        let slot = match name {
            "reference" => &mut section.reference,
            "repository" => &mut section.repository,
            _ => return false,
        };
        if slot.is_some() {
            return false;
        }
        match attribute_value(property) {
            Some(text) => {
                *slot = Some(text.to_string());
                true
            }
            None => false,
        }
    }

    fn convert_property(&mut self, nix: &NixProperty) -> Option<Property> {
        if let Some(Err(unknown)) = nix.kind_tag() {
            warn!(property = %nix.name, error = %unknown, "Ignoring unrecognized kind tag");
        }
        let kind = reverse_kind(nix, self.config);

        let mut values = Vec::with_capacity(nix.values().len());
        for value in nix.values() {
            match coerce_reverse(value, kind) {
                Ok((typed, _)) => values.push(typed),
                Err(reason) => {
                    warn!(property = %nix.name, reason = %reason, "Dropping value");
                    self.stats.value_dropped(&reason);
                }
            }
        }

        if values.is_empty() && !(nix.values().is_empty() && self.config.keep_empty_properties) {
            warn!(property = %nix.name, "Dropping property: no value could be converted");
            self.stats.empty_property_skipped();
            return None;
        }

        Some(Property {
            id: nix.id.clone(),
            name: Some(nix.name.clone()),
            definition: nix.definition.clone(),
            dtype: kind,
            unit: nix.unit.clone(),
            uncertainty: nix.uncertainty.clone(),
            reference: nix.reference.clone(),
            dependency: nix.dependency.clone(),
            dependency_value: nix.dependency_value.clone(),
            value_origin: nix.value_origin.clone(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::document::{DOCUMENT_SECTION_TYPE, attribute_property};
    use crate::models::{Datum, NixValue, ValueKind};

    fn file_with(section: NixSection) -> NixFile {
        let mut root = NixSection::new("odML document", DOCUMENT_SECTION_TYPE, "doc-id");
        root.push_section(section);
        let mut file = NixFile::in_memory();
        file.push_section(root).unwrap();
        file
    }

    #[test]
    fn test_untagged_tuples_are_reconstructed() {
        let prop = NixProperty::new("pairs", "p1", vec!["(1; 2)".into(), "(3; 4)".into()]).unwrap();
        let mut section = NixSection::new("sec", "n.s.", "s1");
        section.push_property(prop);

        let (document, _) = nix_to_odml(&file_with(section), &ConversionConfig::default()).unwrap();
        let prop = &document.sections[0].properties[0];
        assert_eq!(prop.dtype, Some(ValueKind::Tuple(2)));
        assert_eq!(
            prop.values[1].datum,
            Some(Datum::Tuple(vec!["3".to_string(), "4".to_string()]))
        );
    }

    #[test]
    fn test_tuple_heuristic_can_be_disabled() {
        let prop = NixProperty::new("pairs", "p1", vec!["(1; 2)".into()]).unwrap();
        let mut section = NixSection::new("sec", "n.s.", "s1");
        section.push_property(prop);

        let config = ConversionConfig::builder().reconstruct_tuples(false).build();
        let (document, _) = nix_to_odml(&file_with(section), &config).unwrap();
        assert_eq!(document.sections[0].properties[0].dtype, Some(ValueKind::String));
    }

    #[test]
    fn test_unknown_tag_falls_back_to_native_type() {
        let mut prop = NixProperty::new("n", "p1", vec![NixValue::from(3)]).unwrap();
        prop.odml_type = Some("quaternion".to_string());
        let mut section = NixSection::new("sec", "n.s.", "s1");
        section.push_property(prop);

        let (document, report) =
            nix_to_odml(&file_with(section), &ConversionConfig::default()).unwrap();
        assert_eq!(document.sections[0].properties[0].dtype, Some(ValueKind::Int));
        assert!(report.is_lossless());
    }

    #[test]
    fn test_section_attributes_are_absorbed() {
        let mut section = NixSection::new("sec", "n.s.", "s1");
        section.push_property(attribute_property(
            "s1",
            "reference",
            "ref-1".to_string(),
            ValueKind::String,
        ));
        section.push_property(attribute_property(
            "s1",
            "repository",
            "http://x".to_string(),
            ValueKind::Url,
        ));

        let (document, report) =
            nix_to_odml(&file_with(section), &ConversionConfig::default()).unwrap();
        let section = &document.sections[0];
        assert_eq!(section.reference.as_deref(), Some("ref-1"));
        assert_eq!(section.repository.as_deref(), Some("http://x"));
        assert!(section.properties.is_empty());
        assert_eq!(report.properties_read, 0);
    }

    #[test]
    fn test_user_property_named_like_an_attribute_is_kept() {
        let mut section = NixSection::new("sec", "n.s.", "s1");
        let user = NixProperty::new("reference", "user-prop", vec!["Smith 2011".into()]).unwrap();
        section.push_property(user);

        let (document, report) =
            nix_to_odml(&file_with(section), &ConversionConfig::default()).unwrap();
        let section = &document.sections[0];
        assert_eq!(section.reference, None);
        assert_eq!(section.properties.len(), 1);
        assert_eq!(section.properties[0].id, "user-prop");
        assert_eq!(report.properties_read, 1);
        assert_eq!(report.properties_written, 1);
    }
}
