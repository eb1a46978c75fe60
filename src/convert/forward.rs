//! odML → NIX tree conversion

use tracing::{debug, info, warn};

use super::coerce::{coerce_forward, forward_kind, native_type};
use super::config::ConversionConfig;
use super::document::{attribute_property, document_root_section};
use super::error::ConversionError;
use super::stats::{ConversionReport, ConversionStats};
use crate::container::NixFile;
use crate::models::{Document, NixProperty, NixSection, Property, Section, ValueKind};

/// Convert an odML document into `file`
///
/// Adds one document root section to the container, with the document's
/// sections below it. Fails without touching the container if it already
/// holds a document root.
pub fn odml_to_nix(
    document: &Document,
    file: &mut NixFile,
    config: &ConversionConfig,
) -> Result<ConversionReport, ConversionError> {
    let name = config.document_section_name.as_str();
    let existing = file.find_sections(|s| s.name == name, usize::MAX).len();
    if existing > 0 {
        return Err(ConversionError::MultipleDocumentRoots {
            name: name.to_string(),
            count: existing + 1,
        });
    }

    info!(
        document = %document.id,
        sections = document.sections.len(),
        "Converting odML document to NIX"
    );

    let mut converter = ForwardConverter::new(config);
    let mut root = document_root_section(document, config);
    root.sections = converter.convert_sections(&document.sections);
    file.push_section(root)?;

    Ok(converter.stats.finish())
}

struct ForwardConverter<'a> {
    config: &'a ConversionConfig,
    stats: ConversionStats,
}

impl<'a> ForwardConverter<'a> {
    fn new(config: &'a ConversionConfig) -> Self {
        Self {
            config,
            stats: ConversionStats::new(),
        }
    }

    fn convert_sections(&mut self, sections: &[Section]) -> Vec<NixSection> {
        sections.iter().map(|s| self.convert_section(s)).collect()
    }

    /// Build a complete destination section, children included
    fn convert_section(&mut self, section: &Section) -> NixSection {
        self.stats.section_read();
        debug!(section = %section.display_name(), id = %section.id, "Converting section");

        let mut nix = NixSection::new(section.display_name(), section.type_or_default(), &section.id);
        nix.definition = section.definition.clone();

        if let Some(reference) = &section.reference {
            nix.push_property(attribute_property(
                &section.id,
                "reference",
                reference.clone(),
                ValueKind::String,
            ));
        }
        if let Some(repository) = &section.repository {
            nix.push_property(attribute_property(
                &section.id,
                "repository",
                repository.clone(),
                ValueKind::Url,
            ));
        }

        for property in &section.properties {
            self.stats.property_read();
            if let Some(converted) = self.convert_property(property) {
                nix.push_property(converted);
                self.stats.property_written();
            }
        }

        nix.sections = self.convert_sections(&section.sections);
        self.stats.section_written();
        nix
    }

    fn convert_property(&mut self, property: &Property) -> Option<NixProperty> {
        let name = property.display_name();
        let (kind, tag) = forward_kind(property);

        if property.values.is_empty() {
            if !self.config.keep_empty_properties {
                debug!(property = %name, "Dropping property without values");
                self.stats.empty_property_skipped();
                return None;
            }
            let empty = NixProperty::empty(name, &property.id, native_type(kind));
            return Some(self.finish_property(empty, property, tag));
        }

        let mut values = Vec::with_capacity(property.values.len());
        for value in &property.values {
            match coerce_forward(value, kind) {
                Ok(native) => values.push(native),
                Err(reason) => {
                    warn!(property = %name, kind = %kind, reason = %reason, "Dropping value");
                    self.stats.value_dropped(&reason);
                }
            }
        }

        if values.is_empty() {
            warn!(property = %name, "Dropping property: no value could be converted");
            self.stats.empty_property_skipped();
            return None;
        }

        match NixProperty::new(name, &property.id, values) {
            Ok(nix) => Some(self.finish_property(nix, property, tag)),
            Err(e) => {
                warn!(property = %name, error = %e, "Dropping property");
                self.stats.property_rejected();
                None
            }
        }
    }

    fn finish_property(
        &self,
        mut nix: NixProperty,
        property: &Property,
        tag: Option<ValueKind>,
    ) -> NixProperty {
        nix.definition = property.definition.clone();
        nix.unit = property.unit.clone();
        nix.uncertainty = property.uncertainty.clone();
        nix.reference = property.reference.clone();
        nix.dependency = property.dependency.clone();
        nix.dependency_value = property.dependency_value.clone();
        nix.value_origin = property.value_origin.clone();
        nix.odml_type = tag.map(|kind| kind.to_string());
        nix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataType, Datum, NativeDatum};

    fn convert(document: &Document) -> (NixFile, ConversionReport) {
        let mut file = NixFile::in_memory();
        let report = odml_to_nix(document, &mut file, &ConversionConfig::default()).unwrap();
        (file, report)
    }

    #[test]
    fn test_section_reference_becomes_property() {
        let section = Section::new("sec")
            .with_id("s1")
            .with_reference("ref-1")
            .with_repository("http://example.org/terms");
        let (file, report) = convert(&Document::new().with_section(section));

        let nix = &file.sections()[0].sections[0];
        assert_eq!(nix.properties.len(), 2);
        let reference = nix.property("reference").unwrap();
        assert_eq!(reference.values()[0].data.as_str(), Some("ref-1"));
        assert_eq!(reference.id, "s1:reference");
        // synthetic properties are not counted
        assert_eq!(report.properties_read, 0);
        assert_eq!(report.properties_written, 0);
    }

    #[test]
    fn test_mixed_untagged_values_become_strings() {
        let prop = Property::new("mixed").with_value(1).with_value(Datum::Boolean(true));
        let section = Section::new("sec").with_property(prop);
        let (file, _) = convert(&Document::new().with_section(section));

        let nix = file.sections()[0].sections[0].property("mixed").unwrap();
        assert_eq!(nix.data_type(), DataType::String);
        assert_eq!(nix.values()[1].data, NativeDatum::String("true".to_string()));
        assert!(nix.odml_type.is_none());
    }

    #[test]
    fn test_empty_property_can_be_dropped() {
        let section = Section::new("sec").with_property(Property::new("nothing"));
        let document = Document::new().with_section(section);
        let config = ConversionConfig::builder().keep_empty_properties(false).build();

        let mut file = NixFile::in_memory();
        let report = odml_to_nix(&document, &mut file, &config).unwrap();
        assert!(file.sections()[0].sections[0].properties.is_empty());
        assert_eq!(report.skipped_empty_properties, 1);
    }

    #[test]
    fn test_refuses_second_document() {
        let mut file = NixFile::in_memory();
        let config = ConversionConfig::default();
        odml_to_nix(&Document::new(), &mut file, &config).unwrap();

        let err = odml_to_nix(&Document::new(), &mut file, &config).unwrap_err();
        assert!(matches!(err, ConversionError::MultipleDocumentRoots { count: 2, .. }));
        assert_eq!(file.sections().len(), 1);
    }
}
