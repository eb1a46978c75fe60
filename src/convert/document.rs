//! Document/root adapter
//!
//! NIX trees have no document. The odML document becomes one top-level
//! section (the document root) whose properties carry `author`, `date`,
//! `version` and `repository`, and whose id is the document id. Its children
//! are the document's root sections.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::config::ConversionConfig;
use super::error::ConversionError;
use crate::container::NixFile;
use crate::models::literal::{self, DATE_FORMAT};
use crate::models::{Document, NativeDatum, NixProperty, NixSection, NixValue, ValueKind};

/// Section type of the document root
pub const DOCUMENT_SECTION_TYPE: &str = "odML document";

const AUTHOR: &str = "author";
const DATE: &str = "date";
const VERSION: &str = "version";
const REPOSITORY: &str = "repository";

/// Build the document root section (without children)
pub fn document_root_section(document: &Document, config: &ConversionConfig) -> NixSection {
    let mut root = NixSection::new(
        &config.document_section_name,
        DOCUMENT_SECTION_TYPE,
        &document.id,
    );

    if let Some(author) = &document.author {
        root.push_property(attribute_property(
            &document.id,
            AUTHOR,
            author.clone(),
            ValueKind::Person,
        ));
    }
    if let Some(date) = &document.date {
        let text = date.format(DATE_FORMAT).to_string();
        root.push_property(attribute_property(&document.id, DATE, text, ValueKind::Date));
    }
    if let Some(version) = &document.version {
        root.push_property(attribute_property(
            &document.id,
            VERSION,
            version.clone(),
            ValueKind::String,
        ));
    }
    if let Some(repository) = &document.repository {
        root.push_property(attribute_property(
            &document.id,
            REPOSITORY,
            repository.clone(),
            ValueKind::Url,
        ));
    }
    root
}

/// Id of the property carrying attribute `name` of the entity `owner_id`
pub(crate) fn attribute_id(owner_id: &str, name: &str) -> String {
    format!("{}:{}", owner_id, name)
}

/// A single-valued string property standing in for an attribute NIX lacks
pub(crate) fn attribute_property(
    owner_id: &str,
    name: &str,
    value: String,
    kind: ValueKind,
) -> NixProperty {
    let value = NixValue::new(NativeDatum::String(value));
    NixProperty::single(name, attribute_id(owner_id, name), value).with_odml_type(kind)
}

/// The string value of an attribute property written by `attribute_property`
pub(crate) fn attribute_value(property: &NixProperty) -> Option<&str> {
    match property.values() {
        [only] if property.definition.is_none() => only.data.as_str(),
        _ => None,
    }
}

/// Locate the single document root among the container's top-level sections
pub fn find_document_root<'a>(
    file: &'a NixFile,
    config: &ConversionConfig,
) -> Result<&'a NixSection, ConversionError> {
    let name = config.document_section_name.as_str();
    let is_root = |s: &NixSection| s.name == name;

    match file.find_sections(is_root, 2).as_slice() {
        [] => Err(ConversionError::MissingDocumentRoot(name.to_string())),
        [root] => Ok(*root),
        _ => Err(ConversionError::MultipleDocumentRoots {
            name: name.to_string(),
            count: file.sections().iter().filter(|s| is_root(s)).count(),
        }),
    }
}

/// Rebuild the document attributes from the root section (without sections)
pub fn document_from_root(root: &NixSection) -> Document {
    let mut document = Document::new().with_id(&root.id);

    for property in &root.properties {
        let Some(text) = attribute_value(property) else {
            debug!(property = %property.name, "Ignoring non-attribute property on document root");
            continue;
        };
        match property.name.as_str() {
            AUTHOR => document.author = Some(text.to_string()),
            DATE => document.date = parse_document_date(text),
            VERSION => document.version = Some(text.to_string()),
            REPOSITORY => document.repository = Some(text.to_string()),
            other => debug!(property = %other, "Ignoring unknown document attribute"),
        }
    }
    document
}

fn parse_document_date(text: &str) -> Option<NaiveDate> {
    let date = literal::parse_date(text).or_else(|| literal::parse_datetime(text).map(|dt| dt.date()));
    if date.is_none() {
        warn!(value = %text, "Dropping malformed document date");
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_round_trip_through_root() {
        let date = NaiveDate::from_ymd_opt(2011, 12, 1).unwrap();
        let document = Document::new()
            .with_author("Jane Doe")
            .with_date(date)
            .with_version("1.0")
            .with_repository("http://portal.g-node.org/odml/terminologies/v1.1/");

        let root = document_root_section(&document, &ConversionConfig::default());
        assert_eq!(root.id, document.id);
        assert_eq!(root.properties.len(), 4);
        let date_property = root.property("date").unwrap();
        assert_eq!(date_property.odml_type.as_deref(), Some("date"));
        assert_eq!(date_property.id, format!("{}:date", document.id));

        let back = document_from_root(&root);
        assert_eq!(back.id, document.id);
        assert_eq!(back.author.as_deref(), Some("Jane Doe"));
        assert_eq!(back.date, Some(date));
        assert_eq!(back.version.as_deref(), Some("1.0"));
        assert!(back.sections.is_empty());
    }

    #[test]
    fn test_malformed_date_is_dropped() {
        let mut root = NixSection::new("odML document", DOCUMENT_SECTION_TYPE, "doc");
        root.push_property(attribute_property(
            "doc",
            DATE,
            "yesterday".to_string(),
            ValueKind::Date,
        ));
        assert_eq!(document_from_root(&root).date, None);
    }
}
