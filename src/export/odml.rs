//! odML XML exporter
//!
//! Writes the format read by `OdmlImporter`, one `<value>` element per datum.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write};
use std::path::Path;

use super::ExportError;
use crate::import::odml::is_list_literal;
use crate::models::literal::DATE_FORMAT;
use crate::models::{Datum, Document, Property, Section, Value};

/// odML format version written to the root element
pub const ODML_FORMAT_VERSION: &str = "1.1";

/// odML Exporter
#[derive(Debug, Default)]
pub struct OdmlExporter;

impl OdmlExporter {
    /// Create a new OdmlExporter
    pub fn new() -> Self {
        Self
    }

    /// Export a document to odML XML
    ///
    /// # Example
    ///
    /// ```rust
    /// use nix_odml_converter::export::OdmlExporter;
    /// use nix_odml_converter::models::{Document, Section};
    ///
    /// let document = Document::new().with_section(Section::new("recording"));
    /// let xml = OdmlExporter::new().export(&document).unwrap();
    /// assert!(xml.contains("<name>recording</name>"));
    /// ```
    pub fn export(&self, document: &Document) -> Result<String, ExportError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        let mut root = BytesStart::new("odML");
        root.push_attribute(("version", ODML_FORMAT_VERSION));
        writer.write_event(Event::Start(root)).map_err(xml_error)?;

        write_text(&mut writer, "id", &document.id)?;
        write_optional(&mut writer, "author", document.author.as_deref())?;
        if let Some(date) = &document.date {
            write_text(&mut writer, "date", &date.format(DATE_FORMAT).to_string())?;
        }
        write_optional(&mut writer, "version", document.version.as_deref())?;
        write_optional(&mut writer, "repository", document.repository.as_deref())?;
        for section in &document.sections {
            write_section(&mut writer, section)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("odML")))
            .map_err(xml_error)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| ExportError::SerializationError(e.to_string()))
    }

    /// Export a document to an odML XML file
    pub fn export_to_path(&self, document: &Document, path: &Path) -> Result<(), ExportError> {
        let xml = self.export(document)?;
        std::fs::write(path, xml)
            .map_err(|e| ExportError::IoError(format!("{}: {}", path.display(), e)))
    }
}

fn xml_error<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::SerializationError(format!("XML write error: {}", e))
}

fn write_section<W: Write>(writer: &mut Writer<W>, section: &Section) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new("section")))
        .map_err(xml_error)?;

    write_text(writer, "id", &section.id)?;
    write_optional(writer, "name", section.name.as_deref())?;
    write_optional(writer, "type", section.section_type.as_deref())?;
    write_optional(writer, "definition", section.definition.as_deref())?;
    write_optional(writer, "reference", section.reference.as_deref())?;
    write_optional(writer, "repository", section.repository.as_deref())?;
    for property in &section.properties {
        write_property(writer, property)?;
    }
    for child in &section.sections {
        write_section(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("section")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_property<W: Write>(writer: &mut Writer<W>, property: &Property) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new("property")))
        .map_err(xml_error)?;

    write_text(writer, "id", &property.id)?;
    write_optional(writer, "name", property.name.as_deref())?;
    write_optional(writer, "definition", property.definition.as_deref())?;
    if let Some(dtype) = &property.dtype {
        write_text(writer, "type", &dtype.to_string())?;
    }
    write_optional(writer, "unit", property.unit.as_deref())?;
    write_optional(writer, "uncertainty", property.uncertainty.as_deref())?;
    write_optional(writer, "reference", property.reference.as_deref())?;
    write_optional(writer, "dependency", property.dependency.as_deref())?;
    write_optional(writer, "dependencyValue", property.dependency_value.as_deref())?;
    write_optional(writer, "valueOrigin", property.value_origin.as_deref())?;
    for value in &property.values {
        write_value(writer, value)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("property")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_value<W: Write>(writer: &mut Writer<W>, value: &Value) -> Result<(), ExportError> {
    let mut element = writer.create_element("value");
    if let Some(unit) = &value.unit {
        element = element.with_attribute(("unit", unit.as_str()));
    }
    if let Some(uncertainty) = &value.uncertainty {
        element = element.with_attribute(("uncertainty", uncertainty.as_str()));
    }
    if let Some(reference) = &value.reference {
        element = element.with_attribute(("reference", reference.as_str()));
    }

    match &value.datum {
        Some(datum) => {
            element
                .write_text_content(BytesText::new(&value_text(datum)))
                .map_err(xml_error)?;
        }
        None => {
            element.write_empty().map_err(xml_error)?;
        }
    }
    Ok(())
}

/// Text of a datum; strings that read back as a list are quoted
fn value_text(datum: &Datum) -> String {
    match datum {
        Datum::String(s) if is_list_literal(s) => {
            format!("[\"{}\"]", s.replace('\\', "\\\\").replace('"', "\\\""))
        }
        other => other.to_string(),
    }
}

fn write_text<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), ExportError> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))
        .map_err(xml_error)?;
    Ok(())
}

fn write_optional<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: Option<&str>,
) -> Result<(), ExportError> {
    match text {
        Some(text) => write_text(writer, name, text),
        None => Ok(()),
    }
}
