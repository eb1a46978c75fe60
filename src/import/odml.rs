//! odML XML importer
//!
//! Reads odML 1.1 style XML documents:
//!
//! ```xml
//! <odML version="1.1">
//!   <author>Jane Doe</author>
//!   <section>
//!     <name>recording</name>
//!     <type>recording</type>
//!     <property>
//!       <name>sampling rate</name>
//!       <type>float</type>
//!       <value unit="Hz">[1000.0, 2000.0]</value>
//!     </property>
//!   </section>
//! </odML>
//! ```
//!
//! Missing identifiers are generated. Values whose text does not parse as
//! the declared kind are kept as strings and left to the converter.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use tracing::{debug, warn};

use super::ImportError;
use crate::models::literal;
use crate::models::{Datum, Document, Property, Section, Value, ValueKind};

/// odML Importer
///
/// Imports odML XML content into a `Document` tree.
#[derive(Debug, Default)]
pub struct OdmlImporter {
    /// Non-fatal problems found while reading (unknown kinds, bad dates)
    pub warnings: Vec<String>,
}

impl OdmlImporter {
    /// Create a new OdmlImporter
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Import odML XML content
    ///
    /// # Arguments
    ///
    /// * `xml_content` - The odML XML content as a string.
    ///
    /// # Returns
    ///
    /// The parsed `Document`, or an error if the XML is malformed or the root
    /// element is not `odML`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nix_odml_converter::import::OdmlImporter;
    ///
    /// let xml = r#"<odML version="1.1"><section><name>s</name></section></odML>"#;
    /// let document = OdmlImporter::new().import(xml).unwrap();
    /// assert_eq!(document.sections[0].name.as_deref(), Some("s"));
    /// ```
    pub fn import(&mut self, xml_content: &str) -> Result<Document, ImportError> {
        let root = parse_tree(xml_content)?;
        if !root.name.eq_ignore_ascii_case("odml") {
            return Err(ImportError::ValidationError(format!(
                "Invalid odML: root element is '{}', expected 'odML'",
                root.name
            )));
        }

        let mut document = Document::new();
        if let Some(id) = root.child_text("id") {
            document.id = id;
        }
        document.author = root.child_text("author");
        document.version = root.child_text("version");
        document.repository = root.child_text("repository");
        if let Some(date) = root.child_text("date") {
            document.date = literal::parse_date(&date);
            if document.date.is_none() {
                self.warn(format!("Ignoring malformed document date '{}'", date));
            }
        }

        for child in &root.children {
            match child.name.as_str() {
                "section" => document.sections.push(self.read_section(child)),
                "id" | "author" | "date" | "version" | "repository" => {}
                other => debug!(element = %other, "Ignoring unknown document element"),
            }
        }
        Ok(document)
    }

    /// Read and import an odML XML file
    pub fn import_file(&mut self, path: &Path) -> Result<Document, ImportError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ImportError::IoError(format!("{}: {}", path.display(), e)))?;
        self.import(&content)
    }

    fn read_section(&mut self, node: &XmlNode) -> Section {
        let mut section = Section::unnamed();
        if let Some(id) = node.child_text("id") {
            section.id = id;
        }
        section.name = node.child_text("name");
        section.section_type = node.child_text("type");
        section.definition = node.child_text("definition");
        section.reference = node.child_text("reference");
        section.repository = node.child_text("repository");

        for child in &node.children {
            match child.name.as_str() {
                "property" => section.properties.push(self.read_property(child)),
                "section" => section.sections.push(self.read_section(child)),
                "id" | "name" | "type" | "definition" | "reference" | "repository" => {}
                other => debug!(element = %other, "Ignoring unknown section element"),
            }
        }
        section
    }

    fn read_property(&mut self, node: &XmlNode) -> Property {
        let mut property = Property::unnamed();
        if let Some(id) = node.child_text("id") {
            property.id = id;
        }
        property.name = node.child_text("name");
        property.definition = node.child_text("definition");
        property.unit = node.child_text("unit");
        property.uncertainty = node.child_text("uncertainty");
        property.reference = node.child_text("reference");
        property.dependency = node.child_text("dependency");
        property.dependency_value = node.child_text("dependencyValue");
        property.value_origin = node.child_text("valueOrigin");

        if let Some(dtype) = node.child_text("type") {
            match dtype.parse::<ValueKind>() {
                Ok(kind) => property.dtype = Some(kind),
                Err(e) => self.warn(format!(
                    "Property '{}': {}; values are read as strings",
                    property.display_name(),
                    e
                )),
            }
        }

        for value in node.children_named("value") {
            property.values.extend(read_values(value, property.dtype));
        }
        property
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// The values held by one `<value>` element
fn read_values(node: &XmlNode, dtype: Option<ValueKind>) -> Vec<Value> {
    let annotate = |datum: Option<Datum>| Value {
        datum,
        unit: node.attribute("unit").map(str::to_string),
        uncertainty: node.attribute("uncertainty").map(str::to_string),
        reference: node.attribute("reference").map(str::to_string),
    };

    let text = node.text.trim();
    if text.is_empty() {
        return vec![annotate(None)];
    }
    if !is_list_literal(text) {
        // surrounding whitespace is part of a textual value
        let source = if dtype.is_none_or(|k| k.is_textual()) { node.text.as_str() } else { text };
        return vec![annotate(Some(Datum::parse_as(dtype, source)))];
    }

    split_list(text)
        .into_iter()
        .map(|item| match item {
            ListItem::Quoted(s) => annotate(Some(Datum::parse_as(dtype, &s))),
            ListItem::Bare(s) if s.is_empty() => annotate(None),
            ListItem::Bare(s) => annotate(Some(Datum::parse_as(dtype, &s))),
        })
        .collect()
}

/// Whether text is an odML 1.1 list literal `[a, b, ...]`
pub fn is_list_literal(text: &str) -> bool {
    let text = text.trim();
    text.len() >= 2 && text.starts_with('[') && text.ends_with(']')
}

#[derive(Debug, PartialEq)]
enum ListItem {
    Quoted(String),
    Bare(String),
}

/// Split a list literal on commas outside quotes and parentheses
fn split_list(text: &str) -> Vec<ListItem> {
    let inner = &text.trim()[1..text.trim().len() - 1];
    if inner.trim().is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut depth = 0usize;

    for c in inner.chars() {
        if in_quotes {
            match c {
                _ if escaped => {
                    current.push(c);
                    escaped = false;
                }
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => current.push(c),
            }
            continue;
        }
        match c {
            ',' if depth == 0 => {
                items.push(finish_item(&mut current, quoted));
                quoted = false;
            }
            // anything between a closing quote and the next separator
            _ if quoted => {}
            '"' if current.trim().is_empty() => {
                current.clear();
                quoted = true;
                in_quotes = true;
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            _ => current.push(c),
        }
    }
    items.push(finish_item(&mut current, quoted));
    items
}

fn finish_item(current: &mut String, quoted: bool) -> ListItem {
    let text = std::mem::take(current);
    if quoted {
        ListItem::Quoted(text)
    } else {
        ListItem::Bare(text.trim().to_string())
    }
}

/// Minimal element tree; the odML schema is small enough to map from it
#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ImportError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ImportError::ParseError(format!("Bad attribute: {}", e)))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| ImportError::ParseError(format!("Bad attribute '{}': {}", key, e)))?;
            attributes.push((key, value.to_string()));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first child with this name, if non-empty
    fn child_text(&self, name: &str) -> Option<String> {
        self.children_named(name)
            .next()
            .map(|c| c.text.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn parse_tree(xml_content: &str) -> Result<XmlNode, ImportError> {
    let mut reader = Reader::from_str(xml_content);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(XmlNode::from_start(e)?),
            Ok(Event::Empty(ref e)) => {
                let node = XmlNode::from_start(e)?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(current) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| {
                        ImportError::ParseError(format!(
                            "XML parsing error at position {}: {}",
                            reader.error_position(),
                            e
                        ))
                    })?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ImportError::ParseError(format!(
                    "XML parsing error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ImportError::ParseError(format!(
            "Unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| ImportError::ParseError("Document has no root element".to_string()))
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {}
    }
}
