//! XML validation utilities
//!
//! Well-formedness checking for odML XML before it is imported.

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Check that XML content is well formed and rooted at an `odML` element.
///
/// # Arguments
///
/// * `xml_content` - The XML content to validate
///
/// # Returns
///
/// A `Result` indicating whether validation succeeded.
pub fn validate_xml(xml_content: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut root: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "XML parsing error at position {}: {}",
                    reader.error_position(),
                    e
                ))
                .context("XML validation failed");
            }
            _ => {}
        }
    }

    if depth > 0 {
        return Err(anyhow::anyhow!("Invalid XML: unclosed elements at end of input"))
            .context("XML validation failed");
    }

    match root {
        Some(name) if name.eq_ignore_ascii_case("odml") => Ok(()),
        Some(name) => Err(anyhow::anyhow!(
            "Invalid odML: root element is '{}', expected 'odML'",
            name
        ))
        .context("XML validation failed"),
        None => Err(anyhow::anyhow!("Invalid XML: no root element"))
            .context("XML validation failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_odml_root() {
        assert!(validate_xml(r#"<?xml version="1.0"?><odML version="1.1"/>"#).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!(validate_xml("<odML><section></odML>").is_err());
    }

    #[test]
    fn test_rejects_other_roots() {
        let err = validate_xml("<bpmn/>").unwrap_err();
        assert!(format!("{:#}", err).contains("expected 'odML'"));
    }
}
