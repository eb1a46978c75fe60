//! Tests for the validate command

use nix_odml_converter::cli::commands::validate::{handle_validate, validate_file};
use nix_odml_converter::cli::error::CliError;
use nix_odml_converter::cli::output::ReportFormat;
use nix_odml_converter::container::{FileMode, NixFile};
use nix_odml_converter::models::{NixProperty, NixSection};
use tempfile::TempDir;

#[test]
fn test_valid_odml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.xml");
    std::fs::write(
        &path,
        r#"<odML version="1.1"><section><id>s1</id><name>a</name>
           <property><id>p1</id><name>x</name><value>1</value></property>
           </section></odML>"#,
    )
    .unwrap();

    let result = validate_file(&path).unwrap();
    assert!(result.is_valid());
    assert_eq!(result.sections_checked, 1);
    assert_eq!(result.properties_checked, 1);
    assert!(handle_validate(&path, ReportFormat::Json).is_ok());
}

#[test]
fn test_duplicate_ids_in_odml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dup.odml");
    std::fs::write(
        &path,
        r#"<odML version="1.1">
           <section><id>same</id><name>a</name></section>
           <section><id>same</id><name>b</name></section>
           </odML>"#,
    )
    .unwrap();

    let result = validate_file(&path).unwrap();
    assert_eq!(result.duplicate_ids.len(), 1);
    assert!(matches!(
        handle_validate(&path, ReportFormat::Text),
        Err(CliError::ValidationError(_))
    ));
}

#[test]
fn test_missing_ids_in_nix_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.nix");
    let mut section = NixSection::new("a", "n.s.", "s1");
    section.push_property(NixProperty::new("x", "", Vec::new()).unwrap());
    let mut file = NixFile::open(&path, FileMode::Overwrite).unwrap();
    file.push_section(section).unwrap();
    file.close().unwrap();

    let result = validate_file(&path).unwrap();
    assert_eq!(result.missing_ids.len(), 1);
    assert_eq!(result.missing_ids[0].path, "/a:x");
}

#[test]
fn test_malformed_xml_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xml");
    std::fs::write(&path, "<odML><section></odML>").unwrap();

    assert!(matches!(
        validate_file(&path),
        Err(CliError::ValidationError(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        validate_file(&dir.path().join("absent.xml")),
        Err(CliError::FileNotFound(_))
    ));
}
