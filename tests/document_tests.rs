//! Document root tests

use chrono::NaiveDate;
use nix_odml_converter::container::{FileMode, NixFile};
use nix_odml_converter::convert::{
    ConversionConfig, ConversionError, DOCUMENT_SECTION_TYPE, convert_file, nix_to_odml,
    odml_to_nix,
};
use nix_odml_converter::import::OdmlImporter;
use nix_odml_converter::models::{Document, NixSection, Section};
use tempfile::TempDir;

mod odml_to_nix_tests {
    use super::*;

    #[test]
    fn test_empty_document_becomes_single_root() {
        let document = Document::new();
        let mut file = NixFile::in_memory();
        let report = odml_to_nix(&document, &mut file, &ConversionConfig::default()).unwrap();

        assert_eq!(file.sections().len(), 1);
        let root = &file.sections()[0];
        assert!(!root.id.is_empty());
        assert_eq!(root.id, document.id);
        assert_eq!(root.name, "odML document");
        assert_eq!(root.section_type, DOCUMENT_SECTION_TYPE);
        assert!(root.properties.is_empty());
        assert!(root.sections.is_empty());
        assert_eq!(report.sections_read, 0);
    }

    #[test]
    fn test_document_attributes_become_tagged_properties() {
        let document = Document::new()
            .with_author("me")
            .with_date(NaiveDate::from_ymd_opt(2018, 6, 14).unwrap())
            .with_version("0.0.1")
            .with_repository("http://portal.g-node.org/odml/terminologies/v1.1/");
        let mut file = NixFile::in_memory();
        odml_to_nix(&document, &mut file, &ConversionConfig::default()).unwrap();

        let root = &file.sections()[0];
        let tag_of = |name: &str| root.property(name).and_then(|p| p.odml_type.clone());
        assert_eq!(tag_of("author").as_deref(), Some("person"));
        assert_eq!(tag_of("date").as_deref(), Some("date"));
        assert_eq!(tag_of("version").as_deref(), Some("string"));
        assert_eq!(tag_of("repository").as_deref(), Some("url"));
        assert_eq!(
            root.property("date").unwrap().values()[0].data.as_str(),
            Some("2018-06-14")
        );
    }

    #[test]
    fn test_root_name_is_configurable() {
        let config = ConversionConfig::builder()
            .document_section_name("metadata root")
            .build();
        let mut file = NixFile::in_memory();
        odml_to_nix(&Document::new(), &mut file, &config).unwrap();
        assert_eq!(file.sections()[0].name, "metadata root");

        let (_, report) = nix_to_odml(&file, &config).unwrap();
        assert_eq!(report.sections_read, 0);
        assert!(matches!(
            nix_to_odml(&file, &ConversionConfig::default()),
            Err(ConversionError::MissingDocumentRoot(_))
        ));
    }
}

mod nix_to_odml_tests {
    use super::*;

    #[test]
    fn test_document_attributes_round_trip_through_files() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2011, 12, 1).unwrap();
        let document = Document::new()
            .with_author("me")
            .with_date(date)
            .with_version("0.0.1")
            .with_repository("unknown")
            .with_section(Section::new("first section"));

        let nix_path = dir.path().join("doc.nix");
        let mut file = NixFile::open(&nix_path, FileMode::Overwrite).unwrap();
        odml_to_nix(&document, &mut file, &ConversionConfig::default()).unwrap();
        file.close().unwrap();

        let xml_path = dir.path().join("doc.xml");
        convert_file(&nix_path, &xml_path, &ConversionConfig::default()).unwrap();
        let back = OdmlImporter::new().import_file(&xml_path).unwrap();

        assert_eq!(back.id, document.id);
        assert_eq!(back.author.as_deref(), Some("me"));
        assert_eq!(back.date, Some(date));
        assert_eq!(back.version.as_deref(), Some("0.0.1"));
        assert_eq!(back.repository.as_deref(), Some("unknown"));
        assert_eq!(back.sections.len(), 1);
        assert_eq!(back.sections[0].name.as_deref(), Some("first section"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let mut file = NixFile::in_memory();
        file.push_section(NixSection::new("unrelated", "n.s.", "s1"))
            .unwrap();

        let err = nix_to_odml(&file, &ConversionConfig::default()).unwrap_err();
        assert!(matches!(err, ConversionError::MissingDocumentRoot(_)));
        assert!(err.is_structural());
    }

    #[test]
    fn test_two_roots_are_fatal() {
        let mut file = NixFile::in_memory();
        for id in ["doc-1", "doc-2"] {
            file.push_section(NixSection::new("odML document", DOCUMENT_SECTION_TYPE, id))
                .unwrap();
        }

        let err = nix_to_odml(&file, &ConversionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::MultipleDocumentRoots { count: 2, .. }
        ));
        assert!(err.is_structural());
    }

    #[test]
    fn test_other_top_level_sections_are_ignored() {
        let mut file = NixFile::in_memory();
        file.push_section(NixSection::new("analysis", "n.s.", "s1"))
            .unwrap();
        odml_to_nix(
            &Document::new().with_author("me"),
            &mut file,
            &ConversionConfig::default(),
        )
        .unwrap();

        let (document, _) = nix_to_odml(&file, &ConversionConfig::default()).unwrap();
        assert_eq!(document.author.as_deref(), Some("me"));
        assert!(document.sections.is_empty());
    }
}
