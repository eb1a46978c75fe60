//! Tests for the convert command

use nix_odml_converter::cli::commands::convert::{
    ConvertArgs, FileStatus, check_file_overwrite, convert_batch, handle_convert, load_config,
};
use nix_odml_converter::cli::error::CliError;
use nix_odml_converter::cli::output::{ReportFormat, render_summary};
use nix_odml_converter::container::{FileMode, NixFile};
use nix_odml_converter::convert::ConversionConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<odML version="1.1">
  <author>me</author>
  <section>
    <name>Recording</name>
    <property>
      <name>Pairs</name>
      <value>(1; 2)</value>
    </property>
  </section>
</odML>
"#;

fn args(inputs: Vec<PathBuf>, output_dir: &Path) -> ConvertArgs {
    ConvertArgs {
        inputs,
        output_dir: output_dir.to_path_buf(),
        force: false,
        config: ConversionConfig::default(),
        report_format: ReportFormat::Text,
    }
}

fn write_input(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, MINIMAL).unwrap();
    path
}

fn never_asked(path: &Path) -> bool {
    panic!("unexpected overwrite prompt for {}", path.display());
}

#[test]
fn test_batch_converts_in_both_directions() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let input = write_input(dir.path(), "session.odml");

    let forward = convert_batch(&args(vec![input], &out), &mut never_asked);
    assert_eq!(forward.count(FileStatus::Converted), 1);
    let nix_path = out.join("session.nix");
    assert_eq!(forward.files[0].output.as_deref(), Some(nix_path.as_path()));
    assert!(nix_path.exists());

    let back_dir = dir.path().join("back");
    let reverse = convert_batch(&args(vec![nix_path], &back_dir), &mut never_asked);
    assert_eq!(reverse.count(FileStatus::Converted), 1);
    let xml = std::fs::read_to_string(back_dir.join("session.xml")).unwrap();
    assert!(xml.contains("<name>Recording</name>"));
    assert!(xml.contains("<type>2-tuple</type>"));
}

#[test]
fn test_declined_overwrite_skips_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "session.xml");
    let existing = dir.path().join("session.nix");
    std::fs::write(&existing, b"keep me").unwrap();

    let mut asked = Vec::new();
    let mut decline = |path: &Path| {
        asked.push(path.to_path_buf());
        false
    };
    let summary = convert_batch(&args(vec![input], dir.path()), &mut decline);

    assert_eq!(asked, vec![existing.clone()]);
    assert_eq!(summary.count(FileStatus::Skipped), 1);
    assert_eq!(summary.failed(), 0);
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");

    let text = render_summary(&summary, ReportFormat::Text).unwrap();
    assert!(text.starts_with("Aborted: "));
}

#[test]
fn test_confirmed_overwrite_replaces_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "session.xml");
    let existing = dir.path().join("session.nix");
    std::fs::write(&existing, b"stale").unwrap();

    let summary = convert_batch(&args(vec![input], dir.path()), &mut |_: &Path| true);
    assert_eq!(summary.count(FileStatus::Converted), 1);
    let file = NixFile::open(&existing, FileMode::ReadOnly).unwrap();
    assert_eq!(file.sections().len(), 1);
}

#[test]
fn test_force_does_not_prompt() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "session.xml");
    std::fs::write(dir.path().join("session.nix"), b"stale").unwrap();

    let mut batch = args(vec![input], dir.path());
    batch.force = true;
    let summary = convert_batch(&batch, &mut never_asked);
    assert_eq!(summary.count(FileStatus::Converted), 1);
}

#[test]
fn test_missing_output_needs_no_prompt() {
    let dir = TempDir::new().unwrap();
    assert!(check_file_overwrite(
        &dir.path().join("absent.nix"),
        false,
        &mut never_asked
    ));
}

#[test]
fn test_failures_do_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let unsupported = dir.path().join("notes.txt");
    std::fs::write(&unsupported, b"hello").unwrap();
    let missing = dir.path().join("missing.xml");
    let good = write_input(dir.path(), "good.xml");

    let summary = convert_batch(
        &args(vec![unsupported, missing, good], dir.path()),
        &mut never_asked,
    );

    let statuses: Vec<FileStatus> = summary.files.iter().map(|f| f.status).collect();
    assert_eq!(
        statuses,
        vec![FileStatus::Failed, FileStatus::Failed, FileStatus::Converted]
    );
    assert!(
        summary.files[0]
            .error
            .as_deref()
            .unwrap()
            .contains("Unsupported format")
    );
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.total.sections_read, 1);
}

#[test]
fn test_handle_convert_reports_failed_files() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.xml");

    let err = handle_convert(&args(vec![missing], dir.path())).unwrap_err();
    assert!(matches!(err, CliError::BatchFailed { failed: 1, total: 1 }));
}

#[test]
fn test_handle_convert_requires_inputs() {
    let dir = TempDir::new().unwrap();
    let err = handle_convert(&args(Vec::new(), dir.path())).unwrap_err();
    assert!(matches!(err, CliError::InvalidArgument(_)));
}

#[test]
fn test_text_summary_marks_lossy_files() {
    let dir = TempDir::new().unwrap();
    let clean = write_input(dir.path(), "clean.xml");
    let lossy = dir.path().join("lossy.xml");
    std::fs::write(
        &lossy,
        r#"<odML version="1.1"><section><name>a</name>
           <property><name>blob</name><type>binary</type><value>AQI=</value></property>
           <property><name>n</name><type>int</type><value>1</value></property>
           </section></odML>"#,
    )
    .unwrap();

    let summary = convert_batch(&args(vec![clean, lossy], dir.path()), &mut never_asked);
    assert_eq!(summary.count(FileStatus::Converted), 2);

    let text = render_summary(&summary, ReportFormat::Text).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(!lines[0].ends_with("(with losses)"));
    assert!(lines[1].ends_with("(with losses)"));
}

#[test]
fn test_json_summary_is_camel_case() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "session.xml");
    let summary = convert_batch(&args(vec![input], dir.path()), &mut never_asked);

    let json = render_summary(&summary, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["files"][0]["status"], "converted");
    assert_eq!(value["total"]["propertiesWritten"], 1);
}

#[test]
fn test_load_config_from_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("convert.toml");
    std::fs::write(
        &path,
        "reconstructTuples = false\ndocumentSectionName = \"metadata root\"\n",
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert!(!config.reconstruct_tuples);
    assert!(config.keep_empty_properties);
    assert_eq!(config.document_section_name, "metadata root");

    std::fs::write(&path, "reconstructTuples = \"sometimes\"\n").unwrap();
    assert!(matches!(
        load_config(&path),
        Err(CliError::ConfigError(_, _))
    ));
}
