//! Convert command implementation

use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::cli::error::CliError;
use crate::cli::output::{ReportFormat, render_summary};
use crate::convert::{ConversionConfig, ConversionReport, convert_file, output_path};

/// Arguments for the convert command
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub inputs: Vec<PathBuf>,
    /// Directory receiving the converted files
    pub output_dir: PathBuf,
    /// Overwrite existing files without prompting
    pub force: bool,
    pub config: ConversionConfig,
    pub report_format: ReportFormat,
}

/// Asks whether an existing output file may be replaced
pub trait OverwritePrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

/// Prompt on stdin; only `y`/`yes` confirms
pub struct StdinPrompt;

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        print!("File {} already exists. Overwrite? ", path.display());
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

impl<F> OverwritePrompt for F
where
    F: FnMut(&Path) -> bool,
{
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        self(path)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Outcome of one file in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Converted,
    /// The user declined to overwrite the output
    Skipped,
    Failed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ConversionReport>,
}

/// Per-file outcomes plus merged statistics
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub files: Vec<FileOutcome>,
    pub total: ConversionReport,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.count(FileStatus::Failed)
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }
}

/// Decide whether `output_path` may be written
pub fn check_file_overwrite(
    output_path: &Path,
    force: bool,
    prompt: &mut dyn OverwritePrompt,
) -> bool {
    !output_path.exists() || force || prompt.confirm_overwrite(output_path)
}

/// Load a conversion config from a TOML file
pub fn load_config(path: &Path) -> Result<ConversionConfig, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    toml::from_str(&content).map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))
}

/// Convert every input in order; failures are recorded and the batch goes on
pub fn convert_batch(args: &ConvertArgs, prompt: &mut dyn OverwritePrompt) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for input in &args.inputs {
        let outcome = convert_one(input, args, prompt);
        if let Some(report) = &outcome.report {
            summary.total.merge(report);
        }
        summary.files.push(outcome);
    }
    summary
}

fn convert_one(input: &Path, args: &ConvertArgs, prompt: &mut dyn OverwritePrompt) -> FileOutcome {
    let failed = |output: Option<PathBuf>, message: String| {
        error!(input = %input.display(), error = %message, "Conversion failed");
        FileOutcome {
            input: input.to_path_buf(),
            output,
            status: FileStatus::Failed,
            error: Some(message),
            report: None,
        }
    };

    if !input.exists() {
        return failed(None, CliError::FileNotFound(input.to_path_buf()).to_string());
    }
    let output = match output_path(input, &args.output_dir) {
        Ok(path) => path,
        Err(e) => return failed(None, e.to_string()),
    };

    if !check_file_overwrite(&output, args.force, prompt) {
        info!(output = %output.display(), "Overwrite declined");
        return FileOutcome {
            input: input.to_path_buf(),
            output: Some(output),
            status: FileStatus::Skipped,
            error: None,
            report: None,
        };
    }

    if let Err(e) = std::fs::create_dir_all(&args.output_dir) {
        let err = CliError::FileWriteError(
            args.output_dir.clone(),
            format!("Failed to create directory: {}", e),
        );
        return failed(Some(output), err.to_string());
    }

    match convert_file(input, &output, &args.config) {
        Ok(report) => {
            if !report.is_lossless() {
                warn!(input = %input.display(), "Some values or properties were not converted");
            }
            FileOutcome {
                input: input.to_path_buf(),
                output: Some(output),
                status: FileStatus::Converted,
                error: None,
                report: Some(report),
            }
        }
        Err(e) => failed(Some(output), e.to_string()),
    }
}

/// Handle the convert command
pub fn handle_convert(args: &ConvertArgs) -> Result<(), CliError> {
    if args.inputs.is_empty() {
        return Err(CliError::InvalidArgument("No input files given".to_string()));
    }

    let summary = convert_batch(args, &mut StdinPrompt);
    println!("{}", render_summary(&summary, args.report_format)?);

    match summary.failed() {
        0 => Ok(()),
        failed => Err(CliError::BatchFailed {
            failed,
            total: summary.files.len(),
        }),
    }
}
