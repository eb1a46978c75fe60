//! Report rendering for CLI output

use serde::Serialize;

use crate::cli::error::CliError;
use crate::cli::commands::convert::{BatchSummary, FileStatus};

/// How reports are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Render any serializable report as JSON or YAML
pub fn render_structured<T: Serialize>(value: &T, format: ReportFormat) -> Result<String, CliError> {
    match format {
        ReportFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| CliError::IoError(format!("Failed to render JSON report: {}", e))),
        ReportFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| CliError::IoError(format!("Failed to render YAML report: {}", e))),
        ReportFormat::Text => Err(CliError::InvalidArgument(
            "text reports are rendered by the command".to_string(),
        )),
    }
}

/// Render the outcome of a conversion batch
pub fn render_summary(summary: &BatchSummary, format: ReportFormat) -> Result<String, CliError> {
    if format != ReportFormat::Text {
        return render_structured(summary, format);
    }

    let mut lines = Vec::with_capacity(summary.files.len() + 1);
    for file in &summary.files {
        let line = match file.status {
            FileStatus::Converted => format!(
                "Converted {} -> {}{}",
                file.input.display(),
                file.output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                match &file.report {
                    Some(report) if !report.is_lossless() => " (with losses)",
                    _ => "",
                }
            ),
            FileStatus::Skipped => format!("Aborted: {}", file.input.display()),
            FileStatus::Failed => format!(
                "Failed {}: {}",
                file.input.display(),
                file.error.as_deref().unwrap_or("unknown error")
            ),
        };
        lines.push(line);
    }
    lines.push(summary.total.to_string());
    Ok(lines.join("\n"))
}
