//! CLI binary entry point for nix-odml-convert

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use nix_odml_converter::cli::commands::convert::{ConvertArgs, handle_convert, load_config};
#[cfg(feature = "cli")]
use nix_odml_converter::cli::commands::validate::handle_validate;
#[cfg(feature = "cli")]
use nix_odml_converter::cli::error::CliError;
#[cfg(feature = "cli")]
use nix_odml_converter::cli::output::ReportFormat;
#[cfg(feature = "cli")]
use nix_odml_converter::convert::ConversionConfig;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "nix-odml-convert")]
#[command(about = "Convert metadata between odML XML documents and NIX containers")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert files; .xml/.odml become .nix and .nix becomes .xml
    Convert {
        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory for converted files (default: current directory)
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,
        /// TOML file with conversion settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Infer kinds of untagged string values when reading NIX files
        #[arg(long)]
        infer_kinds: bool,
        /// Do not rebuild untagged tuple values when reading NIX files
        #[arg(long)]
        no_tuples: bool,
        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        report_format: ReportFormatArg,
    },
    /// Check section and property identifiers of an odML or NIX file
    Validate {
        /// File to validate (.xml, .odml or .nix)
        input: PathBuf,
        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        report_format: ReportFormatArg,
    },
}

#[cfg(feature = "cli")]
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ReportFormatArg {
    Text,
    Json,
    Yaml,
}

#[cfg(feature = "cli")]
fn convert_report_format(format: ReportFormatArg) -> ReportFormat {
    match format {
        ReportFormatArg::Text => ReportFormat::Text,
        ReportFormatArg::Json => ReportFormat::Json,
        ReportFormatArg::Yaml => ReportFormat::Yaml,
    }
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(feature = "cli")]
fn build_config(
    config: Option<PathBuf>,
    infer_kinds: bool,
    no_tuples: bool,
) -> Result<ConversionConfig, CliError> {
    let mut config = match config {
        Some(path) => load_config(&path)?,
        None => ConversionConfig::default(),
    };
    if infer_kinds {
        config.infer_string_kinds = true;
    }
    if no_tuples {
        config.reconstruct_tuples = false;
    }
    Ok(config)
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            files,
            output_dir,
            force,
            config,
            infer_kinds,
            no_tuples,
            report_format,
        } => build_config(config, infer_kinds, no_tuples).and_then(|config| {
            let args = ConvertArgs {
                inputs: files,
                output_dir,
                force,
                config,
                report_format: convert_report_format(report_format),
            };
            handle_convert(&args)
        }),
        Commands::Validate {
            input,
            report_format,
        } => handle_validate(&input, convert_report_format(report_format)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
