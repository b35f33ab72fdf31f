use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8Path;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use bold2qiime::app::{Converter, LogSink, ProgressSink};
use bold2qiime::config::ConfigLoader;
use bold2qiime::domain::{SheetSelector, utf8_path};
use bold2qiime::error::ConvertError;
use bold2qiime::output::{JsonOutput, OutputMode, TextOutput};
use bold2qiime::prompt::confirm_overwrite;

#[derive(Parser)]
#[command(name = "bold2qiime")]
#[command(about = "Convert BOLD-style data to files useable by QIIME2")]
#[command(version, author)]
struct Cli {
    /// File to convert (.csv, .tsv, .txt or an Excel workbook)
    input_file: PathBuf,

    /// Override kingdom for all samples with given argument
    #[arg(short, long)]
    kingdom: Option<String>,

    /// Specify the excel sheet name or number
    #[arg(short = 'e', long = "excel-sheet")]
    sheet: Option<String>,

    /// Output folder name and filename prefix
    output_name: PathBuf,

    /// Replace an existing output folder without asking
    #[arg(long)]
    force: bool,

    /// JSON config file (defaults to ./bold2qiime.json when present)
    #[arg(long)]
    config: Option<String>,

    /// Never prompt; print the run summary as JSON
    #[arg(long)]
    non_interactive: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        return ExitCode::from(exit_code(&report));
    }
    ExitCode::SUCCESS
}

fn exit_code(report: &miette::Report) -> u8 {
    report
        .downcast_ref::<ConvertError>()
        .map_or(1, map_exit_code)
}

fn map_exit_code(error: &ConvertError) -> u8 {
    match error {
        ConvertError::NotFound(_)
        | ConvertError::UnsupportedType(_)
        | ConvertError::InvalidArgument(_)
        | ConvertError::SheetNotFound(_) => 2,
        ConvertError::Read(_) | ConvertError::MissingColumn(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let converter = Converter::new(config);

    let input = utf8_path(cli.input_file)?;
    let output_name = utf8_path(cli.output_name)?;
    let sheet = SheetSelector::for_input(&input, cli.sheet.as_deref())?;

    let sink: &dyn ProgressSink = match output_mode {
        OutputMode::Interactive => &LogSink,
        OutputMode::NonInteractive => &JsonOutput,
    };

    let batch = converter.prepare(&input, sheet.as_ref(), sink)?;

    let overwrite = resolve_overwrite(&output_name, cli.force, output_mode, confirm_overwrite)?;

    let summary = converter.emit(&batch, &output_name, cli.kingdom, overwrite, sink)?;
    match output_mode {
        OutputMode::Interactive => TextOutput::print_summary(&summary).into_diagnostic(),
        OutputMode::NonInteractive => JsonOutput::print_summary(&summary).into_diagnostic(),
    }
}

/// Decides whether an existing output folder gets replaced. `confirm` is only
/// called in interactive mode, when the folder exists and `--force` is unset.
fn resolve_overwrite(
    output_dir: &Utf8Path,
    force: bool,
    mode: OutputMode,
    confirm: impl FnOnce(&Utf8Path) -> miette::Result<bool>,
) -> miette::Result<bool> {
    if force {
        return Ok(true);
    }
    if !output_dir.as_std_path().is_dir() {
        return Ok(false);
    }
    match mode {
        OutputMode::Interactive => {
            if confirm(output_dir)? {
                Ok(true)
            } else {
                Err(miette::Report::msg(
                    "Please re-run the program with a new output name.",
                ))
            }
        }
        OutputMode::NonInteractive => {
            Err(ConvertError::OutputExists(output_dir.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use camino::Utf8PathBuf;

    use super::*;

    fn existing_dir(temp: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap()
    }

    fn no_prompt(_: &Utf8Path) -> miette::Result<bool> {
        panic!("prompt must not be shown");
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let cases = [
            (ConvertError::NotFound("bold.csv".into()), 2),
            (ConvertError::UnsupportedType("bold.json".into()), 2),
            (ConvertError::InvalidArgument("path".into()), 2),
            (ConvertError::SheetNotFound("Lab".into()), 2),
            (ConvertError::Read("bad workbook".into()), 3),
            (ConvertError::MissingColumn("bin_uri".into()), 3),
            (ConvertError::OutputExists("out".into()), 1),
            (ConvertError::Filesystem("disk full".into()), 1),
            (ConvertError::ConfigRead(PathBuf::from("bold2qiime.json")), 1),
            (ConvertError::ConfigParse("schema_version".into()), 1),
        ];
        for (error, code) in cases {
            assert_eq!(map_exit_code(&error), code, "{error}");
            assert_eq!(exit_code(&miette::Report::from(error)), code);
        }
    }

    #[test]
    fn foreign_report_exits_with_one() {
        assert_eq!(exit_code(&miette::Report::msg("boom")), 1);
    }

    #[test]
    fn existing_output_is_rejected_non_interactively() {
        let temp = tempfile::tempdir().unwrap();
        let dir = existing_dir(&temp);
        std::fs::create_dir(&dir).unwrap();

        let result = resolve_overwrite(&dir, false, OutputMode::NonInteractive, no_prompt);
        let report = result.unwrap_err();
        assert_matches!(
            report.downcast_ref::<ConvertError>(),
            Some(ConvertError::OutputExists(_))
        );
        assert_eq!(exit_code(&report), 1);
    }

    #[test]
    fn declined_prompt_exits_with_one() {
        let temp = tempfile::tempdir().unwrap();
        let dir = existing_dir(&temp);
        std::fs::create_dir(&dir).unwrap();

        let result = resolve_overwrite(&dir, false, OutputMode::Interactive, |_| Ok(false));
        let report = result.unwrap_err();
        assert!(report.downcast_ref::<ConvertError>().is_none());
        assert_eq!(exit_code(&report), 1);
        assert!(dir.as_std_path().is_dir());
    }

    #[test]
    fn accepted_prompt_allows_overwrite() {
        let temp = tempfile::tempdir().unwrap();
        let dir = existing_dir(&temp);
        std::fs::create_dir(&dir).unwrap();

        let overwrite = resolve_overwrite(&dir, false, OutputMode::Interactive, |_| Ok(true));
        assert!(overwrite.unwrap());
    }

    #[test]
    fn force_skips_prompt() {
        let temp = tempfile::tempdir().unwrap();
        let dir = existing_dir(&temp);
        std::fs::create_dir(&dir).unwrap();

        for mode in [OutputMode::Interactive, OutputMode::NonInteractive] {
            assert!(resolve_overwrite(&dir, true, mode, no_prompt).unwrap());
        }
    }

    #[test]
    fn fresh_output_needs_no_prompt() {
        let temp = tempfile::tempdir().unwrap();
        let dir = existing_dir(&temp);

        for mode in [OutputMode::Interactive, OutputMode::NonInteractive] {
            assert!(!resolve_overwrite(&dir, false, mode, no_prompt).unwrap());
        }
    }
}
