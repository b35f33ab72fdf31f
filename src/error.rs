use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConvertError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("input file not found: {0}")]
    NotFound(String),

    #[error("input type not supported: {0}")]
    #[diagnostic(help(
        "supported extensions: .csv, .tsv, .txt, .xlsx, .xlsm, .xlsb, .xltx, .xltm, .xls, .xlt, .xml"
    ))]
    UnsupportedType(String),

    #[error("sheet not found in workbook: {0}")]
    SheetNotFound(String),

    #[error("failed to read input: {0}")]
    Read(String),

    #[error("required column missing from input: {0}")]
    MissingColumn(String),

    #[error("output directory already exists: {0}")]
    #[diagnostic(help("re-run with --force or choose a new output name"))]
    OutputExists(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}
