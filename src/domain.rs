use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ConvertError;
use crate::table::Table;

pub const SPREADSHEET_EXTENSIONS: &[&str] =
    &["xlsx", "xlsm", "xlsb", "xltx", "xltm", "xls", "xlt", "xml"];

pub const COLUMN_SAMPLEID: &str = "sampleid";
pub const COLUMN_NUCLEOTIDES: &str = "nucleotides";
pub const COLUMN_BIN_URI: &str = "bin_uri";
pub const COLUMN_MARKER_CODES: &str = "marker_codes";

/// Rank columns in lineage order, phylum through species.
pub const RANK_COLUMNS: [&str; 6] = [
    "phylum_name",
    "class_name",
    "order_name",
    "family_name",
    "genus_name",
    "species_name",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Csv,
    Tsv,
    /// Delimited text with the delimiter sniffed from content.
    Txt,
}

impl InputFormat {
    /// Extension matching is case-sensitive: `data.CSV` is rejected.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConvertError> {
        let Some(ext) = path.extension() else {
            return Err(ConvertError::UnsupportedType(path.to_string()));
        };
        match ext {
            "csv" => Ok(InputFormat::Csv),
            "tsv" => Ok(InputFormat::Tsv),
            "txt" => Ok(InputFormat::Txt),
            ext if SPREADSHEET_EXTENSIONS.contains(&ext) => Ok(InputFormat::Spreadsheet),
            _ => Err(ConvertError::UnsupportedType(path.to_string())),
        }
    }

    pub fn delimiter(&self) -> Option<u8> {
        match self {
            InputFormat::Csv => Some(b','),
            InputFormat::Tsv => Some(b'\t'),
            InputFormat::Spreadsheet | InputFormat::Txt => None,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Spreadsheet => write!(f, "spreadsheet"),
            InputFormat::Csv => write!(f, "csv"),
            InputFormat::Tsv => write!(f, "tsv"),
            InputFormat::Txt => write!(f, "txt"),
        }
    }
}

/// Which worksheet to read from a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// Zero-based position in the workbook.
    Index(usize),
    Name(String),
}

impl SheetSelector {
    /// Parses a raw `-e` value for `input`. Non-workbook inputs ignore it.
    pub fn for_input(input: &Utf8Path, raw: Option<&str>) -> Result<Option<Self>, ConvertError> {
        match raw {
            Some(raw) if InputFormat::from_path(input).ok() == Some(InputFormat::Spreadsheet) => {
                raw.parse().map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(index) => write!(f, "#{}", index + 1),
            SheetSelector::Name(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for SheetSelector {
    type Err = ConvertError;

    /// All-digit input is a 1-based sheet number, anything else a sheet name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(ConvertError::InvalidArgument(
                "sheet selector must not be empty".to_string(),
            ));
        }
        if value.chars().all(|ch| ch.is_ascii_digit()) {
            let number: usize = value
                .parse()
                .map_err(|_| ConvertError::InvalidArgument(format!("sheet number {value}")))?;
            if number == 0 {
                return Err(ConvertError::SheetNotFound(
                    "sheet numbers start at 1".to_string(),
                ));
            }
            return Ok(SheetSelector::Index(number - 1));
        }
        Ok(SheetSelector::Name(value.to_string()))
    }
}

/// Converts an OS path into the UTF-8 path the pipeline works with.
pub fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf, ConvertError> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| {
        ConvertError::InvalidArgument(format!(
            "path is not valid UTF-8 text: {}",
            path.display()
        ))
    })
}

/// One cleaned BOLD row, as consumed by the classifier and writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRecord {
    pub sampleid: String,
    pub nucleotides: String,
    pub bin_uri: String,
    pub phylum_name: String,
    pub class_name: String,
    pub order_name: String,
    pub family_name: String,
    pub genus_name: String,
    pub species_name: String,
}

impl BarcodeRecord {
    /// Reads every row of a filtered table. Missing cells become empty strings.
    pub fn from_table(table: &Table) -> Result<Vec<BarcodeRecord>, ConvertError> {
        let sampleid = table.require_column(COLUMN_SAMPLEID)?;
        let nucleotides = table.require_column(COLUMN_NUCLEOTIDES)?;
        let bin_uri = table.require_column(COLUMN_BIN_URI)?;
        let ranks = RANK_COLUMNS
            .iter()
            .map(|name| table.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(table
            .rows()
            .iter()
            .map(|row| BarcodeRecord {
                sampleid: text(row, sampleid),
                nucleotides: text(row, nucleotides),
                bin_uri: text(row, bin_uri),
                phylum_name: text(row, ranks[0]),
                class_name: text(row, ranks[1]),
                order_name: text(row, ranks[2]),
                family_name: text(row, ranks[3]),
                genus_name: text(row, ranks[4]),
                species_name: text(row, ranks[5]),
            })
            .collect())
    }
}

fn text(row: &[Option<String>], idx: usize) -> String {
    row.get(idx).cloned().flatten().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn extension_is_case_sensitive() {
        assert_eq!(
            InputFormat::from_path(Utf8Path::new("bold.csv")).unwrap(),
            InputFormat::Csv
        );
        let err = InputFormat::from_path(Utf8Path::new("bold.CSV")).unwrap_err();
        assert_matches!(err, ConvertError::UnsupportedType(_));
    }

    #[test]
    fn spreadsheet_extensions_route_to_workbook_reader() {
        for ext in SPREADSHEET_EXTENSIONS {
            let path = Utf8PathBuf::from(format!("bold.{ext}"));
            assert_eq!(
                InputFormat::from_path(&path).unwrap(),
                InputFormat::Spreadsheet
            );
        }
    }

    #[test]
    fn missing_extension_is_unsupported() {
        let err = InputFormat::from_path(Utf8Path::new("bold")).unwrap_err();
        assert_matches!(err, ConvertError::UnsupportedType(_));
    }

    #[test]
    fn sheet_selector_number_is_one_based() {
        let sheet: SheetSelector = "2".parse().unwrap();
        assert_eq!(sheet, SheetSelector::Index(1));
    }

    #[test]
    fn sheet_selector_name() {
        let sheet: SheetSelector = "Lab Sheet 2".parse().unwrap();
        assert_eq!(sheet, SheetSelector::Name("Lab Sheet 2".to_string()));
    }

    #[test]
    fn sheet_selector_zero_is_rejected() {
        let err = "0".parse::<SheetSelector>().unwrap_err();
        assert_matches!(err, ConvertError::SheetNotFound(_));
    }

    #[test]
    fn sheet_selector_is_ignored_for_delimited_input() {
        for name in ["bold.csv", "bold.tsv", "bold.txt"] {
            let sheet = SheetSelector::for_input(Utf8Path::new(name), Some("0")).unwrap();
            assert_eq!(sheet, None, "{name}");
        }
    }

    #[test]
    fn sheet_selector_is_parsed_for_workbooks() {
        let path = Utf8Path::new("bold.xlsx");
        let sheet = SheetSelector::for_input(path, Some("2")).unwrap();
        assert_eq!(sheet, Some(SheetSelector::Index(1)));
        let err = SheetSelector::for_input(path, Some("0")).unwrap_err();
        assert_matches!(err, ConvertError::SheetNotFound(_));
        assert_eq!(SheetSelector::for_input(path, None).unwrap(), None);
    }
}
