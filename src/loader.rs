use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use camino::Utf8Path;
use chrono::Timelike;
use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::domain::{InputFormat, SheetSelector};
use crate::error::ConvertError;
use crate::table::{MissingTokens, Table};

/// Delimiters tried for `.txt` input, in tie-break order.
const SNIFF_CANDIDATES: [u8; 6] = [b',', b'\t', b';', b'|', b':', b' '];
const SNIFF_LINES: usize = 20;

/// Loads a BOLD export into a [`Table`].
///
/// The format follows the file extension. `sheet` is only consulted for
/// spreadsheet inputs; without it the first worksheet is read.
pub fn load_table(
    path: &Utf8Path,
    sheet: Option<&SheetSelector>,
    missing: &MissingTokens,
) -> Result<Table, ConvertError> {
    if !path.as_std_path().exists() {
        return Err(ConvertError::NotFound(path.to_string()));
    }
    let format = InputFormat::from_path(path)?;
    debug!(%path, %format, "loading input");

    let table = match format {
        InputFormat::Spreadsheet => load_spreadsheet(path, sheet, missing)?,
        InputFormat::Csv | InputFormat::Tsv => {
            let delimiter = format.delimiter().unwrap_or(b',');
            load_delimited(open(path)?, delimiter, missing)?
        }
        InputFormat::Txt => {
            let delimiter = sniff_delimiter(BufReader::new(open(path)?))?;
            debug!(delimiter = %char::from(delimiter).escape_default(), "sniffed delimiter");
            load_delimited(open(path)?, delimiter, missing)?
        }
    };
    debug!(rows = table.len(), columns = table.columns().len(), "input loaded");
    Ok(table)
}

fn open(path: &Utf8Path) -> Result<File, ConvertError> {
    File::open(path.as_std_path())
        .map_err(|err| ConvertError::Read(format!("open {path}: {err}")))
}

pub fn load_delimited<R: Read>(
    reader: R,
    delimiter: u8,
    missing: &MissingTokens,
) -> Result<Table, ConvertError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| ConvertError::Read(err.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(Table::from_raw_rows(rows, missing))
}

/// Picks the delimiter of a `.txt` export from its first lines.
///
/// A candidate qualifies when it appears the same non-zero number of times
/// on every sampled line; the most frequent qualifying candidate wins.
pub fn sniff_delimiter<R: BufRead>(reader: R) -> Result<u8, ConvertError> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|err| ConvertError::Read(err.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        lines.push(line);
        if lines.len() == SNIFF_LINES {
            break;
        }
    }
    let Some(header) = lines.first() else {
        return Ok(b',');
    };

    let count = |line: &str, delimiter: u8| line.bytes().filter(|b| *b == delimiter).count();

    let mut best: Option<(u8, usize)> = None;
    for delimiter in SNIFF_CANDIDATES {
        let expected = count(header, delimiter);
        if expected == 0 || lines.iter().any(|line| count(line, delimiter) != expected) {
            continue;
        }
        if best.is_none_or(|(_, top)| expected > top) {
            best = Some((delimiter, expected));
        }
    }
    if let Some((delimiter, _)) = best {
        return Ok(delimiter);
    }

    let fallback = SNIFF_CANDIDATES
        .iter()
        .copied()
        .map(|delimiter| (delimiter, count(header, delimiter)))
        .filter(|(_, n)| *n > 0)
        .fold(None::<(u8, usize)>, |top, candidate| match top {
            Some((_, n)) if n >= candidate.1 => top,
            _ => Some(candidate),
        })
        .map(|(delimiter, _)| delimiter)
        .unwrap_or(b',');
    warn!(
        delimiter = %char::from(fallback).escape_default(),
        "no consistent delimiter found, falling back to header frequency"
    );
    Ok(fallback)
}

fn load_spreadsheet(
    path: &Utf8Path,
    sheet: Option<&SheetSelector>,
    missing: &MissingTokens,
) -> Result<Table, ConvertError> {
    let mut workbook = open_workbook_auto(path.as_std_path())
        .map_err(|err| ConvertError::Read(format!("{path}: {err}")))?;

    let range = match sheet {
        Some(SheetSelector::Name(name)) => {
            if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
                return Err(ConvertError::SheetNotFound(name.clone()));
            }
            workbook
                .worksheet_range(name)
                .map_err(|err| ConvertError::Read(err.to_string()))?
        }
        Some(SheetSelector::Index(index)) => range_at(&mut workbook, *index)?,
        None => range_at(&mut workbook, 0)?,
    };

    Ok(Table::from_raw_rows(range_rows(&range), missing))
}

fn range_at(
    workbook: &mut Sheets<BufReader<File>>,
    index: usize,
) -> Result<Range<Data>, ConvertError> {
    workbook
        .worksheet_range_at(index)
        .ok_or_else(|| ConvertError::SheetNotFound(format!("#{}", index + 1)))?
        .map_err(|err| ConvertError::Read(err.to_string()))
}

/// Renders every worksheet cell as text. Empty cells render as `""`, which
/// is itself a missing token; error cells render as their literal, e.g.
/// `#DIV/0!`.
fn range_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

/// Date cells become `YYYY-MM-DD`, with ` HH:MM:SS` appended when the time
/// of day is not midnight. Durations keep their serial value.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(value) if !value.is_duration() => match value.as_datetime() {
            Some(datetime) if datetime.num_seconds_from_midnight() == 0 => {
                datetime.format("%Y-%m-%d").to_string()
            }
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        _ => cell.to_string(),
    }
}
