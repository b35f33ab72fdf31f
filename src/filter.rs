use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{COLUMN_MARKER_CODES, COLUMN_NUCLEOTIDES};
use crate::error::ConvertError;
use crate::table::Table;

pub const DEFAULT_MARKER: &str = "COI-5P";

/// Text a missing cell takes when a column is coerced to text.
const MISSING_TEXT: &str = "nan";

/// Any character outside the uppercase IUPAC nucleotide alphabet.
static INVALID_NUCLEOTIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[^ACGTURYKMSWBDHVN]").expect("nucleotide alphabet pattern is valid")
});

/// Counts of rows dropped by each rule, in the order the rules run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub input: usize,
    pub marker_dropped: usize,
    pub duplicates_dropped: usize,
    pub sequence_dropped: usize,
}

impl FilterStats {
    pub fn retained(&self) -> usize {
        self.input - self.marker_dropped - self.duplicates_dropped - self.sequence_dropped
    }
}

pub fn is_valid_sequence(sequence: &str) -> bool {
    !INVALID_NUCLEOTIDE.is_match(sequence)
}

/// Cleans a loaded table.
///
/// Rows survive when their marker column (if any) mentions `marker`, they
/// are not an exact duplicate of an earlier row, and their sequence uses
/// only uppercase IUPAC codes. Remaining missing cells become `""`.
/// Filtering an already filtered table returns it unchanged.
pub fn filter_table(table: Table, marker: &str) -> Result<Table, ConvertError> {
    filter_table_with_stats(table, marker).map(|(table, _)| table)
}

pub fn filter_table_with_stats(
    mut table: Table,
    marker: &str,
) -> Result<(Table, FilterStats), ConvertError> {
    let mut stats = FilterStats {
        input: table.len(),
        ..FilterStats::default()
    };

    let nucleotides = table.require_column(COLUMN_NUCLEOTIDES)?;
    table.coerce_text(nucleotides, MISSING_TEXT);

    if let Some(marker_codes) = table.column_index(COLUMN_MARKER_CODES) {
        table.coerce_text(marker_codes, MISSING_TEXT);
        let before = table.len();
        table.retain_rows(|row| {
            row[marker_codes]
                .as_deref()
                .is_some_and(|codes| codes.contains(marker))
        });
        stats.marker_dropped = before - table.len();
    } else {
        debug!("no {COLUMN_MARKER_CODES} column, skipping marker filter");
    }

    let before = table.len();
    table.dedup_rows();
    stats.duplicates_dropped = before - table.len();

    let before = table.len();
    table.retain_rows(|row| row[nucleotides].as_deref().is_some_and(is_valid_sequence));
    stats.sequence_dropped = before - table.len();

    table.fill_missing("");

    debug!(
        input = stats.input,
        marker_dropped = stats.marker_dropped,
        duplicates_dropped = stats.duplicates_dropped,
        sequence_dropped = stats.sequence_dropped,
        "filter applied"
    );
    Ok((table, stats))
}
