use std::collections::HashSet;

use crate::error::ConvertError;

/// A table cell; `None` is a missing value.
pub type Cell = Option<String>;

/// Literal cell texts that load as missing values. Matching is exact and
/// case-sensitive.
pub const MISSING_TOKENS: &[&str] = &[
    "",
    "#N/A",
    "#N/A N/A",
    "#NA",
    "-1.#IND",
    "-1.#QNAN",
    "-NaN",
    "-nan",
    "1.#IND",
    "1.#QNAN",
    "<NA>",
    "N/A",
    "NA",
    "NULL",
    "NaN",
    "None",
    "n/a",
    "nan",
    "null",
    " # N/A",
    "#DIV/0!",
    "unknown",
    "Unknown",
];

#[derive(Debug, Clone)]
pub struct MissingTokens {
    tokens: HashSet<String>,
}

impl Default for MissingTokens {
    fn default() -> Self {
        Self {
            tokens: MISSING_TOKENS.iter().map(|token| token.to_string()).collect(),
        }
    }
}

impl MissingTokens {
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = Self::default();
        tokens.tokens.extend(extra.into_iter().map(Into::into));
        tokens
    }

    pub fn is_missing(&self, value: &str) -> bool {
        self.tokens.contains(value)
    }

    pub fn normalize(&self, value: String) -> Cell {
        if self.is_missing(&value) {
            None
        } else {
            Some(value)
        }
    }
}

/// In-memory working table: a header plus rows of optional cells.
///
/// Every row has exactly one cell per column; short input rows are padded
/// with missing cells and long ones are truncated when the table is built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from raw text rows, the first of which is the header.
    pub fn from_raw_rows<I>(raw: I, missing: &MissingTokens) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut raw = raw.into_iter();
        let Some(header) = raw.next() else {
            return Self::default();
        };
        let mut table = Self::new(header);
        for row in raw {
            table.push_row(row.into_iter().map(|value| missing.normalize(value)).collect());
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, ConvertError> {
        self.column_index(name)
            .ok_or_else(|| ConvertError::MissingColumn(name.to_string()))
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Replaces every cell of a column with its text form; missing cells
    /// become `missing_text`.
    pub fn coerce_text(&mut self, column: usize, missing_text: &str) {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(column) {
                if cell.is_none() {
                    *cell = Some(missing_text.to_string());
                }
            }
        }
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Cell]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Drops rows equal in every cell to an earlier row.
    pub fn dedup_rows(&mut self) {
        let mut seen = HashSet::with_capacity(self.rows.len());
        self.rows.retain(|row| seen.insert(row.clone()));
    }

    pub fn fill_missing(&mut self, value: &str) {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_none() {
                *cell = Some(value.to_string());
            }
        }
    }
}
