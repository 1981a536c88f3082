//! # Table Model

use std::{borrow::Cow, fmt};

use crate::errors::{SDResult, SqlDecodeError};

/// Header text of the synthetic "no filter" column.
pub const SENTINEL_HEADER: &str = "空列";

/// Declared type of a table column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// `text`
    Text,

    /// `real`
    Real,

    /// Any other tag; rejected by legality checking.
    Other(String),
}

impl From<String> for ColumnType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => ColumnType::Text,
            "real" => ColumnType::Real,
            _ => ColumnType::Other(tag),
        }
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        match value {
            ColumnType::Text => "text".to_string(),
            ColumnType::Real => "real".to_string(),
            ColumnType::Other(tag) => tag,
        }
    }
}

/// A single table cell.
///
/// Cells arrive from JSON as either strings or numbers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// A JSON number.
    Number(f64),

    /// A JSON string.
    Text(String),
}

/// Render a number the way cell values are compared as text.
///
/// Integral values render without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl Cell {
    /// The textual form of the cell.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Cell::Number(n) => Cow::Owned(format_number(*n)),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// The numeric value of the cell, if it has one.
    ///
    /// Text cells holding a plain decimal literal count as numeric.
    pub fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Was this cell a JSON number?
    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// A table: headers, column types, and rows.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    /// Table id.
    pub id: String,

    /// Display name used in rendered SQL.
    #[serde(default, alias = "tablename")]
    pub name: String,

    /// Column headers.
    pub header: Vec<String>,

    /// Per-column type tags, aligned with `header`.
    pub types: Vec<ColumnType>,

    /// Rows of cells, aligned positionally with `header`.
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// The number of header columns.
    pub fn num_columns(&self) -> usize {
        self.header.len()
    }

    /// Does the header already end with the synthetic "no filter" column?
    pub fn has_sentinel_header(&self) -> bool {
        self.header.last().is_some_and(|h| h == SENTINEL_HEADER)
    }

    /// Index of the synthetic "no filter" column.
    ///
    /// This is the last column the encoder scores: the stored header's last
    /// entry when it is already the sentinel, otherwise one past the header.
    pub fn sentinel_column(&self) -> usize {
        if self.has_sentinel_header() {
            self.header.len() - 1
        } else {
            self.header.len()
        }
    }

    /// Headers as seen by the encoder, sentinel included.
    pub fn encoder_headers(&self) -> Vec<String> {
        let mut headers = self.header.clone();
        if !self.has_sentinel_header() {
            headers.push(SENTINEL_HEADER.to_string());
        }
        headers
    }

    /// The header of a column.
    pub fn column_header(
        &self,
        column: usize,
    ) -> SDResult<&str> {
        self.header
            .get(column)
            .map(|h| h.as_str())
            .ok_or(SqlDecodeError::ColumnOutOfRange {
                column,
                num_columns: self.header.len(),
            })
    }

    /// The declared type of a column.
    pub fn column_type(
        &self,
        column: usize,
    ) -> SDResult<&ColumnType> {
        self.types.get(column).ok_or(SqlDecodeError::ColumnOutOfRange {
            column,
            num_columns: self.types.len(),
        })
    }

    /// The cells of one column, one per row.
    ///
    /// Rows too short to hold `column` contribute their last cell;
    /// empty rows contribute nothing.
    pub fn column_cells(
        &self,
        column: usize,
    ) -> impl Iterator<Item = (usize, &Cell)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(row_idx, row)| row.get(column).or(row.last()).map(|c| (row_idx, c)))
    }

    /// The widest row length.
    pub fn max_row_len(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}
