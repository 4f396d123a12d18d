//! Type definitions for grid data and placements

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// Represents a single cell value in a grid
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// DateTime value (spreadsheet serial date number, 1900 date system)
    DateTime(f64),
    /// Error value
    Error(String),
}

impl CellValue {
    /// Convert cell value to string
    pub fn as_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(d) => d.to_string(),
            CellValue::Error(e) => format!("ERROR: {}", e),
        }
    }

    /// Check if cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Int(i) => Some(*i != 0),
            CellValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::String(s.clone())
    }
}

impl From<char> for CellValue {
    fn from(c: char) -> Self {
        CellValue::String(c.to_string())
    }
}

macro_rules! int_cell_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(i: $t) -> Self {
                    CellValue::Int(i as i64)
                }
            }
        )*
    };
}

int_cell_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for CellValue {
    fn from(f: f32) -> Self {
        CellValue::Float(f as f64)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Day zero of the 1900 date system, shifted to absorb the 1900 leap-year quirk
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

impl From<NaiveDate> for CellValue {
    fn from(date: NaiveDate) -> Self {
        CellValue::DateTime((date - serial_epoch()).num_days() as f64)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        let days = (dt.date() - serial_epoch()).num_days() as f64;
        let secs = dt.time().num_seconds_from_midnight() as f64;
        CellValue::DateTime(days + secs / 86_400.0)
    }
}

/// Represents a row of cells read back from a grid
#[derive(Debug, Clone)]
pub struct Row {
    /// Row index (0-based)
    pub index: u32,
    /// Cells in this row
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(index: u32, cells: Vec<CellValue>) -> Self {
        Row { index, cells }
    }

    /// Get cell at column index
    pub fn get(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(col)
    }

    /// Get number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if row is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.cells.iter().all(|c| c.is_empty())
    }

    /// Convert row to vector of strings
    pub fn to_strings(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.as_string()).collect()
    }
}

/// Convert a 0-based column index to its letter (0 -> A, 25 -> Z, 26 -> AA)
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut col = col as u64 + 1;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Spreadsheet-style reference of a cell (row 0, col 0 -> "A1")
pub fn cell_reference(row: u32, col: u32) -> String {
    let mut buf = itoa::Buffer::new();
    let mut reference = col_to_letter(col);
    reference.push_str(buf.format(row as u64 + 1));
    reference
}

/// A concrete rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RangePosition {
    /// First row (0-based)
    pub row: u32,
    /// First column (0-based)
    pub col: u32,
    /// Number of rows
    pub rows: u32,
    /// Number of columns
    pub cols: u32,
}

impl RangePosition {
    pub fn new(row: u32, col: u32, rows: u32, cols: u32) -> Self {
        RangePosition {
            row,
            col,
            rows,
            cols,
        }
    }

    /// True when the rectangle covers no cell
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Row just past the rectangle
    pub fn end_row(&self) -> u64 {
        self.row as u64 + self.rows as u64
    }

    /// Column just past the rectangle
    pub fn end_col(&self) -> u64 {
        self.col as u64 + self.cols as u64
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.row
            && (row as u64) < self.end_row()
            && col >= self.col
            && (col as u64) < self.end_col()
    }
}

impl fmt::Display for RangePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = cell_reference(self.row, self.col);
        if self.is_empty() {
            return write!(f, "{}[0x0]", start);
        }
        let end = cell_reference(
            self.row + (self.rows - 1),
            self.col + (self.cols - 1),
        );
        write!(f, "{}:{}", start, end)
    }
}

/// Where imported records are placed on a sheet
///
/// A `None` bound means "as far as the sheet allows". [`TargetRange::ENTIRE`]
/// starts at A1 with both sides unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRange {
    /// First row (0-based)
    pub row: u32,
    /// First column (0-based)
    pub col: u32,
    /// Maximum number of rows, unbounded when `None`
    pub rows: Option<u32>,
    /// Maximum number of columns, unbounded when `None`
    pub cols: Option<u32>,
}

impl TargetRange {
    /// The whole sheet, starting at A1
    pub const ENTIRE: TargetRange = TargetRange {
        row: 0,
        col: 0,
        rows: None,
        cols: None,
    };

    /// Unbounded range starting at the given cell
    pub fn starting_at(row: u32, col: u32) -> Self {
        TargetRange {
            row,
            col,
            rows: None,
            cols: None,
        }
    }

    /// Bounded range
    pub fn bounded(row: u32, col: u32, rows: u32, cols: u32) -> Self {
        TargetRange {
            row,
            col,
            rows: Some(rows),
            cols: Some(cols),
        }
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_cols(mut self, cols: u32) -> Self {
        self.cols = Some(cols);
        self
    }

    /// Reject zero-sized bounds
    pub fn validate(&self) -> crate::Result<()> {
        let reason = match (self.rows, self.cols) {
            (Some(0), _) => "row bound must be positive",
            (_, Some(0)) => "column bound must be positive",
            _ => return Ok(()),
        };
        Err(crate::ImportError::InvalidRange {
            range: self.to_string(),
            reason: reason.to_string(),
        })
    }
}

impl Default for TargetRange {
    fn default() -> Self {
        TargetRange::ENTIRE
    }
}

impl From<RangePosition> for TargetRange {
    fn from(range: RangePosition) -> Self {
        TargetRange::bounded(range.row, range.col, range.rows, range.cols)
    }
}

impl fmt::Display for TargetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<u32>| b.map(|n| n.to_string()).unwrap_or_else(|| "*".to_string());
        write!(
            f,
            "{}[{}x{}]",
            cell_reference(self.row, self.col),
            bound(self.rows),
            bound(self.cols)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference(0, 0), "A1");
        assert_eq!(cell_reference(0, 25), "Z1");
        assert_eq!(cell_reference(9, 26), "AA10");
        assert_eq!(col_to_letter(16_383), "XFD");
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::Int(42).as_string(), "42");
        assert_eq!(CellValue::Int(0).as_bool(), Some(false));

        let val = CellValue::String("true".to_string());
        assert_eq!(val.as_bool(), Some(true));

        assert_eq!(CellValue::from(None::<i32>), CellValue::Empty);
        assert_eq!(CellValue::from(Some(7u8)), CellValue::Int(7));
    }

    #[test]
    fn test_date_serials() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(CellValue::from(date), CellValue::DateTime(45292.0));

        let noon = date.and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(CellValue::from(noon), CellValue::DateTime(45292.5));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(RangePosition::new(0, 0, 3, 2).to_string(), "A1:B3");
        assert_eq!(RangePosition::new(4, 1, 0, 0).to_string(), "B5[0x0]");
        assert_eq!(TargetRange::ENTIRE.to_string(), "A1[*x*]");
        assert_eq!(TargetRange::bounded(1, 2, 10, 3).to_string(), "C2[10x3]");
    }

    #[test]
    fn test_target_range_validate() {
        assert!(TargetRange::ENTIRE.validate().is_ok());
        assert!(TargetRange::ENTIRE.with_rows(0).validate().is_err());
        assert!(TargetRange::starting_at(3, 3).with_cols(0).validate().is_err());
    }
}
