//! In-memory worksheet with growable extents and change events

use super::{SheetEvent, Surface};
use crate::error::{ImportError, Result};
use crate::types::{CellValue, RangePosition, Row, TargetRange};
use std::fmt;

/// Rows on a fresh or reset sheet
pub const DEFAULT_ROWS: u32 = 200;
/// Columns on a fresh or reset sheet
pub const DEFAULT_COLS: u32 = 100;
/// Addressable row limit (same as xlsx)
pub const MAX_ROWS: u32 = 1_048_576;
/// Addressable column limit (same as xlsx)
pub const MAX_COLS: u32 = 16_384;

static EMPTY: CellValue = CellValue::Empty;

/// Extents of a worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorksheetOptions {
    /// Row extent after creation or reset
    pub default_rows: u32,
    /// Column extent after creation or reset
    pub default_cols: u32,
    /// Row extent can never grow past this
    pub max_rows: u32,
    /// Column extent can never grow past this
    pub max_cols: u32,
}

impl Default for WorksheetOptions {
    fn default() -> Self {
        WorksheetOptions {
            default_rows: DEFAULT_ROWS,
            default_cols: DEFAULT_COLS,
            max_rows: MAX_ROWS,
            max_cols: MAX_COLS,
        }
    }
}

impl WorksheetOptions {
    pub fn with_default_extents(mut self, rows: u32, cols: u32) -> Self {
        self.default_rows = rows;
        self.default_cols = cols;
        self
    }

    pub fn with_max_extents(mut self, rows: u32, cols: u32) -> Self {
        self.max_rows = rows;
        self.max_cols = cols;
        self
    }
}

type EventHandler = Box<dyn FnMut(&SheetEvent)>;

/// A single sheet of cells
///
/// Rows are stored densely up to the last written cell of each row, so a
/// tall but narrow import costs one small `Vec` per row.
pub struct Worksheet {
    name: String,
    options: WorksheetOptions,
    cells: Vec<Vec<CellValue>>,
    column_count: u32,
    suspend_depth: u32,
    handlers: Vec<EventHandler>,
}

impl Worksheet {
    /// Create a sheet with default extents
    pub fn new(name: &str) -> Self {
        Self::with_options(name, WorksheetOptions::default())
    }

    pub fn with_options(name: &str, options: WorksheetOptions) -> Self {
        let mut sheet = Worksheet {
            name: name.to_string(),
            options,
            cells: Vec::new(),
            column_count: 0,
            suspend_depth: 0,
            handlers: Vec::new(),
        };
        sheet.reset();
        sheet
    }

    pub fn options(&self) -> &WorksheetOptions {
        &self.options
    }

    /// Subscribe to change events
    ///
    /// Subscriptions are dropped by [`Surface::reset`].
    pub fn on_event<F>(&mut self, handler: F)
    where
        F: FnMut(&SheetEvent) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Get a cell, `None` when outside the current extents
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        if col >= self.column_count {
            return None;
        }
        let cells = self.cells.get(row as usize)?;
        Some(cells.get(col as usize).unwrap_or(&EMPTY))
    }

    /// Write a single cell and raise `CellDataChanged`
    pub fn set_cell(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Result<()> {
        self.check_block(row, col, 1, 1)?;
        let cells = &mut self.cells[row as usize];
        let col = col as usize;
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value.into();
        self.emit(SheetEvent::CellDataChanged {
            row,
            col: col as u32,
        });
        Ok(())
    }

    /// Read back one row, padded to the column extent
    pub fn row(&self, index: u32) -> Option<Row> {
        let stored = self.cells.get(index as usize)?;
        let mut cells = Vec::with_capacity(self.column_count as usize);
        cells.extend(stored.iter().take(self.column_count as usize).cloned());
        cells.resize(self.column_count as usize, CellValue::Empty);
        Some(Row::new(index, cells))
    }

    /// Iterate over every row in the current extent
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.cells.len() as u32).filter_map(move |i| self.row(i))
    }

    /// Smallest rectangle holding every non-empty cell
    pub fn used_range(&self) -> Option<RangePosition> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (r, cells) in self.cells.iter().enumerate() {
            for (c, value) in cells.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let (r, c) = (r as u32, c as u32);
                bounds = Some(match bounds {
                    None => (r, c, r, c),
                    Some((r0, c0, r1, c1)) => (r0.min(r), c0.min(c), r1.max(r), c1.max(c)),
                });
            }
        }
        bounds.map(|(r0, c0, r1, c1)| RangePosition::new(r0, c0, r1 - r0 + 1, c1 - c0 + 1))
    }

    fn check_block(&self, row: u32, col: u32, rows: u32, cols: u32) -> Result<()> {
        let block = RangePosition::new(row, col, rows, cols);
        if block.end_row() > self.cells.len() as u64 || block.end_col() > self.column_count as u64
        {
            return Err(ImportError::grid(
                &self.name,
                format!(
                    "block {} exceeds sheet extent {}x{}",
                    block,
                    self.cells.len(),
                    self.column_count
                ),
            ));
        }
        Ok(())
    }

    fn emit(&mut self, event: SheetEvent) {
        if self.suspend_depth > 0 {
            return;
        }
        for handler in self.handlers.iter_mut() {
            handler(&event);
        }
    }
}

impl Surface for Worksheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.cells.clear();
        self.cells
            .resize_with(self.options.default_rows as usize, Vec::new);
        self.column_count = self.options.default_cols;
        self.handlers.clear();
    }

    fn row_count(&self) -> u32 {
        self.cells.len() as u32
    }

    fn column_count(&self) -> u32 {
        self.column_count
    }

    fn append_rows(&mut self, count: u32) -> Result<()> {
        let target = self.cells.len() as u64 + count as u64;
        if target > self.options.max_rows as u64 {
            return Err(ImportError::grid(
                &self.name,
                format!(
                    "cannot append {} rows to {}: limit is {}",
                    count,
                    self.cells.len(),
                    self.options.max_rows
                ),
            ));
        }
        self.cells.resize_with(target as usize, Vec::new);
        Ok(())
    }

    fn set_column_count(&mut self, count: u32) -> Result<()> {
        if count > self.options.max_cols {
            return Err(ImportError::grid(
                &self.name,
                format!(
                    "cannot set {} columns: limit is {}",
                    count, self.options.max_cols
                ),
            ));
        }
        if count < self.column_count {
            for cells in self.cells.iter_mut() {
                cells.truncate(count as usize);
            }
        }
        self.column_count = count;
        Ok(())
    }

    fn fix_range(&self, target: TargetRange) -> Result<RangePosition> {
        target.validate()?;

        let WorksheetOptions {
            max_rows, max_cols, ..
        } = self.options;
        if target.row >= max_rows || target.col >= max_cols {
            return Err(ImportError::InvalidRange {
                range: target.to_string(),
                reason: format!("starts outside sheet '{}' ({}x{})", self.name, max_rows, max_cols),
            });
        }

        let avail_rows = max_rows - target.row;
        let avail_cols = max_cols - target.col;
        Ok(RangePosition::new(
            target.row,
            target.col,
            target.rows.map_or(avail_rows, |r| r.min(avail_rows)),
            target.cols.map_or(avail_cols, |c| c.min(avail_cols)),
        ))
    }

    fn suspend_change_events(&mut self) {
        self.suspend_depth += 1;
    }

    fn resume_change_events(&mut self) {
        self.suspend_depth = self.suspend_depth.saturating_sub(1);
    }

    fn is_change_events_suspended(&self) -> bool {
        self.suspend_depth > 0
    }

    fn set_range_data(
        &mut self,
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
        data: &[Vec<CellValue>],
    ) -> Result<()> {
        if data.len() < rows as usize {
            return Err(ImportError::grid(
                &self.name,
                format!("block needs {} rows, buffer holds {}", rows, data.len()),
            ));
        }
        self.check_block(row, col, rows, cols)?;

        let start = col as usize;
        for (offset, source) in data.iter().take(rows as usize).enumerate() {
            let n = source.len().min(cols as usize);
            if n == 0 {
                continue;
            }
            let cells = &mut self.cells[row as usize + offset];
            if cells.len() < start + n {
                cells.resize(start + n, CellValue::Empty);
            }
            cells[start..start + n].clone_from_slice(&source[..n]);
        }

        self.emit(SheetEvent::RangeDataChanged(RangePosition::new(
            row, col, rows, cols,
        )));
        Ok(())
    }

    fn raise_range_data_changed(&mut self, range: RangePosition) {
        self.emit(SheetEvent::RangeDataChanged(range));
    }
}

impl fmt::Debug for Worksheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worksheet")
            .field("name", &self.name)
            .field("rows", &self.cells.len())
            .field("cols", &self.column_count)
            .field("suspend_depth", &self.suspend_depth)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
