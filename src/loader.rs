//! Buffered bulk loading of records into a sheet
//!
//! [`GenericLoader`] reads records in batches of `buffer_items`, extracts the
//! fields of each batch into a reused row buffer, grows the sheet when
//! auto-spread is on and writes every batch as one rectangular block. Change
//! events are suspended for the whole loop and a single aggregate
//! `RangeDataChanged` event covers the written rectangle afterwards.

use crate::error::{ImportError, Result};
use crate::extract::FieldExtractor;
use crate::grid::{Surface, SurfaceContainer, SuspendGuard};
use crate::types::{CellValue, RangePosition, TargetRange};
use log::{debug, trace, warn};
use std::time::{Duration, Instant};

/// Records read per batch unless configured otherwise
pub const DEFAULT_READ_BUFFER_ITEMS: usize = 512;

/// Sheet name used when none is configured
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Initial field capacity of each row buffer
const ROW_BUFFER_CAPACITY: usize = 256;

/// What happens to the cells of a record narrower than the block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortRowPolicy {
    /// Write `CellValue::Empty` into the trailing cells of the block
    #[default]
    Clear,
    /// Leave the trailing cells as they were
    Preserve,
}

impl ShortRowPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "clear" => Some(ShortRowPolicy::Clear),
            "preserve" => Some(ShortRowPolicy::Preserve),
            _ => None,
        }
    }
}

/// Settings for one load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Name given to the sheet when the workbook has none
    pub sheet_name: String,
    /// Where records land on the sheet
    pub target_range: TargetRange,
    /// Records per batch
    pub buffer_items: usize,
    /// Grow rows and columns to fit the data
    pub auto_spread: bool,
    /// Handling of records narrower than the block
    pub short_rows: ShortRowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            target_range: TargetRange::ENTIRE,
            buffer_items: DEFAULT_READ_BUFFER_ITEMS,
            auto_spread: true,
            short_rows: ShortRowPolicy::Clear,
        }
    }
}

impl LoadOptions {
    pub fn builder() -> LoadOptionsBuilder {
        LoadOptionsBuilder::default()
    }

    /// Defaults overridden from the environment
    ///
    /// Reads `GRIDLOAD_BUFFER_ITEMS` (positive integer), `GRIDLOAD_AUTO_SPREAD`
    /// (`true`/`false`/`1`/`0`) and `GRIDLOAD_SHORT_ROWS` (`clear`/`preserve`).
    /// Unset or unparsable variables keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = LoadOptions::default();

        if let Some(items) = lookup("GRIDLOAD_BUFFER_ITEMS")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            options.buffer_items = items;
        }

        if let Some(flag) = lookup("GRIDLOAD_AUTO_SPREAD")
            .and_then(|s| CellValue::String(s.trim().to_string()).as_bool())
        {
            options.auto_spread = flag;
        }

        if let Some(policy) = lookup("GRIDLOAD_SHORT_ROWS").and_then(|s| ShortRowPolicy::parse(&s)) {
            options.short_rows = policy;
        }

        options
    }
}

/// Builder for [`LoadOptions`]
#[derive(Debug, Default)]
pub struct LoadOptionsBuilder {
    sheet_name: Option<String>,
    target_range: Option<TargetRange>,
    buffer_items: Option<usize>,
    auto_spread: Option<bool>,
    short_rows: Option<ShortRowPolicy>,
}

impl LoadOptionsBuilder {
    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = Some(name.to_string());
        self
    }

    pub fn with_target_range(mut self, range: TargetRange) -> Self {
        self.target_range = Some(range);
        self
    }

    /// Records per batch (0 is treated as 1)
    pub fn with_buffer_items(mut self, items: usize) -> Self {
        self.buffer_items = Some(items);
        self
    }

    pub fn with_auto_spread(mut self, enabled: bool) -> Self {
        self.auto_spread = Some(enabled);
        self
    }

    pub fn with_short_rows(mut self, policy: ShortRowPolicy) -> Self {
        self.short_rows = Some(policy);
        self
    }

    pub fn build(self) -> LoadOptions {
        let defaults = LoadOptions::default();
        LoadOptions {
            sheet_name: self.sheet_name.unwrap_or(defaults.sheet_name),
            target_range: self.target_range.unwrap_or(defaults.target_range),
            buffer_items: self.buffer_items.unwrap_or(defaults.buffer_items),
            auto_spread: self.auto_spread.unwrap_or(defaults.auto_spread),
            short_rows: self.short_rows.unwrap_or(defaults.short_rows),
        }
    }
}

/// Outcome of a load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    /// Rectangle covered by the aggregate change event
    pub range: RangePosition,
    /// Records written
    pub records: usize,
    /// Records dropped by the row bound
    pub discarded: usize,
    /// Batches processed
    pub batches: usize,
    /// Rows appended to the sheet
    pub rows_appended: u32,
    /// Row the next record would have been written to
    pub next_row: u32,
    pub elapsed: Duration,
}

/// Loads record sequences into sheets
///
/// # Examples
///
/// ```
/// use gridload::{GenericLoader, LoadOptions, RecordExtractor, Surface, Workbook};
///
/// let rows = vec![vec![1, 2], vec![3, 4], vec![5]];
/// let mut book = Workbook::new();
///
/// let loader = GenericLoader::with_options(
///     RecordExtractor,
///     LoadOptions::builder().with_sheet_name("Data").build(),
/// );
/// let summary = loader.load(&mut book, rows).unwrap();
///
/// assert_eq!(summary.records, 3);
/// assert_eq!(summary.range.cols, 2);
/// assert_eq!(book.worksheet(0).unwrap().name(), "Data");
/// ```
#[derive(Debug, Clone)]
pub struct GenericLoader<E> {
    extractor: E,
    options: LoadOptions,
}

impl<E> GenericLoader<E> {
    /// Loader with default options
    pub fn new(extractor: E) -> Self {
        Self::with_options(extractor, LoadOptions::default())
    }

    pub fn with_options(extractor: E, options: LoadOptions) -> Self {
        GenericLoader { extractor, options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Replace the container's contents with `records`
    ///
    /// An empty container gets a new sheet named after the options. Otherwise
    /// every sheet but the first is removed and the first one is reset. The
    /// records are then read into that sheet.
    pub fn load<C, I>(&self, container: &mut C, records: I) -> Result<LoadSummary>
    where
        C: SurfaceContainer,
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        E: FieldExtractor<I::Item>,
    {
        self.options.target_range.validate()?;
        let sheet = prepare_sheet(container, &self.options.sheet_name)?;
        self.read(sheet, records)
    }

    /// Read `records` into an existing sheet without resetting it
    pub fn read<S, I>(&self, sheet: &mut S, records: I) -> Result<LoadSummary>
    where
        S: Surface + ?Sized,
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        E: FieldExtractor<I::Item>,
    {
        let started = Instant::now();
        let target = sheet.fix_range(self.options.target_range)?;
        let auto_spread = self.options.auto_spread;

        // the sheet never grows without auto-spread, so the start must already exist
        if !auto_spread && (target.row >= sheet.row_count() || target.col >= sheet.column_count()) {
            return Err(ImportError::InvalidRange {
                range: self.options.target_range.to_string(),
                reason: format!(
                    "starts outside sheet '{}' ({}x{}) and auto-spread is off",
                    sheet.name(),
                    sheet.row_count(),
                    sheet.column_count()
                ),
            });
        }

        let mut records = records.into_iter();
        let total = records.len();
        let buffer_items = self.options.buffer_items.min(total).max(1);

        // without auto-spread the sheet never grows, so the block must fit
        // inside the current extents
        let row_limit = if auto_spread {
            total
        } else {
            total.min(
                target
                    .rows
                    .min(sheet.row_count().saturating_sub(target.row)) as usize,
            )
        };
        let col_limit = if auto_spread {
            target.cols
        } else {
            target
                .cols
                .min(sheet.column_count().saturating_sub(target.col))
        };

        let mut state = BatchState::new(buffer_items, row_limit, col_limit as usize, target);

        {
            let mut guard = SuspendGuard::new(sheet);
            let sheet_name = guard.name().to_string();

            let mut finished = false;
            while !finished {
                finished = state
                    .run_batch(&mut *guard, &mut records, &self.extractor, &self.options, auto_spread)
                    .map_err(|source| ImportError::LoadFailed {
                        row: state.cursor,
                        sheet: sheet_name.clone(),
                        source: Box::new(source),
                    })?;
            }
        }

        let discarded = total - state.consumed;
        if discarded > 0 {
            warn!(
                "Discarded {} of {} records outside target range {} on sheet '{}'",
                discarded,
                total,
                self.options.target_range,
                sheet.name()
            );
        }

        let range = RangePosition::new(
            target.row,
            target.col,
            state.consumed as u32,
            state.width as u32,
        );
        sheet.raise_range_data_changed(range);

        let elapsed = started.elapsed();
        debug!(
            "load generic records: {} ms, rows: {}, range: {}, batches: {}",
            elapsed.as_millis(),
            state.consumed,
            range,
            state.batches
        );

        Ok(LoadSummary {
            range,
            records: state.consumed,
            discarded,
            batches: state.batches,
            rows_appended: state.rows_appended,
            next_row: state.cursor,
            elapsed,
        })
    }
}

/// Leave exactly one reset sheet in the container and return it
fn prepare_sheet<'c, C: SurfaceContainer>(
    container: &'c mut C,
    sheet_name: &str,
) -> Result<&'c mut C::Surface> {
    if container.surface_count() == 0 {
        let sheet = container.create_surface(sheet_name)?;
        container.add_surface(sheet)?;
    } else {
        while container.surface_count() > 1 {
            let last = container.surface_count() - 1;
            container.remove_surface_at(last)?;
        }
        if let Some(sheet) = container.surface_mut(0) {
            sheet.reset();
        }
    }

    container.surface_mut(0).ok_or(ImportError::SheetIndexOutOfRange {
        index: 0,
        count: 0,
    })
}

/// State carried across batches of one load
struct BatchState<R> {
    target: RangePosition,
    /// reused record window
    items: Vec<R>,
    /// reused field rows, one per buffered record
    rows: Vec<Vec<CellValue>>,
    /// records to consume before stopping
    row_limit: usize,
    col_limit: usize,
    consumed: usize,
    cursor: u32,
    width: usize,
    batches: usize,
    rows_appended: u32,
}

impl<R> BatchState<R> {
    fn new(buffer_items: usize, row_limit: usize, col_limit: usize, target: RangePosition) -> Self {
        let row_capacity = col_limit.min(ROW_BUFFER_CAPACITY);
        BatchState {
            target,
            items: Vec::with_capacity(buffer_items),
            rows: (0..buffer_items)
                .map(|_| Vec::with_capacity(row_capacity))
                .collect(),
            row_limit,
            col_limit,
            consumed: 0,
            cursor: target.row,
            width: 0,
            batches: 0,
            rows_appended: 0,
        }
    }

    fn buffer_items(&self) -> usize {
        self.rows.len()
    }

    /// Fill, grow, extract, write and advance once. Returns true when done.
    fn run_batch<S, I, E>(
        &mut self,
        sheet: &mut S,
        records: &mut I,
        extractor: &E,
        options: &LoadOptions,
        auto_spread: bool,
    ) -> Result<bool>
    where
        S: Surface + ?Sized,
        I: Iterator<Item = R>,
        E: FieldExtractor<R>,
    {
        let finished = self.fill(records);
        let read_items = self.items.len();

        if auto_spread {
            self.grow_rows(sheet, read_items)?;
        }

        self.extract(sheet, extractor, auto_spread)?;

        if read_items > 0 {
            if options.short_rows == ShortRowPolicy::Clear {
                for row in self.rows.iter_mut().take(read_items) {
                    if row.len() < self.width {
                        row.resize(self.width, CellValue::Empty);
                    }
                }
            }

            trace!(
                "Writing batch {} at row {}: {} records x {} fields",
                self.batches,
                self.cursor,
                read_items,
                self.width
            );
            sheet.set_range_data(
                self.cursor,
                self.target.col,
                read_items as u32,
                self.width as u32,
                &self.rows[..read_items],
            )?;
            self.cursor += read_items as u32;
        }

        self.batches += 1;
        Ok(finished)
    }

    /// Move the next batch of records into the record window
    fn fill<I: Iterator<Item = R>>(&mut self, records: &mut I) -> bool {
        self.items.clear();
        while self.items.len() < self.buffer_items() {
            if self.consumed >= self.row_limit {
                return true;
            }
            match records.next() {
                Some(record) => {
                    self.items.push(record);
                    self.consumed += 1;
                }
                None => return true,
            }
        }
        self.consumed >= self.row_limit
    }

    /// Grow the row extent to the next multiple of the batch size covering the batch
    fn grow_rows<S: Surface + ?Sized>(&mut self, sheet: &mut S, read_items: usize) -> Result<()> {
        let needed = self.cursor as u64 + read_items as u64;
        let current = sheet.row_count() as u64;
        if needed <= current {
            return Ok(());
        }

        let step = self.buffer_items() as u64;
        let grown = needed.div_ceil(step) * step;
        let append = u32::try_from(grown - current).map_err(|_| {
            ImportError::grid(sheet.name(), format!("cannot grow to {} rows", grown))
        })?;

        trace!("Appending {} rows to sheet '{}' ({} -> {})", append, sheet.name(), current, grown);
        sheet.append_rows(append)?;
        self.rows_appended += append;
        Ok(())
    }

    /// Extract the fields of every buffered record into the row buffer
    fn extract<S, E>(&mut self, sheet: &mut S, extractor: &E, auto_spread: bool) -> Result<()>
    where
        S: Surface + ?Sized,
        E: FieldExtractor<R>,
    {
        for (record, row) in self.items.iter().zip(self.rows.iter_mut()) {
            row.clear();
            extractor.extract(record, self.col_limit, row)?;
            row.truncate(self.col_limit);

            if row.len() > self.width {
                self.width = row.len();
            }

            if auto_spread {
                let needed = self.target.col as u64 + self.width as u64;
                if sheet.column_count() as u64 <= needed {
                    let cols = u32::try_from(needed + 1).map_err(|_| {
                        ImportError::grid(sheet.name(), format!("cannot grow to {} columns", needed + 1))
                    })?;
                    trace!("Setting {} columns on sheet '{}'", cols, sheet.name());
                    sheet.set_column_count(cols)?;
                }
            }
        }
        Ok(())
    }
}
