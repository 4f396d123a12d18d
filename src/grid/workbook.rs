//! In-memory workbook: an ordered set of uniquely named worksheets

use super::worksheet::{Worksheet, WorksheetOptions};
use super::SurfaceContainer;
use crate::error::{ImportError, Result};
use crate::extract::{Record, RecordExtractor};
use crate::loader::{GenericLoader, LoadOptions, LoadSummary};
use indexmap::IndexMap;

/// Sheet name maximum length
pub const SHEET_NAME_MAX_LEN: usize = 31;
/// Characters not allowed in sheet names
pub const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Check a sheet name against the xlsx naming rules
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "name is empty".to_string()
    } else if name.chars().count() > SHEET_NAME_MAX_LEN {
        format!("longer than {} characters", SHEET_NAME_MAX_LEN)
    } else if let Some(c) = name.chars().find(|c| SHEET_NAME_ILLEGAL.contains(c)) {
        format!("contains '{}'", c)
    } else if name.starts_with('\'') || name.ends_with('\'') {
        "starts or ends with an apostrophe".to_string()
    } else {
        return Ok(());
    };

    Err(ImportError::InvalidSheetName {
        name: name.to_string(),
        reason,
    })
}

/// Workbook holding worksheets in insertion order
///
/// Names are unique, compared case-insensitively like spreadsheet
/// applications do.
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: IndexMap<String, Worksheet>,
    sheet_options: WorksheetOptions,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Workbook::default()
    }

    /// Create an empty workbook whose new sheets use `options`
    pub fn with_sheet_options(options: WorksheetOptions) -> Self {
        Workbook {
            sheets: IndexMap::new(),
            sheet_options: options,
        }
    }

    /// Build a worksheet with this workbook's sheet options (not registered)
    pub fn create_worksheet(&self, name: &str) -> Result<Worksheet> {
        validate_sheet_name(name)?;
        Ok(Worksheet::with_options(name, self.sheet_options))
    }

    /// Register a worksheet at the end
    pub fn add_worksheet(&mut self, sheet: Worksheet) -> Result<()> {
        use super::Surface;

        let key = sheet.name().to_lowercase();
        if self.sheets.contains_key(&key) {
            return Err(ImportError::DuplicateSheet(sheet.name().to_string()));
        }
        self.sheets.insert(key, sheet);
        Ok(())
    }

    /// Remove and return the worksheet at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<Worksheet> {
        let count = self.sheets.len();
        self.sheets
            .shift_remove_index(index)
            .map(|(_, sheet)| sheet)
            .ok_or(ImportError::SheetIndexOutOfRange { index, count })
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get_index(index).map(|(_, sheet)| sheet)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_index_mut(index).map(|(_, sheet)| sheet)
    }

    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.get(&name.to_lowercase())
    }

    /// Sheet names in order
    pub fn sheet_names(&self) -> Vec<String> {
        use super::Surface;

        self.sheets.values().map(|s| s.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheets.values()
    }

    /// Replace the workbook contents with `records`, one row per record
    ///
    /// Uses default [`LoadOptions`] with the given sheet name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridload::{impl_record, Workbook};
    ///
    /// struct Point { x: i64, y: i64 }
    /// impl_record!(Point { x, y });
    ///
    /// let mut book = Workbook::new();
    /// let summary = book
    ///     .load_records(vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }], "Points")
    ///     .unwrap();
    /// assert_eq!(summary.records, 2);
    /// ```
    pub fn load_records<I>(&mut self, records: I, sheet_name: &str) -> Result<LoadSummary>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        I::Item: Record,
    {
        let options = LoadOptions::builder().with_sheet_name(sheet_name).build();
        GenericLoader::with_options(RecordExtractor, options).load(self, records)
    }
}

impl SurfaceContainer for Workbook {
    type Surface = Worksheet;

    fn surface_count(&self) -> usize {
        self.len()
    }

    fn create_surface(&self, name: &str) -> Result<Worksheet> {
        self.create_worksheet(name)
    }

    fn remove_surface_at(&mut self, index: usize) -> Result<()> {
        self.remove_at(index).map(|_| ())
    }

    fn add_surface(&mut self, surface: Worksheet) -> Result<()> {
        self.add_worksheet(surface)
    }

    fn surface_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheet_mut(index)
    }
}
