//! Grid abstraction the loader writes into
//!
//! The loader never touches cell storage directly. It drives a [`Surface`]
//! (one sheet) obtained from a [`SurfaceContainer`] (a workbook). The crate
//! ships an in-memory [`Worksheet`] / [`Workbook`] pair implementing both.

pub mod workbook;
pub mod worksheet;

use crate::error::Result;
use crate::types::{CellValue, RangePosition, TargetRange};
use std::ops::{Deref, DerefMut};

pub use workbook::Workbook;
pub use worksheet::{Worksheet, WorksheetOptions};

/// Change notification raised by a sheet
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    /// A single cell was written
    CellDataChanged { row: u32, col: u32 },
    /// A block of cells was written
    RangeDataChanged(RangePosition),
}

/// One addressable sheet with mutable extents
pub trait Surface {
    /// Sheet name, used for error context
    fn name(&self) -> &str;

    /// Clear contents, restore default extents and drop event subscriptions
    fn reset(&mut self);

    fn row_count(&self) -> u32;

    fn column_count(&self) -> u32;

    /// Append `count` empty rows at the bottom
    fn append_rows(&mut self, count: u32) -> Result<()>;

    /// Set the column extent
    fn set_column_count(&mut self, count: u32) -> Result<()>;

    /// Resolve a target range against the sheet's addressable bounds
    fn fix_range(&self, target: TargetRange) -> Result<RangePosition>;

    /// Stop raising change events until the matching resume
    fn suspend_change_events(&mut self);

    fn resume_change_events(&mut self);

    fn is_change_events_suspended(&self) -> bool;

    /// Write a `rows x cols` block at `(row, col)` from row-major data.
    ///
    /// Row `r` of the block is taken from `data[r]`; a row shorter than
    /// `cols` leaves the rest of its cells in the block untouched.
    fn set_range_data(
        &mut self,
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
        data: &[Vec<CellValue>],
    ) -> Result<()>;

    /// Raise one aggregate change event for `range`
    fn raise_range_data_changed(&mut self, range: RangePosition);
}

/// A set of sheets, addressed by position
pub trait SurfaceContainer {
    type Surface: Surface;

    fn surface_count(&self) -> usize;

    /// Build a new, unregistered sheet
    fn create_surface(&self, name: &str) -> Result<Self::Surface>;

    fn remove_surface_at(&mut self, index: usize) -> Result<()>;

    fn add_surface(&mut self, surface: Self::Surface) -> Result<()>;

    fn surface_mut(&mut self, index: usize) -> Option<&mut Self::Surface>;
}

/// Suspends a sheet's change events for its lifetime
///
/// Events are resumed on drop, so every exit path (`?`, early return,
/// unwinding) leaves the sheet in its normal state. The guard derefs to the
/// sheet so writes go through it.
pub struct SuspendGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> SuspendGuard<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.suspend_change_events();
        SuspendGuard { surface }
    }
}

impl<S: Surface + ?Sized> Deref for SuspendGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SuspendGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SuspendGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.resume_change_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_guard_resumes_on_drop() {
        let mut sheet = Worksheet::new("Sheet1");
        {
            let guard = SuspendGuard::new(&mut sheet);
            assert!(guard.is_change_events_suspended());
        }
        assert!(!sheet.is_change_events_suspended());
    }

    #[test]
    fn test_guard_resumes_on_error_path() {
        fn write_past_end(sheet: &mut Worksheet) -> Result<()> {
            let mut guard = SuspendGuard::new(sheet);
            let rows = guard.row_count();
            guard.set_range_data(rows, 0, 1, 1, &[vec![CellValue::Int(1)]])?;
            Ok(())
        }

        let mut sheet = Worksheet::new("Sheet1");
        assert!(write_past_end(&mut sheet).is_err());
        assert!(!sheet.is_change_events_suspended());
    }

    #[test]
    fn test_guard_silences_writes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut sheet = Worksheet::new("Sheet1");
        let sink = Rc::clone(&events);
        sheet.on_event(move |e| sink.borrow_mut().push(e.clone()));

        {
            let mut guard = SuspendGuard::new(&mut sheet);
            guard
                .set_range_data(0, 0, 1, 2, &[vec![CellValue::Int(1), CellValue::Int(2)]])
                .unwrap();
        }
        assert!(events.borrow().is_empty());

        sheet.raise_range_data_changed(RangePosition::new(0, 0, 1, 2));
        assert_eq!(
            *events.borrow(),
            vec![SheetEvent::RangeDataChanged(RangePosition::new(0, 0, 1, 2))]
        );
    }
}
