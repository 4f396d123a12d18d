//! # gridload
//!
//! Bulk import of typed records into spreadsheet grids.
//!
//! ## Features
//!
//! - **Batched writes**: records are read in fixed-size batches and written as
//!   one rectangular block per batch
//! - **Auto-spread**: rows and columns grow ahead of each write, rows in
//!   steps of the batch size
//! - **Quiet loads**: change events are suspended during the load and one
//!   aggregate event is raised at the end
//! - **Compile-time field mapping**: implement [`Record`] (or use
//!   [`impl_record!`]), pass a closure, or enable the `serde` feature
//! - **Pluggable grids**: the loader talks to the [`Surface`] and
//!   [`SurfaceContainer`] traits; an in-memory [`Workbook`] is included
//!
//! ## Quick Start
//!
//! ```rust
//! use gridload::{impl_record, CellValue, Workbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! struct Employee {
//!     name: String,
//!     age: u32,
//!     city: Option<String>,
//! }
//!
//! impl_record!(Employee { name, age, city });
//!
//! let people = vec![
//!     Employee { name: "Alice".into(), age: 30, city: Some("NYC".into()) },
//!     Employee { name: "Bob".into(), age: 25, city: None },
//! ];
//!
//! let mut book = Workbook::new();
//! let summary = book.load_records(people, "Staff")?;
//! assert_eq!(summary.records, 2);
//!
//! let sheet = book.worksheet(0).unwrap();
//! assert_eq!(sheet.cell(1, 0), Some(&CellValue::from("Bob")));
//! # Ok(())
//! # }
//! ```
//!
//! ### Custom placement
//!
//! ```rust
//! use gridload::{GenericLoader, LoadOptions, RecordExtractor, TargetRange, Workbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = LoadOptions::builder()
//!     .with_target_range(TargetRange::starting_at(2, 1).with_cols(3))
//!     .with_buffer_items(1024)
//!     .build();
//!
//! let rows = vec![vec![1, 2, 3, 4], vec![5, 6]];
//! let mut book = Workbook::new();
//! let summary = GenericLoader::with_options(RecordExtractor, options).load(&mut book, rows)?;
//!
//! assert_eq!(summary.range.to_string(), "B3:D4");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod grid;
pub mod loader;
pub mod types;

pub use error::{ImportError, Result};
pub use extract::{FieldExtractor, FieldWriter, Record, RecordExtractor};
pub use grid::{SheetEvent, Surface, SurfaceContainer, SuspendGuard, Workbook, Worksheet};
pub use loader::{GenericLoader, LoadOptions, LoadSummary, ShortRowPolicy};
pub use types::{CellValue, RangePosition, Row, TargetRange};

#[cfg(feature = "serde")]
pub use extract::SerdeExtractor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_imports() {
        // Test that all public types are accessible
        let _ = std::marker::PhantomData::<ImportError>;
        let _ = std::marker::PhantomData::<Workbook>;
        let _ = std::marker::PhantomData::<GenericLoader<RecordExtractor>>;
    }
}
