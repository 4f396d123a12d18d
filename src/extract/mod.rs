//! Turning records into ordered cell values
//!
//! A record type describes its columns once, at compile time, by
//! implementing [`Record`] (by hand or through [`impl_record!`]). The loader
//! only sees the [`FieldExtractor`] seam, so closures and the optional
//! serde-based extractor plug in the same way.

#[cfg(feature = "serde")]
pub mod serde_fields;

use crate::error::Result;
use crate::types::CellValue;

#[cfg(feature = "serde")]
pub use serde_fields::SerdeExtractor;

/// Produces the ordered field values of one record
pub trait FieldExtractor<R> {
    /// Append at most `max_fields` values for `record` to `out`
    fn extract(&self, record: &R, max_fields: usize, out: &mut Vec<CellValue>) -> Result<()>;
}

/// Width-limited sink for a record's fields
///
/// Values pushed after the limit is reached are dropped.
pub struct FieldWriter<'a> {
    out: &'a mut Vec<CellValue>,
    limit: usize,
}

impl<'a> FieldWriter<'a> {
    pub fn new(out: &'a mut Vec<CellValue>, max_fields: usize) -> Self {
        let limit = out.len().saturating_add(max_fields);
        FieldWriter { out, limit }
    }

    /// Push one field, returns false once the width limit is reached
    pub fn push(&mut self, value: impl Into<CellValue>) -> bool {
        if self.is_full() {
            return false;
        }
        self.out.push(value.into());
        true
    }

    pub fn is_full(&self) -> bool {
        self.out.len() >= self.limit
    }

    /// Fields still accepted
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.out.len())
    }
}

/// A record whose fields map onto consecutive columns
pub trait Record {
    fn write_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()>;
}

impl<R: Record + ?Sized> Record for &R {
    fn write_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        (**self).write_fields(fields)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn write_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        (**self).write_fields(fields)
    }
}

impl<T> Record for [T]
where
    T: Clone + Into<CellValue>,
{
    fn write_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        for value in self.iter().take(fields.remaining()) {
            fields.push(value.clone());
        }
        Ok(())
    }
}

impl<T> Record for Vec<T>
where
    T: Clone + Into<CellValue>,
{
    fn write_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        self.as_slice().write_fields(fields)
    }
}

impl<T, const N: usize> Record for [T; N]
where
    T: Clone + Into<CellValue>,
{
    fn write_fields(&self, fields: &mut FieldWriter<'_>) -> Result<()> {
        self.as_slice().write_fields(fields)
    }
}

/// Extractor for types implementing [`Record`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordExtractor;

impl<R: Record> FieldExtractor<R> for RecordExtractor {
    fn extract(&self, record: &R, max_fields: usize, out: &mut Vec<CellValue>) -> Result<()> {
        record.write_fields(&mut FieldWriter::new(out, max_fields))
    }
}

impl<R, F> FieldExtractor<R> for F
where
    F: Fn(&R, &mut FieldWriter<'_>) -> Result<()>,
{
    fn extract(&self, record: &R, max_fields: usize, out: &mut Vec<CellValue>) -> Result<()> {
        self(record, &mut FieldWriter::new(out, max_fields))
    }
}

/// Implement [`Record`] for a struct from an ordered field list
///
/// Each listed field must be `Clone + Into<CellValue>`; columns follow the
/// order given here.
///
/// ```
/// use gridload::impl_record;
///
/// struct Person {
///     name: String,
///     age: u32,
///     email: Option<String>,
/// }
///
/// impl_record!(Person { name, age, email });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::extract::Record for $ty {
            fn write_fields(
                &self,
                fields: &mut $crate::extract::FieldWriter<'_>,
            ) -> $crate::Result<()> {
                $(
                    if !fields.push(::std::clone::Clone::clone(&self.$field)) {
                        return Ok(());
                    }
                )*
                Ok(())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;

    #[derive(Clone)]
    struct Order {
        id: u32,
        item: String,
        qty: i64,
        note: Option<String>,
    }

    impl_record!(Order { id, item, qty, note });

    fn order() -> Order {
        Order {
            id: 7,
            item: "bolt".to_string(),
            qty: 12,
            note: None,
        }
    }

    fn extract<R, E: FieldExtractor<R>>(extractor: &E, record: &R, max: usize) -> Vec<CellValue> {
        let mut out = Vec::new();
        extractor.extract(record, max, &mut out).unwrap();
        out
    }

    #[test]
    fn test_macro_record_in_declaration_order() {
        assert_eq!(
            extract(&RecordExtractor, &order(), usize::MAX),
            vec![
                CellValue::Int(7),
                CellValue::from("bolt"),
                CellValue::Int(12),
                CellValue::Empty,
            ]
        );
    }

    #[test]
    fn test_width_limit_truncates() {
        assert_eq!(
            extract(&RecordExtractor, &order(), 2),
            vec![CellValue::Int(7), CellValue::from("bolt")]
        );
        assert!(extract(&RecordExtractor, &order(), 0).is_empty());
        assert_eq!(extract(&RecordExtractor, &vec![1, 2, 3], 2).len(), 2);
    }

    #[test]
    fn test_references_and_arrays() {
        let o = order();
        let by_ref: &Order = &o;
        assert_eq!(extract(&RecordExtractor, &by_ref, 10).len(), 4);
        assert_eq!(
            extract(&RecordExtractor, &["a", "b"], 10),
            vec![CellValue::from("a"), CellValue::from("b")]
        );
    }

    #[test]
    fn test_closure_extractor() {
        let extractor = |o: &Order, f: &mut FieldWriter<'_>| -> Result<()> {
            f.push(o.item.to_uppercase());
            f.push(o.qty * 2);
            Ok(())
        };
        assert_eq!(
            extract(&extractor, &order(), 5),
            vec![CellValue::from("BOLT"), CellValue::Int(24)]
        );
    }

    #[test]
    fn test_closure_errors_propagate() {
        let extractor = |o: &Order, _: &mut FieldWriter<'_>| -> Result<()> {
            Err(ImportError::field("qty", format!("{} is odd", o.qty + 1)))
        };
        let mut out = Vec::new();
        let err = extractor.extract(&order(), 5, &mut out).unwrap_err();
        assert!(matches!(err, ImportError::Extraction { field: Some(ref f), .. } if f == "qty"));
    }

    #[test]
    fn test_field_writer_counts_from_existing_len() {
        let mut out = vec![CellValue::Int(0)];
        let mut writer = FieldWriter::new(&mut out, 1);
        assert_eq!(writer.remaining(), 1);
        assert!(writer.push(1));
        assert!(!writer.push(2));
        assert!(writer.is_full());
        assert_eq!(out.len(), 2);
    }
}
