//! Field extraction for any `Serialize` record
//!
//! Structs, tuples, sequences and maps become one column per field (map keys
//! are skipped). Field values must be scalars: `Option` maps to the inner
//! value or an empty cell, unit enum variants to their name, newtypes to
//! their content. Nested structs, sequences and maps inside a field are
//! rejected.

use super::{FieldExtractor, FieldWriter};
use crate::error::{ImportError, Result};
use crate::types::CellValue;
use serde::ser::{self, Impossible, Serialize, Serializer};
use std::fmt::Display;

/// Extractor for records implementing `serde::Serialize`
///
/// ```
/// use gridload::extract::{FieldExtractor, SerdeExtractor};
/// use gridload::CellValue;
///
/// #[derive(serde::Serialize)]
/// struct Sale { region: &'static str, units: u32 }
///
/// let mut out = Vec::new();
/// SerdeExtractor
///     .extract(&Sale { region: "north", units: 3 }, 10, &mut out)
///     .unwrap();
/// assert_eq!(out, vec![CellValue::from("north"), CellValue::Int(3)]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeExtractor;

impl<R: Serialize> FieldExtractor<R> for SerdeExtractor {
    fn extract(&self, record: &R, max_fields: usize, out: &mut Vec<CellValue>) -> Result<()> {
        let mut fields = FieldWriter::new(out, max_fields);
        record.serialize(RecordSerializer {
            fields: &mut fields,
        })
    }
}

impl ser::Error for ImportError {
    fn custom<T: Display>(msg: T) -> Self {
        ImportError::extraction(msg.to_string())
    }
}

fn name_field(err: ImportError, name: impl Into<String>) -> ImportError {
    match err {
        ImportError::Extraction {
            field: None,
            message,
        } => ImportError::Extraction {
            field: Some(name.into()),
            message,
        },
        other => other,
    }
}

fn nested(kind: &str) -> ImportError {
    ImportError::extraction(format!("nested {} cannot be stored in a single cell", kind))
}

/// Top level: the record itself
struct RecordSerializer<'w, 'a> {
    fields: &'w mut FieldWriter<'a>,
}

impl<'w, 'a> RecordSerializer<'w, 'a> {
    fn single(self, value: CellValue) -> Result<()> {
        self.fields.push(value);
        Ok(())
    }

    fn collect(self) -> FieldCollector<'w, 'a> {
        FieldCollector {
            fields: self.fields,
            index: 0,
        }
    }
}

macro_rules! single_field {
    ($($method:ident($t:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $t) -> Result<()> {
                self.single(CellSerializer.$method(v)?)
            }
        )*
    };
}

impl<'w, 'a> ser::Serializer for RecordSerializer<'w, 'a> {
    type Ok = ();
    type Error = ImportError;
    type SerializeSeq = FieldCollector<'w, 'a>;
    type SerializeTuple = FieldCollector<'w, 'a>;
    type SerializeTupleStruct = FieldCollector<'w, 'a>;
    type SerializeTupleVariant = FieldCollector<'w, 'a>;
    type SerializeMap = FieldCollector<'w, 'a>;
    type SerializeStruct = FieldCollector<'w, 'a>;
    type SerializeStructVariant = FieldCollector<'w, 'a>;

    single_field!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    );

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.single(CellValue::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<FieldCollector<'w, 'a>> {
        Ok(self.collect())
    }

    fn serialize_tuple(self, _len: usize) -> Result<FieldCollector<'w, 'a>> {
        Ok(self.collect())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<FieldCollector<'w, 'a>> {
        Ok(self.collect())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<FieldCollector<'w, 'a>> {
        Ok(self.collect())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<FieldCollector<'w, 'a>> {
        Ok(self.collect())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<FieldCollector<'w, 'a>> {
        Ok(self.collect())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<FieldCollector<'w, 'a>> {
        Ok(self.collect())
    }
}

/// Pushes one cell per field of a compound record
struct FieldCollector<'w, 'a> {
    fields: &'w mut FieldWriter<'a>,
    index: usize,
}

impl FieldCollector<'_, '_> {
    fn field<T: ?Sized + Serialize>(&mut self, name: Option<&str>, value: &T) -> Result<()> {
        let index = self.index;
        self.index += 1;
        if self.fields.is_full() {
            return Ok(());
        }
        let cell = value.serialize(CellSerializer).map_err(|err| match name {
            Some(name) => name_field(err, name),
            None => name_field(err, format!("#{}", index)),
        })?;
        self.fields.push(cell);
        Ok(())
    }
}

impl ser::SerializeSeq for FieldCollector<'_, '_> {
    type Ok = ();
    type Error = ImportError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.field(None, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTuple for FieldCollector<'_, '_> {
    type Ok = ();
    type Error = ImportError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.field(None, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FieldCollector<'_, '_> {
    type Ok = ();
    type Error = ImportError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.field(None, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FieldCollector<'_, '_> {
    type Ok = ();
    type Error = ImportError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.field(None, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeMap for FieldCollector<'_, '_> {
    type Ok = ();
    type Error = ImportError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, _key: &T) -> Result<()> {
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.field(None, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeStruct for FieldCollector<'_, '_> {
    type Ok = ();
    type Error = ImportError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(Some(key), value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FieldCollector<'_, '_> {
    type Ok = ();
    type Error = ImportError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(Some(key), value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Field level: one scalar becomes one cell
struct CellSerializer;

impl ser::Serializer for CellSerializer {
    type Ok = CellValue;
    type Error = ImportError;
    type SerializeSeq = Impossible<CellValue, ImportError>;
    type SerializeTuple = Impossible<CellValue, ImportError>;
    type SerializeTupleStruct = Impossible<CellValue, ImportError>;
    type SerializeTupleVariant = Impossible<CellValue, ImportError>;
    type SerializeMap = Impossible<CellValue, ImportError>;
    type SerializeStruct = Impossible<CellValue, ImportError>;
    type SerializeStructVariant = Impossible<CellValue, ImportError>;

    fn serialize_bool(self, v: bool) -> Result<CellValue> {
        Ok(CellValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<CellValue> {
        Ok(CellValue::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<CellValue> {
        Ok(match i64::try_from(v) {
            Ok(i) => CellValue::Int(i),
            Err(_) => CellValue::Float(v as f64),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<CellValue> {
        Ok(CellValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<CellValue> {
        Ok(CellValue::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<CellValue> {
        std::str::from_utf8(v)
            .map(CellValue::from)
            .map_err(|e| ImportError::extraction(format!("bytes are not UTF-8: {}", e)))
    }

    fn serialize_none(self) -> Result<CellValue> {
        Ok(CellValue::Empty)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<CellValue> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<CellValue> {
        Ok(CellValue::Empty)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<CellValue> {
        Ok(CellValue::Empty)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<CellValue> {
        Ok(CellValue::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<CellValue> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<CellValue> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(nested("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(nested("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(nested("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(nested("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(nested("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct> {
        Err(nested("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(nested("struct variant"))
    }
}
