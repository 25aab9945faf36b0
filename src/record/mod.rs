#[cfg(feature = "arrow")]
pub mod arrow;
pub mod field;
pub mod memory;
mod value;

use std::error::Error;

pub use field::{has_non_null_descendant, try_get_field, PATH_SEPARATOR};
pub use memory::{MemoryRecord, MemoryTable, TableReader};
use thiserror::Error;
pub use value::*;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("ordinal {ordinal} is out of range for a record of {count} fields")]
    IndexOutOfRange { ordinal: usize, count: usize },
    #[error("record has no field named {0:?}")]
    UnknownField(String),
    #[error("record source is not positioned on a row")]
    NoCurrentRow,
    #[error("row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("column {column:?} has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },
    #[error("record sources can only be used for forward-only operations")]
    ForwardOnly,
    #[error("value error: {0}")]
    Value(#[from] ValueError),
    #[error("record source error: {0}")]
    Source(#[source] Box<dyn Error + Send + Sync>),
}

/// One row of named, dynamically typed fields.
///
/// Field names are fixed for the lifetime of the source. A field that is present but carries
/// no value is [`Value::Null`]; a field that does not exist is reported as
/// [`RecordError::UnknownField`] or [`RecordError::IndexOutOfRange`].
pub trait DataRecord {
    fn field_count(&self) -> usize;

    fn field_name(&self, ordinal: usize) -> Result<&str, RecordError>;

    fn value(&self, ordinal: usize) -> Result<&Value, RecordError>;

    fn ordinal(&self, name: &str) -> Result<usize, RecordError> {
        (0..self.field_count())
            .find(|ordinal| matches!(self.field_name(*ordinal), Ok(field) if field == name))
            .ok_or_else(|| RecordError::UnknownField(name.to_owned()))
    }

    fn value_by_name(&self, name: &str) -> Result<&Value, RecordError> {
        self.value(self.ordinal(name)?)
    }

    fn is_null(&self, ordinal: usize) -> Result<bool, RecordError> {
        self.value(ordinal).map(Value::is_null)
    }
}

/// Typed getters on top of [`DataRecord`].
pub trait DataRecordExt: DataRecord {
    /// Reads the field at `ordinal` as `T`.
    ///
    /// Use `Option<T>` when the field may be [`Value::Null`].
    fn get_at<T: FromValue>(&self, ordinal: usize) -> Result<T, RecordError> {
        Ok(T::from_value(self.value(ordinal)?)?)
    }

    fn get<T: FromValue>(&self, name: &str) -> Result<T, RecordError> {
        Ok(T::from_value(self.value_by_name(name)?)?)
    }
}

impl<R: DataRecord + ?Sized> DataRecordExt for R {}

/// A forward-only cursor over rows.
///
/// The reader is itself the current record: every successful [`DataReader::read`] overwrites
/// the fields in place, so a borrowed row never outlives the next advance.
pub trait DataReader: DataRecord {
    /// Moves to the next row. Returns `false` once the source is exhausted.
    fn read(&mut self) -> Result<bool, RecordError>;
}

impl<R: DataRecord + ?Sized> DataRecord for &R {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn field_name(&self, ordinal: usize) -> Result<&str, RecordError> {
        (**self).field_name(ordinal)
    }

    fn value(&self, ordinal: usize) -> Result<&Value, RecordError> {
        (**self).value(ordinal)
    }

    fn ordinal(&self, name: &str) -> Result<usize, RecordError> {
        (**self).ordinal(name)
    }
}

impl<R: DataRecord + ?Sized> DataRecord for &mut R {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn field_name(&self, ordinal: usize) -> Result<&str, RecordError> {
        (**self).field_name(ordinal)
    }

    fn value(&self, ordinal: usize) -> Result<&Value, RecordError> {
        (**self).value(ordinal)
    }

    fn ordinal(&self, name: &str) -> Result<usize, RecordError> {
        (**self).ordinal(name)
    }
}

impl<R: DataReader + ?Sized> DataReader for &mut R {
    fn read(&mut self) -> Result<bool, RecordError> {
        (**self).read()
    }
}
