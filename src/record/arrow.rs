//! Forward-only record source over Arrow [`RecordBatch`]es.

use std::collections::VecDeque;

use arrow::{
    array::{Array, ArrayRef, AsArray, RecordBatch},
    datatypes::{
        DataType, Date32Type, Date64Type, Decimal128Type, Float32Type, Float64Type, Int16Type,
        Int32Type, Int64Type, Int8Type, SchemaRef, Time64MicrosecondType, Time64NanosecondType,
        TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
        TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
    error::ArrowError,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{DataReader, DataRecord, RecordError, Value, ValueError};

/// Days between 0001-01-01 and the unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Reads rows out of a sequence of batches sharing one schema.
///
/// The current row is decoded into a reused buffer on every [`DataReader::read`].
pub struct BatchReader {
    schema: SchemaRef,
    batches: VecDeque<RecordBatch>,
    batch: Option<RecordBatch>,
    row: usize,
    current: Vec<Value>,
    positioned: bool,
}

impl BatchReader {
    pub fn try_new<I>(schema: SchemaRef, batches: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = RecordBatch>,
    {
        for field in schema.fields() {
            if !is_supported(field.data_type()) {
                return Err(RecordError::UnsupportedType {
                    column: field.name().clone(),
                    data_type: field.data_type().to_string(),
                });
            }
        }
        let batches: VecDeque<RecordBatch> = batches.into_iter().collect();
        for batch in &batches {
            let matches = batch.num_columns() == schema.fields().len()
                && batch
                    .schema()
                    .fields()
                    .iter()
                    .zip(schema.fields())
                    .all(|(actual, expected)| actual.data_type() == expected.data_type());
            if !matches {
                return Err(RecordError::Source(Box::new(ArrowError::SchemaError(
                    "record batch does not match the reader schema".to_owned(),
                ))));
            }
        }

        Ok(Self {
            current: Vec::with_capacity(schema.fields().len()),
            schema,
            batches,
            batch: None,
            row: 0,
            positioned: false,
        })
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Decodes the row under the cursor. The reader is positioned only once the whole row
    /// decoded.
    fn decode_current(&mut self) -> Result<(), RecordError> {
        self.positioned = false;
        let Some(batch) = &self.batch else {
            return Err(RecordError::NoCurrentRow);
        };
        self.current.clear();
        for column in batch.columns() {
            self.current.push(decode(column, self.row)?);
        }
        self.positioned = true;
        Ok(())
    }
}

impl DataRecord for BatchReader {
    fn field_count(&self) -> usize {
        self.schema.fields().len()
    }

    fn field_name(&self, ordinal: usize) -> Result<&str, RecordError> {
        self.schema
            .fields()
            .get(ordinal)
            .map(|field| field.name().as_str())
            .ok_or(RecordError::IndexOutOfRange {
                ordinal,
                count: self.schema.fields().len(),
            })
    }

    fn value(&self, ordinal: usize) -> Result<&Value, RecordError> {
        if !self.positioned {
            return Err(RecordError::NoCurrentRow);
        }
        self.current.get(ordinal).ok_or(RecordError::IndexOutOfRange {
            ordinal,
            count: self.current.len(),
        })
    }

    fn ordinal(&self, name: &str) -> Result<usize, RecordError> {
        self.schema
            .index_of(name)
            .map_err(|_| RecordError::UnknownField(name.to_owned()))
    }
}

impl DataReader for BatchReader {
    fn read(&mut self) -> Result<bool, RecordError> {
        if self.positioned {
            self.row += 1;
        }
        loop {
            let has_row = self
                .batch
                .as_ref()
                .is_some_and(|batch| self.row < batch.num_rows());
            if has_row {
                self.decode_current()?;
                return Ok(true);
            }
            match self.batches.pop_front() {
                Some(next) => {
                    self.batch = Some(next);
                    self.row = 0;
                }
                None => {
                    self.batch = None;
                    self.positioned = false;
                    self.current.clear();
                    return Ok(false);
                }
            }
        }
    }
}

fn is_supported(data_type: &DataType) -> bool {
    match data_type {
        DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64
        | DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Binary
        | DataType::LargeBinary
        | DataType::FixedSizeBinary(16)
        | DataType::Date32
        | DataType::Date64
        | DataType::Time64(TimeUnit::Microsecond | TimeUnit::Nanosecond)
        | DataType::Timestamp(_, _) => true,
        DataType::Decimal128(_, scale) => *scale >= 0,
        _ => false,
    }
}

fn out_of_range(what: &str, raw: impl ToString) -> RecordError {
    RecordError::Value(ValueError::InvalidConversion(format!(
        "{} is out of range for {what}",
        raw.to_string()
    )))
}

fn timestamp(raw: i64, unit: &TimeUnit) -> Result<DateTime<Utc>, RecordError> {
    let per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let secs = raw.div_euclid(per_second);
    let nanos = raw.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(secs, nanos as u32).ok_or_else(|| out_of_range("timestamp", raw))
}

fn decode(column: &ArrayRef, row: usize) -> Result<Value, RecordError> {
    if column.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match column.data_type() {
        DataType::Boolean => Value::Boolean(column.as_boolean().value(row)),
        DataType::Int8 => Value::Int8(column.as_primitive::<Int8Type>().value(row)),
        DataType::Int16 => Value::Int16(column.as_primitive::<Int16Type>().value(row)),
        DataType::Int32 => Value::Int32(column.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => Value::Int64(column.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::UInt8(column.as_primitive::<UInt8Type>().value(row)),
        DataType::UInt16 => Value::UInt16(column.as_primitive::<UInt16Type>().value(row)),
        DataType::UInt32 => Value::UInt32(column.as_primitive::<UInt32Type>().value(row)),
        DataType::UInt64 => Value::UInt64(column.as_primitive::<UInt64Type>().value(row)),
        DataType::Float32 => Value::Float32(column.as_primitive::<Float32Type>().value(row)),
        DataType::Float64 => Value::Float64(column.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Value::String(column.as_string::<i32>().value(row).to_owned()),
        DataType::LargeUtf8 => Value::String(column.as_string::<i64>().value(row).to_owned()),
        DataType::Binary => Value::Binary(column.as_binary::<i32>().value(row).to_vec()),
        DataType::LargeBinary => Value::Binary(column.as_binary::<i64>().value(row).to_vec()),
        DataType::FixedSizeBinary(16) => {
            let bytes = column.as_fixed_size_binary().value(row);
            Value::Uuid(
                Uuid::from_slice(bytes)
                    .map_err(|e| ValueError::InvalidConversion(format!("uuid: {e}")))?,
            )
        }
        DataType::Date32 => {
            let days = column.as_primitive::<Date32Type>().value(row);
            days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .map(Value::Date)
                .ok_or_else(|| out_of_range("date32", days))?
        }
        DataType::Date64 => {
            let millis = column.as_primitive::<Date64Type>().value(row);
            let datetime = timestamp(millis, &TimeUnit::Millisecond)?;
            Value::Date(datetime.date_naive())
        }
        DataType::Time64(unit) => {
            let (raw, nanos_per_unit) = match unit {
                TimeUnit::Nanosecond => (
                    column.as_primitive::<Time64NanosecondType>().value(row),
                    1,
                ),
                _ => (
                    column.as_primitive::<Time64MicrosecondType>().value(row),
                    1_000,
                ),
            };
            let nanos = raw
                .checked_mul(nanos_per_unit)
                .ok_or_else(|| out_of_range("time64", raw))?;
            let secs = u32::try_from(nanos.div_euclid(1_000_000_000))
                .map_err(|_| out_of_range("time64", raw))?;
            NaiveTime::from_num_seconds_from_midnight_opt(
                secs,
                nanos.rem_euclid(1_000_000_000) as u32,
            )
            .map(Value::Time)
            .ok_or_else(|| out_of_range("time64", raw))?
        }
        DataType::Timestamp(unit, tz) => {
            let raw = match unit {
                TimeUnit::Second => column.as_primitive::<TimestampSecondType>().value(row),
                TimeUnit::Millisecond => {
                    column.as_primitive::<TimestampMillisecondType>().value(row)
                }
                TimeUnit::Microsecond => {
                    column.as_primitive::<TimestampMicrosecondType>().value(row)
                }
                TimeUnit::Nanosecond => {
                    column.as_primitive::<TimestampNanosecondType>().value(row)
                }
            };
            let utc = timestamp(raw, unit)?;
            match tz {
                Some(_) => Value::DateTimeOffset(utc.fixed_offset()),
                None => Value::DateTime(utc.naive_utc()),
            }
        }
        DataType::Decimal128(_, scale) => {
            let raw = column.as_primitive::<Decimal128Type>().value(row);
            let scale = u32::try_from(*scale).map_err(|_| out_of_range("decimal128", raw))?;
            Value::Decimal(
                Decimal::try_from_i128_with_scale(raw, scale)
                    .map_err(|_| out_of_range("decimal", raw))?,
            )
        }
        other => {
            return Err(RecordError::UnsupportedType {
                column: String::new(),
                data_type: other.to_string(),
            })
        }
    };
    Ok(value)
}
