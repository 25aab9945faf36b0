//! Common fixtures for integration tests.
#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use rowmap::{
    DataReader, DataRecord, Mapped, MemoryTable, RecordError, TableReader, Value,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Ordinal of the `Something` column in [`dto_table`].
pub const SOMETHING_ORDINAL: usize = 10;

/// Destination covering every supported leaf type.
#[derive(Debug, Default, Clone, PartialEq, Mapped)]
#[mapped(rename_all = "PascalCase")]
pub struct DtoObject {
    pub small_integer: i16,
    pub integer: i32,
    pub big_integer: i64,
    pub guid: Uuid,
    pub float: f32,
    pub double: f64,
    pub decimal: Decimal,
    pub date_time: NaiveDateTime,
    pub byte: u8,
    pub boolean: bool,
    pub r#else: NaiveDateTime,
    pub byte_array: Vec<u8>,
    pub date_time_offset: DateTime<FixedOffset>,
}

/// Shares its members with [`DtoObject`] and inherits that map's projections.
#[derive(Debug, Default, Clone, PartialEq, Mapped)]
#[mapped(rename_all = "PascalCase")]
pub struct DerivedDtoObject {
    pub integer: i32,
    pub big_integer: i64,
    pub r#else: NaiveDateTime,
    pub comment: Option<String>,
}

pub fn date_time_offset() -> DateTime<FixedOffset> {
    let offset = FixedOffset::west_opt(4 * 3600 + 30 * 60).expect("valid offset");
    NaiveDate::from_ymd_opt(2000, 7, 4)
        .and_then(|date| date.and_hms_opt(6, 31, 45))
        .expect("valid date")
        .and_local_timezone(offset)
        .single()
        .expect("unambiguous local time")
}

/// One row with a column for every [`DtoObject`] member except `Else`.
pub fn dto_table() -> MemoryTable {
    MemoryTable::new([
        "SmallInteger",
        "Integer",
        "BigInteger",
        "Guid",
        "Float",
        "Double",
        "Decimal",
        "DateTime",
        "Byte",
        "Boolean",
        "Something",
        "ByteArray",
        "DateTimeOffset",
    ])
    .with_row([
        Value::Int16(22),
        Value::Int32(6134),
        Value::Int64(61346154),
        Value::Uuid(Uuid::new_v4()),
        Value::Float32(642.61),
        Value::Float64(67164.64),
        Value::Decimal(Decimal::new(9434161, 2)),
        Value::DateTime(Utc::now().naive_utc()),
        Value::UInt8(0x12),
        Value::Boolean(true),
        Value::DateTime(NaiveDateTime::MAX),
        Value::Binary(vec![0x01, 0x02, 0x03, 0x04]),
        Value::DateTimeOffset(date_time_offset()),
    ])
    .expect("row matches columns")
}

/// Asserts every column of `table`'s first row landed in `dto`.
pub fn assert_dto_matches(dto: &DtoObject, table: &MemoryTable) {
    use rowmap::DataRecordExt;

    let record = table.record(0).expect("fixture row");
    assert_eq!(dto.small_integer, record.get::<i16>("SmallInteger").unwrap());
    assert_eq!(dto.integer, record.get::<i32>("Integer").unwrap());
    assert_eq!(dto.big_integer, record.get::<i64>("BigInteger").unwrap());
    assert_eq!(dto.guid, record.get::<Uuid>("Guid").unwrap());
    assert_eq!(dto.float, record.get::<f32>("Float").unwrap());
    assert_eq!(dto.double, record.get::<f64>("Double").unwrap());
    assert_eq!(dto.decimal, record.get::<Decimal>("Decimal").unwrap());
    assert_eq!(dto.date_time, record.get::<NaiveDateTime>("DateTime").unwrap());
    assert_eq!(dto.byte, record.get::<u8>("Byte").unwrap());
    assert_eq!(dto.boolean, record.get::<bool>("Boolean").unwrap());
    assert_eq!(dto.byte_array, record.get::<Vec<u8>>("ByteArray").unwrap());
    assert_eq!(
        dto.date_time_offset,
        record.get::<DateTime<FixedOffset>>("DateTimeOffset").unwrap()
    );
    assert_eq!(dto.r#else, NaiveDateTime::MAX);
}

/// Reader that counts how often it was advanced.
#[derive(Debug)]
pub struct CountingReader<'t> {
    inner: TableReader<'t>,
    pub reads: usize,
}

impl<'t> CountingReader<'t> {
    pub fn new(table: &'t MemoryTable) -> Self {
        Self {
            inner: table.reader(),
            reads: 0,
        }
    }
}

impl DataRecord for CountingReader<'_> {
    fn field_count(&self) -> usize {
        self.inner.field_count()
    }

    fn field_name(&self, ordinal: usize) -> Result<&str, RecordError> {
        self.inner.field_name(ordinal)
    }

    fn value(&self, ordinal: usize) -> Result<&Value, RecordError> {
        self.inner.value(ordinal)
    }
}

impl DataReader for CountingReader<'_> {
    fn read(&mut self) -> Result<bool, RecordError> {
        self.reads += 1;
        self.inner.read()
    }
}
