use super::{DataReader, DataRecord, RecordError, Value};

/// Named columns and rows of values held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must have exactly one value per column.
    pub fn push_row<I>(&mut self, row: I) -> Result<(), RecordError>
    where
        I: IntoIterator<Item = Value>,
    {
        let row: Vec<Value> = row.into_iter().collect();
        if row.len() != self.columns.len() {
            return Err(RecordError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn with_row<I>(mut self, row: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A record positioned on `row`.
    pub fn record(&self, row: usize) -> Result<MemoryRecord<'_>, RecordError> {
        let values = self.rows.get(row).ok_or(RecordError::IndexOutOfRange {
            ordinal: row,
            count: self.rows.len(),
        })?;
        Ok(MemoryRecord {
            columns: &self.columns,
            values,
        })
    }

    /// A forward-only reader positioned before the first row.
    pub fn reader(&self) -> TableReader<'_> {
        TableReader {
            table: self,
            next: 0,
            current: None,
        }
    }
}

fn field_name<'a>(columns: &'a [String], ordinal: usize) -> Result<&'a str, RecordError> {
    columns
        .get(ordinal)
        .map(String::as_str)
        .ok_or(RecordError::IndexOutOfRange {
            ordinal,
            count: columns.len(),
        })
}

fn ordinal(columns: &[String], name: &str) -> Result<usize, RecordError> {
    columns
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| RecordError::UnknownField(name.to_owned()))
}

/// A single row of a [`MemoryTable`].
#[derive(Debug, Clone, Copy)]
pub struct MemoryRecord<'t> {
    columns: &'t [String],
    values: &'t [Value],
}

impl DataRecord for MemoryRecord<'_> {
    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn field_name(&self, ordinal: usize) -> Result<&str, RecordError> {
        field_name(self.columns, ordinal)
    }

    fn value(&self, ordinal: usize) -> Result<&Value, RecordError> {
        self.values.get(ordinal).ok_or(RecordError::IndexOutOfRange {
            ordinal,
            count: self.values.len(),
        })
    }

    fn ordinal(&self, name: &str) -> Result<usize, RecordError> {
        ordinal(self.columns, name)
    }
}

/// Forward-only cursor over a [`MemoryTable`].
#[derive(Debug)]
pub struct TableReader<'t> {
    table: &'t MemoryTable,
    next: usize,
    current: Option<usize>,
}

impl TableReader<'_> {
    /// Index of the row the reader is positioned on.
    pub fn position(&self) -> Option<usize> {
        self.current
    }
}

impl DataRecord for TableReader<'_> {
    fn field_count(&self) -> usize {
        self.table.columns.len()
    }

    fn field_name(&self, ordinal: usize) -> Result<&str, RecordError> {
        field_name(&self.table.columns, ordinal)
    }

    fn value(&self, ordinal: usize) -> Result<&Value, RecordError> {
        let row = self.current.ok_or(RecordError::NoCurrentRow)?;
        let values = &self.table.rows[row];
        values.get(ordinal).ok_or(RecordError::IndexOutOfRange {
            ordinal,
            count: values.len(),
        })
    }

    fn ordinal(&self, name: &str) -> Result<usize, RecordError> {
        ordinal(&self.table.columns, name)
    }
}

impl DataReader for TableReader<'_> {
    fn read(&mut self) -> Result<bool, RecordError> {
        if self.next < self.table.rows.len() {
            self.current = Some(self.next);
            self.next += 1;
            Ok(true)
        } else {
            self.current = None;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTable;
    use crate::record::{DataReader, DataRecord, DataRecordExt, RecordError, Value};

    #[test]
    fn rows_must_match_column_count() {
        let mut table = MemoryTable::new(["a", "b"]);
        table.push_row([Value::Int32(1), Value::Null]).unwrap();

        let err = table.push_row([Value::Int32(2)]).unwrap_err();
        assert!(matches!(
            err,
            RecordError::RowWidth {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn reader_walks_rows_in_order() {
        let table = MemoryTable::new(["n"])
            .with_row([Value::Int64(1)])
            .unwrap()
            .with_row([Value::Int64(2)])
            .unwrap();
        let mut reader = table.reader();

        assert!(matches!(reader.value(0), Err(RecordError::NoCurrentRow)));
        assert!(reader.read().unwrap());
        assert_eq!(reader.get::<i64>("n").unwrap(), 1);
        assert!(reader.read().unwrap());
        assert_eq!(reader.get_at::<i64>(0).unwrap(), 2);
        assert!(!reader.read().unwrap());
        assert!(!reader.read().unwrap());
        assert_eq!(reader.position(), None);
    }

    #[test]
    fn unknown_names_and_ordinals() {
        let table = MemoryTable::new(["n"]).with_row([Value::Null]).unwrap();
        let record = table.record(0).unwrap();

        assert!(matches!(
            record.ordinal("missing"),
            Err(RecordError::UnknownField(_))
        ));
        assert!(matches!(
            record.field_name(3),
            Err(RecordError::IndexOutOfRange { ordinal: 3, count: 1 })
        ));
        assert!(record.is_null(0).unwrap());
        assert_eq!(record.get::<Option<i32>>("n").unwrap(), None);
    }
}
