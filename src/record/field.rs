use super::{DataRecord, RecordError, Value};
use crate::observability::log_trace;

/// Separator between the segments of a nested field name, as in `Address.City`.
pub const PATH_SEPARATOR: char = '.';

/// Looks up a field by name.
///
/// Returns `None` when the record has no such field. Every lookup failure of the record
/// implementation counts as absence, including out-of-range ordinals. A field that is present
/// but null is returned as `Some(&Value::Null)`.
pub fn try_get_field<'r, R>(record: &'r R, name: &str) -> Option<&'r Value>
where
    R: DataRecord + ?Sized,
{
    match record.value_by_name(name) {
        Ok(value) => Some(value),
        Err(RecordError::UnknownField(_)) | Err(RecordError::IndexOutOfRange { .. }) => None,
        Err(err) => {
            log_trace!(
                event = "field_lookup_failed",
                field = name,
                error = %err,
            );
            None
        }
    }
}

/// Whether any field nested under `prefix` carries a non-null value.
///
/// A field is nested under `prefix` when its leading segments equal the segments of `prefix`,
/// compared segment by segment: `Address.City` and `Address` itself are under `Address`, while
/// `AddressBook.City` is not. An empty prefix covers every field.
///
/// Only the leading segments are matched, on purpose: `Other.Address.City` belongs to the
/// `Other` member and is not under `Address`, even though one of its segments is.
pub fn has_non_null_descendant<R>(record: &R, prefix: &str) -> bool
where
    R: DataRecord + ?Sized,
{
    (0..record.field_count()).any(|ordinal| {
        let Ok(name) = record.field_name(ordinal) else {
            return false;
        };
        if !is_descendant(name, prefix) {
            return false;
        }
        matches!(record.value(ordinal), Ok(value) if !value.is_null())
    })
}

fn is_descendant(name: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let mut segments = name.split(PATH_SEPARATOR);
    prefix
        .split(PATH_SEPARATOR)
        .all(|expected| segments.next() == Some(expected))
}
