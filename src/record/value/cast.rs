use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Value, ValueError};

/// Conversion from a loosely typed [`Value`] into a statically typed destination.
///
/// Implementations receive non-null values from accessor plans; a [`Value::Null`] passed
/// directly is rejected unless the target is an `Option`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T, ValueError> {
    if value.is_null() {
        return Err(ValueError::NullNotAllowed(expected));
    }
    Err(ValueError::TypeMismatch {
        expected,
        actual: value.type_name(),
    })
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ValueError> {
                    match value.as_integer() {
                        Some(wide) => <$ty>::try_from(wide).map_err(|_| ValueError::Overflow {
                            expected: stringify!($ty),
                            value: wide.to_string(),
                        }),
                        None => mismatch(stringify!($ty), value),
                    }
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Boolean(v) => Ok(*v),
            other => mismatch("bool", other),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float32(v) => Ok(*v),
            // narrowed to the declared precision
            Value::Float64(v) => Ok(*v as f32),
            Value::Int8(v) => Ok(f32::from(*v)),
            Value::Int16(v) => Ok(f32::from(*v)),
            Value::UInt8(v) => Ok(f32::from(*v)),
            Value::UInt16(v) => Ok(f32::from(*v)),
            other => mismatch("f32", other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float64(v) => Ok(*v),
            Value::Float32(v) => Ok(f64::from(*v)),
            Value::Int8(v) => Ok(f64::from(*v)),
            Value::Int16(v) => Ok(f64::from(*v)),
            Value::Int32(v) => Ok(f64::from(*v)),
            Value::UInt8(v) => Ok(f64::from(*v)),
            Value::UInt16(v) => Ok(f64::from(*v)),
            Value::UInt32(v) => Ok(f64::from(*v)),
            other => mismatch("f64", other),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Decimal(v) => Ok(*v),
            Value::Float64(v) => Decimal::try_from(*v)
                .map_err(|e| ValueError::InvalidConversion(format!("{v} as decimal: {e}"))),
            Value::Float32(v) => Decimal::try_from(*v)
                .map_err(|e| ValueError::InvalidConversion(format!("{v} as decimal: {e}"))),
            other => match other.as_integer() {
                Some(wide) => Decimal::try_from_i128_with_scale(wide, 0).map_err(|_| {
                    ValueError::Overflow {
                        expected: "decimal",
                        value: wide.to_string(),
                    }
                }),
                None => mismatch("decimal", other),
            },
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::String(v) => Ok(v.clone()),
            other => mismatch("string", other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Binary(v) => Ok(v.clone()),
            other => mismatch("binary", other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Uuid(v) => Ok(*v),
            Value::String(v) => Uuid::parse_str(v)
                .map_err(|e| ValueError::InvalidConversion(format!("{v:?} as uuid: {e}"))),
            Value::Binary(v) => Uuid::from_slice(v)
                .map_err(|e| ValueError::InvalidConversion(format!("binary as uuid: {e}"))),
            other => mismatch("uuid", other),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Date(v) => Ok(*v),
            Value::DateTime(v) => Ok(v.date()),
            other => mismatch("date", other),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Time(v) => Ok(*v),
            other => mismatch("time", other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(v) => Ok(*v),
            Value::Date(v) => Ok(v.and_time(NaiveTime::MIN)),
            other => mismatch("datetime", other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTimeOffset(v) => Ok(v.with_timezone(&Utc)),
            Value::DateTime(v) => Ok(v.and_utc()),
            other => mismatch("datetime (utc)", other),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTimeOffset(v) => Ok(*v),
            Value::DateTime(v) => Ok(v.and_utc().fixed_offset()),
            other => mismatch("datetimeoffset", other),
        }
    }
}

impl<T> FromValue for Option<T>
where
    T: FromValue,
{
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::FromValue;
    use crate::record::{Value, ValueError};

    #[test]
    fn integers_convert_when_they_fit() {
        assert_eq!(i32::from_value(&Value::Int16(22)), Ok(22));
        assert_eq!(i64::from_value(&Value::Int32(6134)), Ok(6134));
        assert_eq!(
            i8::from_value(&Value::Int32(300)),
            Err(ValueError::Overflow {
                expected: "i8",
                value: "300".to_owned(),
            })
        );
        assert!(matches!(
            i32::from_value(&Value::String("7".to_owned())),
            Err(ValueError::TypeMismatch { expected: "i32", .. })
        ));
    }

    #[test]
    fn null_is_only_accepted_by_option() {
        assert_eq!(i32::from_value(&Value::Null), Err(ValueError::NullNotAllowed("i32")));
        assert_eq!(Option::<i32>::from_value(&Value::Null), Ok(None));
        assert_eq!(Option::<i32>::from_value(&Value::Int32(7)), Ok(Some(7)));
    }

    #[test]
    fn treat_as_primitive_conversions() {
        let id = Uuid::new_v4();
        assert_eq!(Uuid::from_value(&Value::String(id.to_string())), Ok(id));
        assert_eq!(Uuid::from_value(&Value::Binary(id.as_bytes().to_vec())), Ok(id));
        assert_eq!(
            Decimal::from_value(&Value::Int64(61346154)),
            Ok(Decimal::from(61346154_i64))
        );

        let date = NaiveDate::from_ymd_opt(2000, 7, 4).unwrap();
        let midnight = date.and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            chrono::NaiveDateTime::from_value(&Value::Date(date)),
            Ok(midnight)
        );
        assert_eq!(NaiveDate::from_value(&Value::DateTime(midnight)), Ok(date));
    }
}
