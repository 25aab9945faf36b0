use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Member, ShapeKind, TypeShape};

macro_rules! impl_leaf_member {
    ($kind:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Member for $ty {
                fn shape() -> TypeShape {
                    TypeShape::leaf::<Self>(ShapeKind::$kind)
                }
            }
        )*
    };
}

impl_leaf_member!(Primitive => bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl_leaf_member!(
    TreatAsPrimitive => String,
    Decimal,
    Uuid,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    DateTime<FixedOffset>,
);

impl_leaf_member!(Opaque => Vec<u8>);

impl<T> Member for Option<T>
where
    T: Member,
{
    fn shape() -> TypeShape {
        TypeShape::nullable::<T>()
    }
}
