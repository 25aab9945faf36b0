//! Descriptors of destination types.
//!
//! A [`TypeShape`] tells the plan compiler how to treat a destination member: as a leaf read
//! straight from one field, or as a nested object assembled from the fields under its path.
//! Shapes are produced by [`Member::shape`], usually through `#[derive(Mapped)]`.

mod impls;

use std::{
    any::{type_name, Any, TypeId},
    fmt,
};

use crate::record::{FromValue, Value, ValueError};

/// A type-erased destination value.
pub type Boxed = Box<dyn Any>;

/// A type that can be written into a destination member.
pub trait Member: Default + 'static {
    fn shape() -> TypeShape;
}

/// A struct that is assembled member by member from a record.
pub trait Mapped: Member {
    /// Whether the type may be built through its parameterless constructor, `Default::default`.
    const CONSTRUCTIBLE: bool = true;

    /// Writable members in declaration order.
    fn members() -> Vec<MemberShape>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    Primitive,
    /// Date and time, decimal, UUID and text.
    TreatAsPrimitive,
    Enumeration,
    Nested,
    Opaque,
}

/// How the plan compiler handles a destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    Primitive,
    TreatAsPrimitive,
    Enumeration,
    NestedConstructible,
    /// Read directly from one field, never recursed into.
    OpaqueLeaf,
}

impl Classification {
    pub fn is_nested(&self) -> bool {
        matches!(self, Classification::NestedConstructible)
    }
}

#[derive(Clone, Copy)]
pub struct TypeShape {
    type_id: TypeId,
    type_name: &'static str,
    kind: ShapeKind,
    nullable: bool,
    default: fn() -> Boxed,
    from_value: fn(&Value) -> Result<Boxed, ValueError>,
    construct: Option<fn() -> Boxed>,
    members: fn() -> Vec<MemberShape>,
    wrap: fn(Boxed) -> Boxed,
}

fn boxed_default<T: Default + 'static>() -> Boxed {
    Box::new(T::default())
}

fn boxed_from_value<T: FromValue + 'static>(value: &Value) -> Result<Boxed, ValueError> {
    T::from_value(value).map(|v| Box::new(v) as Boxed)
}

fn reject_value<T: 'static>(value: &Value) -> Result<Boxed, ValueError> {
    Err(ValueError::InvalidConversion(format!(
        "{} value cannot be read into {}",
        value.type_name(),
        type_name::<T>()
    )))
}

fn no_members() -> Vec<MemberShape> {
    Vec::new()
}

fn identity(value: Boxed) -> Boxed {
    value
}

fn wrap_nullable<T: Member>(value: Boxed) -> Boxed {
    let inner = (T::shape().wrap)(value);
    match inner.downcast::<T>() {
        Ok(inner) => Box::new(Some(*inner)),
        Err(other) => other,
    }
}

impl TypeShape {
    /// A type read directly from one field.
    pub fn leaf<T: Member + FromValue>(kind: ShapeKind) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind,
            nullable: false,
            default: boxed_default::<T>,
            from_value: boxed_from_value::<T>,
            construct: None,
            members: no_members,
            wrap: identity,
        }
    }

    /// A struct assembled from the fields under its path.
    pub fn nested<T: Mapped>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: ShapeKind::Nested,
            nullable: false,
            default: boxed_default::<T>,
            from_value: reject_value::<T>,
            construct: if T::CONSTRUCTIBLE {
                Some(boxed_default::<T>)
            } else {
                None
            },
            members: T::members,
            wrap: identity,
        }
    }

    /// `Option<T>`: treated like `T`, with `None` as its default.
    pub fn nullable<T: Member>() -> Self {
        let inner = T::shape();
        Self {
            type_id: TypeId::of::<Option<T>>(),
            type_name: type_name::<Option<T>>(),
            kind: inner.kind,
            nullable: true,
            default: boxed_default::<Option<T>>,
            from_value: inner.from_value,
            construct: inner.construct,
            members: inner.members,
            wrap: wrap_nullable::<T>,
        }
    }

    /// A type that is never read from a record and always takes its default.
    pub fn opaque<T: Default + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: ShapeKind::Opaque,
            nullable: false,
            default: boxed_default::<T>,
            from_value: reject_value::<T>,
            construct: None,
            members: no_members,
            wrap: identity,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }

    pub fn classify(&self) -> Classification {
        match self.kind {
            ShapeKind::Primitive => Classification::Primitive,
            ShapeKind::TreatAsPrimitive => Classification::TreatAsPrimitive,
            ShapeKind::Enumeration => Classification::Enumeration,
            ShapeKind::Nested if self.construct.is_some() => Classification::NestedConstructible,
            ShapeKind::Nested | ShapeKind::Opaque => Classification::OpaqueLeaf,
        }
    }

    /// Default of the declared type: zero, empty or `None`.
    pub fn default_value(&self) -> Boxed {
        (self.default)()
    }

    /// Converts a non-null field value into the underlying type.
    pub fn convert(&self, value: &Value) -> Result<Boxed, ValueError> {
        (self.from_value)(value)
    }

    /// A fresh instance of the underlying type.
    pub fn construct(&self) -> Option<Boxed> {
        self.construct.map(|construct| construct())
    }

    pub fn members(&self) -> Vec<MemberShape> {
        (self.members)()
    }

    /// Turns an underlying value into the declared type, re-wrapping nullable members.
    pub fn wrap(&self, value: Boxed) -> Boxed {
        (self.wrap)(value)
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeShape")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("constructible", &self.construct.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    /// The target is not the owner type of the member.
    Target,
    /// The value is not of the member's type.
    Value,
}

/// A writable member of a [`Mapped`] struct.
#[derive(Clone, Copy)]
pub struct MemberShape {
    name: &'static str,
    shape: fn() -> TypeShape,
    assign: fn(&mut dyn Any, Boxed) -> Result<(), AssignError>,
}

impl MemberShape {
    pub fn new(
        name: &'static str,
        shape: fn() -> TypeShape,
        assign: fn(&mut dyn Any, Boxed) -> Result<(), AssignError>,
    ) -> Self {
        Self {
            name,
            shape,
            assign,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }

    pub fn assign(&self, target: &mut dyn Any, value: Boxed) -> Result<(), AssignError> {
        (self.assign)(target, value)
    }
}

impl fmt::Debug for MemberShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberShape")
            .field("name", &self.name)
            .field("shape", &self.shape())
            .finish()
    }
}

/// Writes `value` into the field of `target` selected by `slot`.
///
/// Used by `#[derive(Mapped)]` to build member setters.
pub fn assign_field<O, V>(
    target: &mut dyn Any,
    value: Boxed,
    slot: fn(&mut O) -> &mut V,
) -> Result<(), AssignError>
where
    O: 'static,
    V: 'static,
{
    let owner = target.downcast_mut::<O>().ok_or(AssignError::Target)?;
    let value = value.downcast::<V>().map_err(|_| AssignError::Value)?;
    *slot(owner) = *value;
    Ok(())
}
