//! Accessor plans: compiled, reusable functions from a record to one destination value.

mod cache;
mod compiler;
mod path;

use std::{
    any::{type_name, TypeId},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

pub use cache::PlanCache;
pub use compiler::{PlanCompiler, SourceType};
pub use path::FieldPath;

use crate::{
    error::MapError,
    naming::ConventionPair,
    record::DataRecord,
    shape::{Boxed, Classification},
};

pub(crate) type PlanFn = dyn Fn(&dyn DataRecord) -> Result<Boxed, MapError> + Send + Sync;

/// Cache key of a plan: the destination type, its classification and the resolved field path.
///
/// One type may be declared both as a nested member and as an opaque one, so the
/// classification keeps those plans apart. The convention pair is part of the key because it
/// decides how the paths of nested members resolve.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanKey {
    type_id: TypeId,
    classification: Classification,
    path: String,
    naming: ConventionPair,
    type_name: &'static str,
}

impl PlanKey {
    pub fn new(
        type_id: TypeId,
        type_name: &'static str,
        classification: Classification,
        path: impl Into<String>,
    ) -> Self {
        Self::with_naming(
            type_id,
            type_name,
            classification,
            path,
            ConventionPair::default(),
        )
    }

    pub fn with_naming(
        type_id: TypeId,
        type_name: &'static str,
        classification: Classification,
        path: impl Into<String>,
        naming: ConventionPair,
    ) -> Self {
        Self {
            type_id,
            classification,
            path: path.into(),
            naming,
            type_name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.type_name, self.path)
    }
}

/// A compiled function producing one type-erased destination value from the current record.
///
/// Plans hold no mutable state, so one plan serves every row and every thread.
#[derive(Clone)]
pub struct AccessorPlan {
    key: Arc<PlanKey>,
    func: Arc<PlanFn>,
}

impl AccessorPlan {
    pub(crate) fn new<F>(key: PlanKey, func: F) -> Self
    where
        F: Fn(&dyn DataRecord) -> Result<Boxed, MapError> + Send + Sync + 'static,
    {
        Self {
            key: Arc::new(key),
            func: Arc::new(func),
        }
    }

    pub fn key(&self) -> &PlanKey {
        &self.key
    }

    pub fn execute(&self, record: &dyn DataRecord) -> Result<Boxed, MapError> {
        (self.func)(record)
    }

    /// Whether both handles refer to the same compiled plan.
    pub fn ptr_eq(&self, other: &AccessorPlan) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for AccessorPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorPlan")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A caller supplied function computing one member of a root type from the whole record.
#[derive(Clone)]
pub struct Projection {
    func: Arc<PlanFn>,
    value_type: TypeId,
    value_type_name: &'static str,
}

impl Projection {
    pub fn new<V, F>(project: F) -> Self
    where
        V: 'static,
        F: Fn(&dyn DataRecord) -> Result<V, MapError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |record| project(record).map(|value| Box::new(value) as Boxed)),
            value_type: TypeId::of::<V>(),
            value_type_name: type_name::<V>(),
        }
    }

    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    pub fn execute(&self, record: &dyn DataRecord) -> Result<Boxed, MapError> {
        (self.func)(record)
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("value_type", &self.value_type_name)
            .finish_non_exhaustive()
    }
}

/// The root plan of a destination type `T`, typed again.
pub struct ItemPlan<T> {
    plan: AccessorPlan,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ItemPlan<T> {
    fn clone(&self) -> Self {
        Self {
            plan: self.plan.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ItemPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemPlan").field(&self.plan).finish()
    }
}

impl<T: 'static> ItemPlan<T> {
    pub(crate) fn new(plan: AccessorPlan) -> Self {
        Self {
            plan,
            _marker: PhantomData,
        }
    }

    pub fn plan(&self) -> &AccessorPlan {
        &self.plan
    }

    /// Builds one `T` from the current row of `record`.
    pub fn apply<R>(&self, record: &R) -> Result<T, MapError>
    where
        R: DataRecord + ?Sized,
    {
        let record: &dyn DataRecord = &record;
        let value = self.plan.execute(record)?;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| MapError::Assign {
                member: "<root>",
                owner: type_name::<T>(),
            })
    }
}
