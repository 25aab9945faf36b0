use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use super::MemberResolver;
use crate::{
    error::MapError,
    naming::{ConventionPair, NamingConvention},
    plan::Projection,
    record::DataRecord,
    shape::{Mapped, TypeShape},
};

/// Mapping from records to a destination type `T`.
pub struct TypeMap<T> {
    projections: HashMap<&'static str, Projection>,
    bases: Vec<(TypeId, &'static str)>,
    source_naming: Option<NamingConvention>,
    destination_naming: Option<NamingConvention>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Mapped> Default for TypeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Mapped> TypeMap<T> {
    pub fn new() -> Self {
        Self {
            projections: HashMap::new(),
            bases: Vec::new(),
            source_naming: None,
            destination_naming: None,
            _marker: PhantomData,
        }
    }

    /// Computes member `name` from the whole record instead of the same-named field.
    ///
    /// ```ignore
    /// TypeMap::<Order>::new().for_member("Placed", |record| Ok(record.get_at::<NaiveDateTime>(10)?))
    /// ```
    pub fn for_member<V, F>(mut self, name: &'static str, project: F) -> Self
    where
        V: 'static,
        F: Fn(&dyn DataRecord) -> Result<V, MapError> + Send + Sync + 'static,
    {
        self.projections.insert(name, Projection::new(project));
        self
    }

    /// Inherits the member projections of `B`'s map for members `T` shares with `B`.
    ///
    /// Projections declared on this map take precedence.
    pub fn include_base<B: Mapped>(mut self) -> Self {
        self.bases.push((TypeId::of::<B>(), type_name::<B>()));
        self
    }

    pub fn source_naming(self, source_naming: NamingConvention) -> Self {
        TypeMap {
            source_naming: Some(source_naming),
            ..self
        }
    }

    pub fn destination_naming(self, destination_naming: NamingConvention) -> Self {
        TypeMap {
            destination_naming: Some(destination_naming),
            ..self
        }
    }

    pub(crate) fn into_entry(self) -> TypeMapEntry {
        TypeMapEntry {
            shape: T::shape(),
            projections: self.projections,
            bases: self.bases,
            source_naming: self.source_naming,
            destination_naming: self.destination_naming,
            naming: ConventionPair::default(),
            resolvers: Vec::new(),
        }
    }
}

/// A registered type map with its settings resolved at build time.
pub(crate) struct TypeMapEntry {
    pub(crate) shape: TypeShape,
    pub(crate) projections: HashMap<&'static str, Projection>,
    pub(crate) bases: Vec<(TypeId, &'static str)>,
    pub(crate) source_naming: Option<NamingConvention>,
    pub(crate) destination_naming: Option<NamingConvention>,
    pub(crate) naming: ConventionPair,
    pub(crate) resolvers: Vec<Arc<dyn MemberResolver>>,
}

impl TypeMapEntry {
    /// Fills unset conventions from the enclosing scope.
    pub(crate) fn inherit_naming(
        &mut self,
        source: Option<NamingConvention>,
        destination: Option<NamingConvention>,
    ) {
        self.source_naming = self.source_naming.or(source);
        self.destination_naming = self.destination_naming.or(destination);
    }

    pub(crate) fn finish_naming(&mut self) {
        self.naming = ConventionPair::new(
            self.source_naming.unwrap_or_default(),
            self.destination_naming.unwrap_or_default(),
        );
    }
}

impl fmt::Debug for TypeMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut projections: Vec<_> = self.projections.keys().collect();
        projections.sort();
        f.debug_struct("TypeMapEntry")
            .field("destination", &self.shape.type_name())
            .field("projections", &projections)
            .field("naming", &self.naming)
            .field("resolvers", &self.resolvers)
            .finish()
    }
}
