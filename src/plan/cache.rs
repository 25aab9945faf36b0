use std::{
    any::TypeId,
    sync::atomic::{AtomicUsize, Ordering},
};

use crossbeam_skiplist::SkipMap;

use super::{AccessorPlan, PlanKey};
use crate::{
    error::MapError,
    observability::{log_debug, log_trace},
    shape::{Classification, ShapeKind, TypeShape},
};

/// Identity of a declared shape. A type declared opaque on one member and nested on another
/// has two shapes.
type ShapeId = (TypeId, ShapeKind, bool);

/// Compiled plans of one mapping configuration.
///
/// Lookups are lock-free. Two threads missing the same key may both compile it, but only the
/// first inserted plan is kept and handed out from then on.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: SkipMap<PlanKey, AccessorPlan>,
    classifications: SkipMap<ShapeId, Classification>,
    compiled: AtomicUsize,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PlanKey) -> Option<AccessorPlan> {
        self.plans.get(key).map(|entry| entry.value().clone())
    }

    pub fn get_or_compile<F>(&self, key: PlanKey, compile: F) -> Result<AccessorPlan, MapError>
    where
        F: FnOnce(&PlanKey) -> Result<AccessorPlan, MapError>,
    {
        if let Some(entry) = self.plans.get(&key) {
            log_trace!(event = "plan_cache_hit", key = %key);
            return Ok(entry.value().clone());
        }

        let plan = compile(&key)?;
        self.compiled.fetch_add(1, Ordering::Relaxed);
        log_debug!(
            event = "plan_compiled",
            destination = key.type_name(),
            path = key.path(),
        );
        let entry = self.plans.get_or_insert(key, plan);
        Ok(entry.value().clone())
    }

    /// Classification of `shape`, computed once per declared shape.
    pub fn classify(&self, shape: &TypeShape) -> Classification {
        let id = (shape.type_id(), shape.kind(), shape.is_constructible());
        if let Some(entry) = self.classifications.get(&id) {
            return *entry.value();
        }
        *self
            .classifications
            .get_or_insert(id, shape.classify())
            .value()
    }

    /// Number of plans compiled so far, including compiles that lost an insert race.
    pub fn compiled_count(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{any::TypeId, sync::Arc, thread};

    use super::PlanCache;
    use crate::{
        plan::{AccessorPlan, PlanKey},
        shape::{Boxed, Classification, Mapped, Member, MemberShape, TypeShape},
    };

    fn key(path: &str) -> PlanKey {
        PlanKey::new(TypeId::of::<i32>(), "i32", Classification::Primitive, path)
    }

    fn constant(key: &PlanKey, value: i32) -> AccessorPlan {
        AccessorPlan::new(key.clone(), move |_| Ok(Box::new(value) as Boxed))
    }

    #[test]
    fn same_key_is_compiled_once() {
        let cache = PlanCache::new();

        let first = cache.get_or_compile(key("Integer"), |k| Ok(constant(k, 1))).unwrap();
        let second = cache
            .get_or_compile(key("Integer"), |_| panic!("recompiled a cached plan"))
            .unwrap();
        let other = cache.get_or_compile(key("Integer2"), |k| Ok(constant(k, 2))).unwrap();

        assert!(first.ptr_eq(&second));
        assert!(!first.ptr_eq(&other));
        assert_eq!(cache.compiled_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_compiles_are_not_cached() {
        let cache = PlanCache::new();

        let err = cache.get_or_compile(key("Integer"), |_| {
            Err(crate::error::MapError::InvalidConfiguration("boom".to_owned()))
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.compiled_count(), 0);
    }

    #[test]
    fn concurrent_compiles_retain_one_plan() {
        let cache = Arc::new(PlanCache::new());

        let plans: Vec<AccessorPlan> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    cache
                        .get_or_compile(key("Shared"), |k| Ok(constant(k, i)))
                        .unwrap()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(cache.len(), 1);
        let retained = cache.get(&key("Shared")).unwrap();
        assert!(plans.iter().all(|plan| plan.ptr_eq(&retained)));
        assert!(cache.compiled_count() >= 1);
    }

    #[test]
    fn classification_is_cached_per_type() {
        let cache = PlanCache::new();
        let shape = <Option<String> as Member>::shape();

        assert_eq!(cache.classify(&shape), Classification::TreatAsPrimitive);
        assert_eq!(cache.classify(&shape), Classification::TreatAsPrimitive);
    }

    #[derive(Default)]
    struct Address;

    impl Member for Address {
        fn shape() -> TypeShape {
            TypeShape::nested::<Self>()
        }
    }

    impl Mapped for Address {
        fn members() -> Vec<MemberShape> {
            Vec::new()
        }
    }

    #[test]
    fn opaque_and_nested_shapes_of_one_type_classify_apart() {
        let cache = PlanCache::new();
        let opaque = TypeShape::opaque::<Address>();
        let nested = <Address as Member>::shape();

        assert_eq!(cache.classify(&opaque), Classification::OpaqueLeaf);
        assert_eq!(cache.classify(&nested), Classification::NestedConstructible);
        assert_eq!(cache.classify(&opaque), Classification::OpaqueLeaf);

        let leaf = PlanKey::new(
            TypeId::of::<Address>(),
            "Address",
            Classification::OpaqueLeaf,
            "Home",
        );
        let inner = PlanKey::new(
            TypeId::of::<Address>(),
            "Address",
            Classification::NestedConstructible,
            "Home",
        );
        cache.get_or_compile(leaf.clone(), |k| Ok(constant(k, 1))).unwrap();
        cache.get_or_compile(inner.clone(), |k| Ok(constant(k, 2))).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(!cache.get(&leaf).unwrap().ptr_eq(&cache.get(&inner).unwrap()));
    }
}
