use std::{any::type_name, collections::HashMap};

use super::{AccessorPlan, FieldPath, PlanCache, PlanKey, Projection};
use crate::{
    config::MemberResolver,
    error::MapError,
    naming::ConventionPair,
    observability::log_trace,
    record::{has_non_null_descendant, try_get_field, DataRecord},
    shape::{Boxed, Classification, MemberShape, TypeShape},
};

/// Describes the source side of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceType {
    name: &'static str,
    record: bool,
}

impl SourceType {
    /// A record source such as a [`crate::record::DataReader`].
    pub fn record<R: DataRecord + ?Sized>() -> Self {
        Self {
            name: type_name::<R>(),
            record: true,
        }
    }

    /// Any source that is not a record.
    pub fn other<S: ?Sized>() -> Self {
        Self {
            name: type_name::<S>(),
            record: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_record(&self) -> bool {
        self.record
    }
}

/// Builds accessor plans through the cache of one configuration.
#[derive(Debug, Clone, Copy)]
pub struct PlanCompiler<'a> {
    cache: &'a PlanCache,
    naming: ConventionPair,
}

impl<'a> PlanCompiler<'a> {
    pub fn new(cache: &'a PlanCache, naming: ConventionPair) -> Self {
        Self { cache, naming }
    }

    pub fn cache(&self) -> &'a PlanCache {
        self.cache
    }

    pub fn naming(&self) -> ConventionPair {
        self.naming
    }

    /// Plan reading a member of declared type `shape` located at `path` from a `source`.
    ///
    /// Fails with [`MapError::UnsupportedSource`] unless `source` is a record type.
    pub fn compile(
        &self,
        source: &SourceType,
        shape: &TypeShape,
        path: &FieldPath,
    ) -> Result<AccessorPlan, MapError> {
        if !source.is_record() {
            return Err(MapError::UnsupportedSource {
                source_type: source.name(),
            });
        }
        self.compile_member(shape, path)
    }

    /// Plan for a member of declared type `shape` at `path`.
    ///
    /// Field presence is checked per record when the plan runs, so compiling never fails for
    /// fields that a record lacks.
    pub fn compile_member(
        &self,
        shape: &TypeShape,
        path: &FieldPath,
    ) -> Result<AccessorPlan, MapError> {
        let classification = self.cache.classify(shape);
        let key = PlanKey::with_naming(
            shape.type_id(),
            shape.type_name(),
            classification,
            path.resolve(&self.naming),
            self.naming,
        );
        self.cache
            .get_or_compile(key, |key| match classification {
                Classification::NestedConstructible => self.compile_nested(shape, path, key),
                Classification::Primitive
                | Classification::TreatAsPrimitive
                | Classification::Enumeration
                | Classification::OpaqueLeaf => Ok(compile_leaf(shape, key)),
            })
    }

    /// Plan building a whole `shape` from a `source` record. Members are resolved through
    /// `resolver`, except those named in `projections`.
    ///
    /// The root is always constructed, whatever the record holds.
    pub fn compile_root(
        &self,
        source: &SourceType,
        shape: &TypeShape,
        projections: &HashMap<&'static str, Projection>,
        resolver: &dyn MemberResolver,
    ) -> Result<AccessorPlan, MapError> {
        let classification = self.cache.classify(shape);
        if !classification.is_nested() {
            return Err(MapError::NotConstructible {
                type_name: shape.type_name(),
            });
        }
        let key = PlanKey::with_naming(
            shape.type_id(),
            shape.type_name(),
            classification,
            "",
            self.naming,
        );
        self.cache.get_or_compile(key, |key| {
            let root = FieldPath::root();
            let mut members = Vec::new();
            for member in shape.members() {
                let member_shape = member.shape();
                let step = match projections.get(member.name()) {
                    Some(projection) if projection.value_type() != member_shape.type_id() => {
                        return Err(MapError::InvalidConfiguration(format!(
                            "projection of {}.{} yields {}, expected {}",
                            shape.type_name(),
                            member.name(),
                            projection.value_type_name(),
                            member_shape.type_name(),
                        )));
                    }
                    Some(projection) => Step::Projected(projection.clone()),
                    None => {
                        let path = root.child(member.name());
                        Step::Plan(resolver.resolve(self, source, &member_shape, &path)?)
                    }
                };
                members.push((member, step));
            }
            Ok(assemble(*shape, key, members, None))
        })
    }

    fn compile_nested(
        &self,
        shape: &TypeShape,
        path: &FieldPath,
        key: &PlanKey,
    ) -> Result<AccessorPlan, MapError> {
        let mut members = Vec::new();
        for member in shape.members() {
            let plan = self.compile_member(&member.shape(), &path.child(member.name()))?;
            members.push((member, Step::Plan(plan)));
        }
        Ok(assemble(*shape, key, members, Some(key.path().to_owned())))
    }
}

enum Step {
    Plan(AccessorPlan),
    Projected(Projection),
}

impl Step {
    fn run(&self, record: &dyn DataRecord) -> Result<Boxed, MapError> {
        match self {
            Step::Plan(plan) => plan.execute(record),
            Step::Projected(projection) => projection.execute(record),
        }
    }
}

/// Plan constructing `shape` and writing every member. With a `probe` prefix, the instance is
/// only built when a field under the prefix holds a value; otherwise the declared default
/// (`None` for nullable members) is returned.
fn assemble(
    shape: TypeShape,
    key: &PlanKey,
    members: Vec<(MemberShape, Step)>,
    probe: Option<String>,
) -> AccessorPlan {
    AccessorPlan::new(key.clone(), move |record| {
        if let Some(prefix) = &probe {
            if !has_non_null_descendant(record, prefix) {
                log_trace!(event = "nested_member_skipped", path = %prefix);
                return Ok(shape.default_value());
            }
        }
        let mut instance = shape.construct().ok_or(MapError::NotConstructible {
            type_name: shape.type_name(),
        })?;
        for (member, step) in &members {
            let value = step.run(record)?;
            member
                .assign(&mut *instance, value)
                .map_err(|_| MapError::Assign {
                    member: member.name(),
                    owner: shape.type_name(),
                })?;
        }
        Ok(shape.wrap(instance))
    })
}

/// Plan reading one field: absent and null fields yield the declared default, anything else
/// is converted to the underlying type and re-wrapped.
fn compile_leaf(shape: &TypeShape, key: &PlanKey) -> AccessorPlan {
    let shape = *shape;
    let field = key.path().to_owned();
    AccessorPlan::new(key.clone(), move |record| match try_get_field(record, &field) {
        None => Ok(shape.default_value()),
        Some(value) if value.is_null() => Ok(shape.default_value()),
        Some(value) => shape
            .convert(value)
            .map(|converted| shape.wrap(converted))
            .map_err(|cause| MapError::Conversion {
                path: field.clone(),
                expected: shape.type_name(),
                cause,
            }),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{PlanCompiler, SourceType};
    use crate::{
        config::DataRecordMemberResolver,
        error::MapError,
        naming::{ConventionPair, NamingConvention},
        plan::{FieldPath, PlanCache},
        record::{MemoryRecord, MemoryTable, Value},
        shape::{Member, TypeShape},
    };

    #[test]
    fn leaf_plans_default_on_absent_and_null() {
        let cache = PlanCache::new();
        let compiler = PlanCompiler::new(&cache, ConventionPair::default());
        let table = MemoryTable::new(["Integer", "Maybe"])
            .with_row([Value::Int32(6134), Value::Null])
            .unwrap();
        let record = table.record(0).unwrap();

        let run = |shape: TypeShape, name: &'static str| {
            compiler
                .compile_member(&shape, &FieldPath::root().child(name))
                .unwrap()
                .execute(&record)
                .unwrap()
        };

        let present = run(<i32 as Member>::shape(), "Integer");
        assert_eq!(present.downcast_ref::<i32>(), Some(&6134));
        let nullable = run(<Option<i64> as Member>::shape(), "Integer");
        assert_eq!(nullable.downcast_ref::<Option<i64>>(), Some(&Some(6134)));
        let null = run(<Option<i32> as Member>::shape(), "Maybe");
        assert_eq!(null.downcast_ref::<Option<i32>>(), Some(&None));
        let null_plain = run(<i32 as Member>::shape(), "Maybe");
        assert_eq!(null_plain.downcast_ref::<i32>(), Some(&0));
        let absent = run(<String as Member>::shape(), "String1");
        assert_eq!(absent.downcast_ref::<String>(), Some(&String::new()));
    }

    #[test]
    fn conversion_errors_carry_the_field_path() {
        let cache = PlanCache::new();
        let compiler = PlanCompiler::new(&cache, ConventionPair::default());
        let table = MemoryTable::new(["Flag"])
            .with_row([Value::from("yes")])
            .unwrap();
        let record = table.record(0).unwrap();

        let err = compiler
            .compile_member(&<bool as Member>::shape(), &FieldPath::root().child("Flag"))
            .unwrap()
            .execute(&record)
            .unwrap_err();
        assert!(matches!(err, MapError::Conversion { ref path, .. } if path == "Flag"));
    }

    #[test]
    fn non_record_sources_are_rejected() {
        let cache = PlanCache::new();
        let compiler = PlanCompiler::new(&cache, ConventionPair::default());

        let err = compiler
            .compile(
                &SourceType::other::<String>(),
                &<i32 as Member>::shape(),
                &FieldPath::root().child("Integer"),
            )
            .unwrap_err();
        assert!(matches!(err, MapError::UnsupportedSource { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn naming_is_applied_before_lookup() {
        let cache = PlanCache::new();
        let naming = ConventionPair::new(
            NamingConvention::LowerUnderscore,
            NamingConvention::PascalCase,
        );
        let compiler = PlanCompiler::new(&cache, naming);
        let table = MemoryTable::new(["small_integer"])
            .with_row([Value::Int16(22)])
            .unwrap();
        let record = table.record(0).unwrap();

        let plan = compiler
            .compile_member(
                &<i16 as Member>::shape(),
                &FieldPath::root().child("SmallInteger"),
            )
            .unwrap();
        assert_eq!(plan.key().path(), "small_integer");
        assert_eq!(
            plan.execute(&record).unwrap().downcast_ref::<i16>(),
            Some(&22)
        );
    }

    #[test]
    fn roots_must_be_constructible() {
        let cache = PlanCache::new();
        let compiler = PlanCompiler::new(&cache, ConventionPair::default());

        let err = compiler
            .compile_root(
                &SourceType::record::<MemoryRecord<'static>>(),
                &<i32 as Member>::shape(),
                &HashMap::new(),
                &DataRecordMemberResolver,
            )
            .unwrap_err();
        assert!(matches!(err, MapError::NotConstructible { .. }));
    }
}
