use std::fmt::Debug;

use crate::{
    error::MapError,
    plan::{AccessorPlan, FieldPath, PlanCompiler, SourceType},
    shape::TypeShape,
};

/// Resolves the plan of one destination member for a source type.
///
/// Type maps ask their resolvers in registration order and use the first that matches the
/// source.
pub trait MemberResolver: Debug + Send + Sync {
    fn is_match(&self, source: &SourceType) -> bool;

    fn resolve(
        &self,
        compiler: &PlanCompiler<'_>,
        source: &SourceType,
        shape: &TypeShape,
        path: &FieldPath,
    ) -> Result<AccessorPlan, MapError>;
}

/// Resolves members of record sources by field name, through the plan compiler.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataRecordMemberResolver;

impl MemberResolver for DataRecordMemberResolver {
    fn is_match(&self, source: &SourceType) -> bool {
        source.is_record()
    }

    fn resolve(
        &self,
        compiler: &PlanCompiler<'_>,
        source: &SourceType,
        shape: &TypeShape,
        path: &FieldPath,
    ) -> Result<AccessorPlan, MapError> {
        compiler.compile(source, shape, path)
    }
}

#[cfg(test)]
mod tests {
    use super::{DataRecordMemberResolver, MemberResolver};
    use crate::{
        error::MapError,
        naming::ConventionPair,
        plan::{FieldPath, PlanCache, PlanCompiler, SourceType},
        record::TableReader,
        shape::Member,
    };

    #[test]
    fn only_record_sources_resolve() {
        let cache = PlanCache::new();
        let compiler = PlanCompiler::new(&cache, ConventionPair::default());
        let resolver = DataRecordMemberResolver;
        let path = FieldPath::root().child("Integer");
        let shape = <i32 as Member>::shape();

        let record = SourceType::record::<TableReader<'static>>();
        assert!(resolver.is_match(&record));
        assert!(resolver.resolve(&compiler, &record, &shape, &path).is_ok());

        let other = SourceType::other::<Vec<String>>();
        assert!(!resolver.is_match(&other));
        let err = resolver.resolve(&compiler, &other, &shape, &path).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedSource { source_type } if source_type.contains("Vec")));
    }
}
