use std::sync::Arc;

use crate::{
    collection::{materialize, Materialized},
    config::MapperConfiguration,
    error::{MapError, TypePair},
    plan::{ItemPlan, SourceType},
    record::{DataReader, DataRecord},
    sequence::RecordSequence,
    shape::Mapped,
};

/// Maps records and readers to destination types of one configuration.
#[derive(Debug, Clone)]
pub struct Mapper {
    config: Arc<MapperConfiguration>,
}

impl Mapper {
    pub fn new(config: impl Into<Arc<MapperConfiguration>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    pub fn configuration(&self) -> &MapperConfiguration {
        &self.config
    }

    /// Maps the row `record` is positioned on.
    pub fn map_record<T, R>(&self, record: &R) -> Result<T, MapError>
    where
        T: Mapped,
        R: DataRecord + ?Sized,
    {
        self.item_plan::<T, R>()?.apply(record)
    }

    /// Maps every remaining row of `reader`.
    ///
    /// Eager configurations return [`Materialized::List`]; lazy ones return
    /// [`Materialized::Lazy`], which reads nothing until iterated. Configuration problems are
    /// reported before the reader is touched.
    pub fn map_reader<'r, T, R>(
        &self,
        reader: &'r mut R,
    ) -> Result<Materialized<'r, R, T>, MapError>
    where
        T: Mapped,
        R: DataReader + ?Sized,
    {
        if !self.config.reader_mapping_enabled() {
            return Err(MapError::Configuration {
                pair: TypePair::of::<R, T>(),
                cause: Box::new(MapError::NoMemberResolver),
            });
        }
        let plan = self.item_plan::<T, R>()?;
        materialize(RecordSequence::new(reader), plan, self.config.mode())
    }

    fn item_plan<T, R>(&self) -> Result<ItemPlan<T>, MapError>
    where
        T: Mapped,
        R: DataRecord + ?Sized,
    {
        self.config
            .item_plan::<T>(&SourceType::record::<R>())
            .map_err(|cause| MapError::Configuration {
                pair: TypePair::of::<R, T>(),
                cause: Box::new(cause),
            })
    }
}
