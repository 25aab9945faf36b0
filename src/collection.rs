use std::{any::type_name, fmt, iter::FusedIterator, vec};

use crate::{
    error::MapError,
    observability::log_debug,
    plan::ItemPlan,
    record::DataReader,
    sequence::RecordSequence,
};

/// How a reader is turned into destination values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MaterializeMode {
    /// Drain the reader into a `Vec` before returning.
    #[default]
    Eager,
    /// Map one row per `next()`, starting at the first demand.
    Lazy,
}

impl MaterializeMode {
    pub fn from_yield_return(yield_return: bool) -> Self {
        if yield_return {
            MaterializeMode::Lazy
        } else {
            MaterializeMode::Eager
        }
    }
}

/// Destination values mapped from a reader.
pub enum Materialized<'r, R: ?Sized, T> {
    List(Vec<T>),
    Lazy(LazyRows<'r, R, T>),
}

impl<'r, R, T> Materialized<'r, R, T>
where
    R: DataReader + ?Sized,
    T: 'static,
{
    pub fn is_list(&self) -> bool {
        matches!(self, Materialized::List(_))
    }

    /// Number of values, known only for an eager list.
    pub fn len(&self) -> Option<usize> {
        match self {
            Materialized::List(items) => Some(items.len()),
            Materialized::Lazy(_) => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            Materialized::List(items) => Some(items),
            Materialized::Lazy(_) => None,
        }
    }

    /// Collects every value, draining a lazy sequence on the way.
    pub fn into_vec(self) -> Result<Vec<T>, MapError> {
        match self {
            Materialized::List(items) => Ok(items),
            Materialized::Lazy(rows) => rows.collect(),
        }
    }
}

impl<R: ?Sized, T: fmt::Debug> fmt::Debug for Materialized<'_, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Materialized::List(items) => f.debug_tuple("List").field(items).finish(),
            Materialized::Lazy(rows) => f
                .debug_struct("Lazy")
                .field("rows", &rows.sequence.rows())
                .finish_non_exhaustive(),
        }
    }
}

impl<'r, R, T> IntoIterator for Materialized<'r, R, T>
where
    R: DataReader + ?Sized,
    T: 'static,
{
    type Item = Result<T, MapError>;
    type IntoIter = MaterializedIter<'r, R, T>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Materialized::List(items) => MaterializedIter::List(items.into_iter()),
            Materialized::Lazy(rows) => MaterializedIter::Lazy(rows),
        }
    }
}

pub enum MaterializedIter<'r, R: ?Sized, T> {
    List(vec::IntoIter<T>),
    Lazy(LazyRows<'r, R, T>),
}

impl<R, T> Iterator for MaterializedIter<'_, R, T>
where
    R: DataReader + ?Sized,
    T: 'static,
{
    type Item = Result<T, MapError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MaterializedIter::List(items) => items.next().map(Ok),
            MaterializedIter::Lazy(rows) => rows.next(),
        }
    }
}

/// Single-pass sequence mapping one row per demand.
///
/// Nothing is read before the first `next()`. After the first error the sequence is over.
pub struct LazyRows<'r, R: ?Sized, T> {
    sequence: RecordSequence<'r, R>,
    plan: ItemPlan<T>,
    failed: bool,
}

impl<R: ?Sized, T> LazyRows<'_, R, T> {
    /// Rows read from the reader so far.
    pub fn rows_read(&self) -> usize {
        self.sequence.rows()
    }
}

impl<R, T> Iterator for LazyRows<'_, R, T>
where
    R: DataReader + ?Sized,
    T: 'static,
{
    type Item = Result<T, MapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = match self.sequence.advance() {
            Ok(Some(record)) => self.plan.apply(record),
            Ok(None) => return None,
            Err(err) => Err(err.into()),
        };
        self.failed = item.is_err();
        Some(item)
    }
}

impl<R, T> FusedIterator for LazyRows<'_, R, T>
where
    R: DataReader + ?Sized,
    T: 'static,
{
}

/// Applies `plan` to every row of `sequence`, eagerly or lazily per `mode`.
pub fn materialize<'r, R, T>(
    mut sequence: RecordSequence<'r, R>,
    plan: ItemPlan<T>,
    mode: MaterializeMode,
) -> Result<Materialized<'r, R, T>, MapError>
where
    R: DataReader + ?Sized,
    T: 'static,
{
    log_debug!(
        event = "materialize_started",
        destination = type_name::<T>(),
        mode = ?mode,
    );
    match mode {
        MaterializeMode::Eager => {
            let mut items = Vec::new();
            while let Some(record) = sequence.advance()? {
                items.push(plan.apply(record)?);
            }
            Ok(Materialized::List(items))
        }
        MaterializeMode::Lazy => Ok(Materialized::Lazy(LazyRows {
            sequence,
            plan,
            failed: false,
        })),
    }
}
