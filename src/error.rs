use std::{
    any::{type_name, TypeId},
    fmt,
};

use thiserror::Error;

use crate::record::{RecordError, ValueError};

/// Source and destination of a mapping, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    pub source: &'static str,
    pub destination: &'static str,
    pub destination_id: TypeId,
}

impl TypePair {
    pub fn of<S: ?Sized, D: 'static>() -> Self {
        Self {
            source: type_name::<S>(),
            destination: type_name::<D>(),
            destination_id: TypeId::of::<D>(),
        }
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    /// The mapping of `pair` could not be set up; nothing was read from the source.
    #[error("error mapping types {pair}: {cause}")]
    Configuration {
        pair: TypePair,
        #[source]
        cause: Box<MapError>,
    },
    #[error("missing type map configuration or unsupported mapping {0}")]
    TypeMapNotFound(TypePair),
    #[error("{source_type} is not a record type")]
    UnsupportedSource { source_type: &'static str },
    #[error("record member resolution is not registered, call add_data_reader_mapping")]
    NoMemberResolver,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("field {path} cannot be converted to {expected}: {cause}")]
    Conversion {
        path: String,
        expected: &'static str,
        #[source]
        cause: ValueError,
    },
    #[error("value of member {member} cannot be written into {owner}")]
    Assign {
        member: &'static str,
        owner: &'static str,
    },
    #[error("{type_name} has no parameterless constructor")]
    NotConstructible { type_name: &'static str },
    #[error("record error: {0}")]
    Record(#[from] RecordError),
}

impl MapError {
    /// The innermost cause once configuration wrapping is removed.
    pub fn root_cause(&self) -> &MapError {
        match self {
            MapError::Configuration { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}
