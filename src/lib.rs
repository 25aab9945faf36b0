//! Compiled, cached accessor plans that bind record streams to typed Rust structs.
//!
//! A destination type describes its members through `#[derive(Mapped)]`. The first time a
//! destination is mapped from a record source, rowmap compiles one accessor plan per member
//! path and caches it in the [`MapperConfiguration`]; every later row and every later mapping
//! call reuses the same plans.
//!
//! ```no_run
//! use rowmap::{Mapped, Mapper, MapperConfiguration, MemoryTable, TypeMap, Value};
//!
//! #[derive(Debug, Default, Mapped)]
//! #[mapped(rename_all = "PascalCase")]
//! struct Customer {
//!     id: i64,
//!     name: String,
//!     address: Option<Address>,
//! }
//!
//! #[derive(Debug, Default, Mapped)]
//! #[mapped(rename_all = "PascalCase")]
//! struct Address {
//!     city: String,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MapperConfiguration::builder()
//!     .add_data_reader_mapping(false)
//!     .create_map(TypeMap::<Customer>::new())
//!     .build()?;
//! let mapper = Mapper::new(config);
//!
//! let table = MemoryTable::new(["Id", "Name", "Address.City"])
//!     .with_row([Value::from(1_i64), Value::from("Ada"), Value::Null])?;
//! let customers = mapper.map_reader::<Customer, _>(&mut table.reader())?.into_vec()?;
//! assert!(customers[0].address.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! Readers are forward-only: a mapping consumes the rows it reads and cannot rewind.

extern crate self as rowmap;

mod observability;

pub mod collection;
pub mod config;
pub mod error;
pub mod mapper;
pub mod naming;
pub mod plan;
pub mod record;
pub mod sequence;
pub mod shape;

pub use rowmap_macros::Mapped;

pub use crate::{
    collection::{LazyRows, MaterializeMode, Materialized},
    config::{
        ConfigurationBuilder, DataReaderProfile, DataRecordMemberResolver, MapperConfiguration,
        MemberResolver, Profile, ProfileExpression, TypeMap,
    },
    error::{MapError, TypePair},
    mapper::Mapper,
    naming::{ConventionPair, NamingConvention},
    record::{
        DataReader, DataRecord, DataRecordExt, FromValue, MemoryRecord, MemoryTable, RecordError,
        TableReader, Value, ValueError,
    },
    shape::{Mapped, Member},
};
