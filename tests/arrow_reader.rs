#![cfg(feature = "arrow")]

use std::sync::Arc;

use arrow::{
    array::{Float64Array, Int64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema, SchemaRef},
};
use rowmap::{
    record::arrow::BatchReader, MapError, Mapped, Mapper, MapperConfiguration, RecordError,
    TypeMap,
};

#[derive(Debug, Default, PartialEq, Mapped)]
#[mapped(rename_all = "PascalCase")]
struct Location {
    city: String,
}

#[derive(Debug, Default, PartialEq, Mapped)]
#[mapped(rename_all = "PascalCase")]
struct Order {
    id: i64,
    total: Option<f64>,
    location: Option<Location>,
}

fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("Id", DataType::Int64, false),
        Field::new("Total", DataType::Float64, true),
        Field::new("Location.City", DataType::Utf8, true),
    ]))
}

fn batch(ids: Vec<i64>, totals: Vec<Option<f64>>, cities: Vec<Option<&str>>) -> RecordBatch {
    RecordBatch::try_new(
        schema(),
        vec![
            Arc::new(Int64Array::from(ids)),
            Arc::new(Float64Array::from(totals)),
            Arc::new(StringArray::from(cities)),
        ],
    )
    .unwrap()
}

fn reader() -> BatchReader {
    BatchReader::try_new(
        schema(),
        [
            batch(vec![1, 2], vec![Some(9.5), None], vec![Some("Porto"), None]),
            batch(vec![3], vec![Some(1.25)], vec![Some("Braga")]),
        ],
    )
    .unwrap()
}

fn mapper(yield_return: bool) -> Mapper {
    let config = MapperConfiguration::builder()
        .add_data_reader_mapping(yield_return)
        .create_map(TypeMap::<Order>::new())
        .build()
        .unwrap();
    Mapper::new(config)
}

fn expected() -> Vec<Order> {
    vec![
        Order {
            id: 1,
            total: Some(9.5),
            location: Some(Location {
                city: "Porto".to_owned(),
            }),
        },
        Order {
            id: 2,
            total: None,
            location: None,
        },
        Order {
            id: 3,
            total: Some(1.25),
            location: Some(Location {
                city: "Braga".to_owned(),
            }),
        },
    ]
}

#[test]
fn eager_mapping_spans_batches() {
    let mut reader = reader();
    let orders = mapper(false)
        .map_reader::<Order, _>(&mut reader)
        .unwrap()
        .into_vec()
        .unwrap();

    assert_eq!(orders, expected());
}

#[test]
fn lazy_mapping_spans_batches() {
    let mut reader = reader();
    let orders: Result<Vec<Order>, MapError> = mapper(true)
        .map_reader::<Order, _>(&mut reader)
        .unwrap()
        .into_iter()
        .collect();

    assert_eq!(orders.unwrap(), expected());
}

#[test]
fn mismatched_batches_are_rejected() {
    let other = Arc::new(Schema::new(vec![Field::new("Id", DataType::Utf8, false)]));
    let batch = RecordBatch::try_new(
        other,
        vec![Arc::new(StringArray::from(vec!["1"]))],
    )
    .unwrap();

    let err = BatchReader::try_new(schema(), [batch]).err().unwrap();
    assert!(matches!(err, RecordError::Source(_)));
}
