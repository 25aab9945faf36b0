use std::iter::repeat_with;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rowmap::{Mapped, Mapper, MapperConfiguration, MemoryTable, TypeMap, Value};

#[derive(Debug, Default, Mapped)]
#[mapped(rename_all = "PascalCase")]
pub struct Customer {
    id: i64,
    name: String,
    score: Option<f64>,
    address: Option<Address>,
}

#[derive(Debug, Default, Mapped)]
#[mapped(rename_all = "PascalCase")]
pub struct Address {
    city: String,
    zip: Option<String>,
}

fn gen_table(rows: usize) -> MemoryTable {
    let mut table = MemoryTable::new(["Id", "Name", "Score", "Address.City", "Address.Zip"]);
    for id in 0..rows {
        let name: String = repeat_with(fastrand::alphanumeric).take(16).collect();
        let city = if fastrand::bool() {
            Value::String(repeat_with(fastrand::alphanumeric).take(12).collect())
        } else {
            Value::Null
        };
        table
            .push_row([
                Value::Int64(id as i64),
                Value::String(name),
                Value::Float64(fastrand::f64()),
                city,
                Value::Null,
            ])
            .unwrap();
    }
    table
}

fn mapper(yield_return: bool) -> Mapper {
    let config = MapperConfiguration::builder()
        .add_data_reader_mapping(yield_return)
        .create_map(TypeMap::<Customer>::new())
        .build()
        .unwrap();
    Mapper::new(config)
}

fn map_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_rows");

    for rows in [16, 1_024, 16_384] {
        let table = gen_table(rows);
        group.throughput(Throughput::Elements(rows as u64));

        let eager = mapper(false);
        group.bench_with_input(BenchmarkId::new("eager", rows), &table, |b, table| {
            b.iter(|| {
                let customers = eager
                    .map_reader::<Customer, _>(&mut table.reader())
                    .unwrap()
                    .into_vec()
                    .unwrap();
                black_box(customers)
            });
        });

        let lazy = mapper(true);
        group.bench_with_input(BenchmarkId::new("lazy", rows), &table, |b, table| {
            b.iter(|| {
                let mut reader = table.reader();
                let mapped = lazy.map_reader::<Customer, _>(&mut reader).unwrap();
                for customer in mapped {
                    black_box(customer.unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, map_rows);
criterion_main!(benches);
