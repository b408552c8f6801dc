//! Dataset generation benchmarks.
//!
//! Benchmarks for:
//! - Per-type value generation in both orders
//! - Full wide-schema dataset generation
//! - Row assembly over a generated dataset

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ebb_common::{ColumnType, SchemaDescriptor, ValueOrder};
use ebb_datagen::{DataSet, RowAssembler, TypedValueGenerator};

/// Benchmark single-type sequence generation.
fn bench_generate_typed(c: &mut Criterion) {
    let generator = TypedValueGenerator::new(42);
    let mut group = c.benchmark_group("datagen/generate");

    for (name, ty) in [
        ("bigint", ColumnType::BigInt),
        ("double", ColumnType::Double),
        ("binary16", ColumnType::Binary(16)),
        ("nchar32", ColumnType::NChar(32)),
    ] {
        for order in [ValueOrder::Ordered, ValueOrder::Random] {
            let id = BenchmarkId::new(name, format!("{order:?}"));
            group.throughput(Throughput::Elements(10_000));
            group.bench_with_input(id, &ty, |b, &ty| {
                b.iter(|| black_box(generator.generate(ty, 10_000, order).unwrap()));
            });
        }
    }
    group.finish();
}

/// Benchmark generating the full wide-schema dataset.
fn bench_wide_dataset(c: &mut Criterion) {
    let generator = TypedValueGenerator::new(42);
    let schema = SchemaDescriptor::wide();
    let mut group = c.benchmark_group("datagen/wide_dataset");

    for rows in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                black_box(
                    DataSet::for_schema(&generator, &schema, rows, ValueOrder::Ordered)
                        .unwrap(),
                )
            });
        });
    }
    group.finish();
}

/// Benchmark assembling and rendering rows.
fn bench_assemble(c: &mut Criterion) {
    let generator = TypedValueGenerator::new(42);
    let schema = SchemaDescriptor::wide();
    let dataset =
        DataSet::for_schema(&generator, &schema, 1_000, ValueOrder::Ordered).unwrap();
    let assembler = RowAssembler::new(&schema, &dataset);

    c.bench_function("datagen/assemble_render", |b| {
        b.iter(|| {
            for i in 0..1_000 {
                black_box(assembler.assemble(i).unwrap().render());
            }
        });
    });
}

criterion_group!(benches, bench_generate_typed, bench_wide_dataset, bench_assemble);
criterion_main!(benches);
