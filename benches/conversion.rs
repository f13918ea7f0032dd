//! Conversion Benchmarks
//!
//! Throughput of the hot paths:
//! - Flat class conversion from a loose instance
//! - Conversion through a subtype with inherited attributes
//! - Composite nesting and reference arrays
//! - Registry: batch resolution and snapshot reads
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench conversion
//! cargo bench --bench conversion -- "convert/flat"
//! ```

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use metatype::{
    AttributeDefinition, ClassDefinition, Multiplicity, Referenceable, Struct, StructDefinition,
    TraitDefinition, TypeBatch, TypeSystem, Value,
};

// =============================================================================
// Fixtures
// =============================================================================

fn registry() -> TypeSystem {
    let ts = TypeSystem::new();
    ts.define_types(
        TypeBatch::new()
            .with(
                StructDefinition::new("Column")
                    .attribute(AttributeDefinition::required("name", "string"))
                    .attribute(AttributeDefinition::required("type", "string")),
            )
            .with(TraitDefinition::new("Audited").attribute(AttributeDefinition::optional("by", "string")))
            .with(
                ClassDefinition::new("Asset")
                    .attribute(AttributeDefinition::required("name", "string"))
                    .attribute(AttributeDefinition::optional("owner", "string"))
                    .attribute(AttributeDefinition::optional("created", "date")),
            )
            .with(
                ClassDefinition::new("Table")
                    .super_type("Asset")
                    .attribute(AttributeDefinition::optional("rows", "long"))
                    .attribute(AttributeDefinition::collection("columns", "array<Column>"))
                    .attribute(AttributeDefinition::optional("parent", "Table"))
                    .attribute(AttributeDefinition::collection("lineage", "array<Table>")),
            ),
    )
    .unwrap();
    ts
}

fn table(columns: usize) -> Referenceable {
    let cols: Vec<Value> = (0..columns)
        .map(|i| {
            Struct::new("Column")
                .with("name", format!("c{}", i))
                .with("type", "string")
                .into()
        })
        .collect();
    Referenceable::new("Table", &["Audited"])
        .with("name", "orders")
        .with("owner", "etl")
        .with("created", Utc::now())
        .with("rows", "1000000")
        .with("columns", Value::Array(cols))
}

// =============================================================================
// Conversion
// =============================================================================

fn bench_convert(c: &mut Criterion) {
    let ts = registry();
    let asset = ts.get_class_type("Asset").unwrap();
    let table_type = ts.get_class_type("Table").unwrap();

    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Elements(1));

    let flat = Referenceable::new("Asset", &[]).with("name", "a").with("owner", "b");
    group.bench_function("flat", |b| {
        b.iter(|| asset.convert(black_box(flat.clone()), Multiplicity::REQUIRED).unwrap())
    });

    let sub = table(4);
    group.bench_function("via_supertype", |b| {
        b.iter(|| asset.convert(black_box(sub.clone()), Multiplicity::REQUIRED).unwrap())
    });

    for columns in [1usize, 16, 128] {
        let input = table(columns);
        group.bench_with_input(BenchmarkId::new("columns", columns), &input, |b, input| {
            b.iter(|| table_type.convert(black_box(input.clone()), Multiplicity::REQUIRED).unwrap())
        });
    }

    let lineage: Vec<Value> = (0..32).map(|_| table(1).into()).collect();
    let with_refs = table(1)
        .with("parent", table(1))
        .with("lineage", Value::Array(lineage));
    group.bench_function("references", |b| {
        b.iter(|| table_type.convert(black_box(with_refs.clone()), Multiplicity::REQUIRED).unwrap())
    });

    group.finish();
}

fn bench_typed_set(c: &mut Criterion) {
    let ts = registry();
    let table_type = ts.get_class_type("Table").unwrap();
    let mut instance = table_type.create_instance(&[]).unwrap();

    c.bench_function("typed/set_long_from_string", |b| {
        b.iter(|| instance.set("rows", black_box("12345")).unwrap())
    });
}

// =============================================================================
// Registry
// =============================================================================

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    for width in [8usize, 64] {
        group.bench_with_input(BenchmarkId::new("define_chain", width), &width, |b, &width| {
            b.iter(|| {
                let ts = TypeSystem::new();
                let batch: TypeBatch = (0..width)
                    .map(|i| {
                        let def = ClassDefinition::new(format!("T{}", i))
                            .attribute(AttributeDefinition::optional(format!("a{}", i), "string"));
                        if i == 0 {
                            def
                        } else {
                            def.super_type(format!("T{}", i - 1))
                        }
                    })
                    .collect();
                ts.define_types(batch).unwrap()
            })
        });
    }

    let ts = registry();
    group.bench_function("snapshot", |b| b.iter(|| black_box(ts.snapshot())));
    group.bench_function("get_class_type", |b| {
        b.iter(|| ts.get_class_type(black_box("Table")).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_convert, bench_typed_set, bench_registry);
criterion_main!(benches);
