use criterion::{Criterion, criterion_group, criterion_main};
use octofhir_predicate_compiler::model::{
    Attribute, Cardinality, EntityType, Relationship, ValueType,
};
use octofhir_predicate_compiler::{InMemorySchema, OperationCompiler, StructuralConverter, parse};
use serde_json::json;
use std::hint::black_box;

fn schema() -> InMemorySchema {
    InMemorySchema::builder()
        .entity(
            EntityType::new("com.example.Person")
                .with_attribute(Attribute::new("name", ValueType::String))
                .with_attribute(Attribute::nullable("age", ValueType::Integer))
                .with_attribute(Attribute::new("createdAt", ValueType::Timestamp))
                .with_relationship(Relationship::new(
                    "orders",
                    "com.example.Order",
                    Cardinality::Many,
                )),
        )
        .entity(
            EntityType::new("com.example.Order")
                .with_attribute(Attribute::new("total", ValueType::Double))
                .with_attribute(Attribute::new("placedOn", ValueType::Date)),
        )
        .build()
        .expect("benchmark schema is valid")
}

const EXPRESSIONS: [&str; 4] = [
    "this.age > 18",
    "this.name == 'Bob' & this.age in (18, 21, 65)",
    "toLowerCase(this.name) startsWith 'b' | this.createdAt < '2024-01-01T00:00:00Z'",
    "this.orders.notExists(this.total >= 100.0 & year(this.placedOn) == 2024)",
];

fn benchmark_parser(c: &mut Criterion) {
    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        c.bench_function(&format!("expr_{i}_parser"), |b| {
            b.iter(|| black_box(parse(black_box(expression))))
        });
    }
}

fn benchmark_operation_compiler(c: &mut Criterion) {
    let schema = schema();
    let compiler = OperationCompiler::new(&schema);

    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        c.bench_function(&format!("expr_{i}_compile"), |b| {
            b.iter(|| black_box(compiler.compile("com.example.Person", black_box(expression))))
        });
    }
}

fn benchmark_structural_converter(c: &mut Criterion) {
    let schema = schema();
    let converter = StructuralConverter::new(&schema);
    let criteria = json!({
        "OR": [
            {"name": {"toLowerCase": {"startsWith": "b"}}},
            {"age": {"in": [18, 21, 65]}},
            {"orders": {"notExists": {"total": {"greaterThanEquals": 100}}}}
        ]
    });
    let Some(criteria) = criteria.as_object() else {
        return;
    };

    c.bench_function("structural_convert", |b| {
        b.iter(|| black_box(converter.convert("com.example.Person", black_box(criteria))))
    });
}

criterion_group!(
    benches,
    benchmark_parser,
    benchmark_operation_compiler,
    benchmark_structural_converter
);
criterion_main!(benches);
