//! Record building benchmarks
//!
//! Measures envelope construction and serialization per record type.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowlog_core::{
    Direction, EnvelopeFields, FieldNames, LogLevel, MetricType, RecordBuilder,
};

fn builder() -> RecordBuilder {
    let envelope = EnvelopeFields {
        application: "orders-api".to_string(),
        environment: "prod".to_string(),
        correlation_id: "c-1".to_string(),
        message_id: "m-1".to_string(),
        flow_name: "create-order".to_string(),
    };
    let at = Utc
        .timestamp_millis_opt(1_700_000_000_000)
        .single()
        .unwrap_or_default();
    RecordBuilder::new(envelope, &FieldNames::default(), at)
}

/// Benchmark building and serializing each record type
fn bench_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("records");
    let builder = builder();
    let body = r#"{"sku":"A1","quantity":3,"customer":{"id":42,"tier":"gold"}}"#;

    group.bench_function("payload", |b| {
        b.iter(|| {
            builder
                .payload(Direction::RequestIn, None, black_box(body))
                .to_json_string()
        })
    });

    group.bench_function("event", |b| {
        b.iter(|| builder.event(black_box(body)).map(|r| r.to_json_string()))
    });

    group.bench_function("metric", |b| {
        b.iter(|| {
            builder
                .metric(MetricType::ServiceTime, Some("inventory"), black_box(250))
                .to_json_string()
        })
    });

    group.bench_function("custom", |b| {
        b.iter(|| {
            builder
                .custom(black_box("checkpoint reached"), &LogLevel::Info)
                .to_json_string()
        })
    });

    group.finish();
}

/// Benchmark the envelope itself
fn bench_envelope(c: &mut Criterion) {
    c.bench_function("envelope", |b| b.iter(|| black_box(builder())));
}

criterion_group!(benches, bench_records, bench_envelope);
criterion_main!(benches);
