//! Correlation injection benchmarks
//!
//! Measures the work every entry point does before building a record.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flowlog_core::{CorrelationInjector, EmptyCarrier, ManualClock, MessageContext};
use serde_json::{json, Map, Value};

fn headers(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// Benchmark first injection for each carrier shape
fn bench_first_injection(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_injection");
    let injector = CorrelationInjector::default();
    let clock = ManualClock::new(1_700_000_000_000);

    let flat = headers(json!({
        "X-Message-ID": "m-1",
        "X-Correlation-ID": "c-1",
        "X-Start-Time": 1_699_999_999_000i64
    }));
    let nested = headers(json!({ "properties": flat.clone() }));

    group.bench_function("empty", |b| {
        b.iter(|| {
            let mut ctx = MessageContext::new();
            injector.inject(&mut ctx, &EmptyCarrier, black_box("host-1"), &clock);
            ctx
        })
    });

    for (name, carrier) in [("flat", &flat), ("nested", &nested)] {
        group.bench_with_input(BenchmarkId::new("carrier", name), carrier, |b, carrier| {
            b.iter(|| {
                let mut ctx = MessageContext::new();
                injector.inject(&mut ctx, black_box(carrier), "host-1", &clock);
                ctx
            })
        });
    }

    group.finish();
}

/// Benchmark re-injection into an established context
fn bench_repeat_injection(c: &mut Criterion) {
    let injector = CorrelationInjector::default();
    let clock = ManualClock::new(1_700_000_000_000);
    let carrier = headers(json!({ "X-Transaction-ID": "T1" }));
    let mut ctx = MessageContext::new();
    injector.inject(&mut ctx, &carrier, "host-1", &clock);

    c.bench_function("repeat_injection", |b| {
        b.iter(|| injector.inject(black_box(&mut ctx), &carrier, "host-1", &clock))
    });
}

criterion_group!(benches, bench_first_injection, bench_repeat_injection);
criterion_main!(benches);
