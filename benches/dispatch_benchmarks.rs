//! Criterion benchmarks for rust_analytics_system

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_analytics_system::prelude::*;
use rust_analytics_system::shipping::{MemoryPartitionStore, Scheduler};
use std::sync::Arc;
use std::time::Duration;

struct NullHandler;

impl Handler for NullHandler {
    fn initialize(&mut self, _context: &HandlerContext) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, _name: &str, attributes: Option<&Attributes>) -> Result<()> {
        black_box(attributes);
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

struct ParkedScheduler;

impl Scheduler for ParkedScheduler {
    fn schedule_once(&self, _after: Duration, _task: Box<dyn FnOnce() + Send>) {}
}

fn null_analytics() -> Analytics {
    let mut builder = Analytics::builder();
    for target in Target::DECLARED {
        builder = builder.factory(target, || NullHandler);
    }
    let analytics = builder.build();
    analytics.initialize_all();
    analytics
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let analytics = null_analytics();

    group.bench_function("single_target_no_data", |b| {
        b.iter(|| {
            analytics
                .new_event(black_box("tick"))
                .to(Target::StructuredLog)
                .send()
        });
    });

    group.bench_function("all_targets_with_data", |b| {
        b.iter(|| {
            analytics
                .new_event(black_box("checkout"))
                .with_attribute("amount", 42)
                .with_attribute("currency", "EUR")
                .send()
        });
    });

    group.finish();
}

fn bench_default_merging(c: &mut Criterion) {
    let mut group = c.benchmark_group("default_merging");
    group.throughput(Throughput::Elements(1));

    for defaults in [0usize, 8, 32] {
        let analytics = null_analytics();
        let global: Attributes = (0..defaults).map(|i| (format!("g{}", i), i as i64)).collect();
        let specific: Attributes = (0..defaults / 2)
            .map(|i| (format!("g{}", i), "override"))
            .collect();
        analytics.add_default_parameters(Target::All, global);
        analytics.add_default_parameters(Target::CrashReporter, specific);

        group.bench_with_input(BenchmarkId::from_parameter(defaults), &defaults, |b, _| {
            b.iter(|| analytics.new_event("e").with_attribute("k", 1).send());
        });
    }

    group.finish();
}

// ============================================================================
// Shipper Benchmarks
// ============================================================================

fn bench_shipper_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("shipper");
    group.throughput(Throughput::Elements(1));

    let shipper = Arc::new(
        LogShipper::builder(ShipperConfig::new())
            .store(MemoryPartitionStore::new())
            .scheduler(Arc::new(ParkedScheduler))
            .start()
            .expect("Failed to start shipper"),
    );

    group.bench_function("log_event_silent", |b| {
        b.iter(|| shipper.log_event(black_box("buffered line")));
    });

    group.bench_function("log_event_then_sync", |b| {
        b.iter(|| {
            let _ = shipper.log_event(black_box("buffered line"));
            shipper.sync()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_dispatch,
    bench_default_merging,
    bench_shipper_enqueue
);

criterion_main!(benches);
