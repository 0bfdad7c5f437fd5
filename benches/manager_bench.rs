//! Benchmarks for the service manager

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use service_manager::{Constructed, Inject, ServiceManager};
use std::hint::black_box;
use std::sync::Arc;

#[allow(dead_code)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

#[allow(dead_code)]
struct Chained {
    inner: Arc<SmallService>,
}

#[allow(dead_code)]
#[derive(Default, Inject)]
struct Injected {
    #[inject("Small")]
    small: Option<Arc<SmallService>>,
    #[inject("Medium")]
    medium: Option<Arc<MediumService>>,
}

fn populated() -> ServiceManager {
    let manager = ServiceManager::new();
    manager.set("Small", |_| Ok(Constructed::new(SmallService { value: 42 }))).unwrap();
    manager
        .set("Medium", |_| {
            Ok(Constructed::new(MediumService {
                name: "test".to_string(),
                values: vec![1, 2, 3, 4, 5],
            }))
        })
        .unwrap();
    manager
        .set("Chained", |locator| {
            let inner = locator.get::<SmallService>("Small")?;
            Ok(Constructed::new(Chained { inner }))
        })
        .unwrap();
    manager
        .set("Injected", |_| Ok(Constructed::injectable(Injected::default())))
        .unwrap();
    manager
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("set_one", |b| {
        b.iter(|| {
            let manager = ServiceManager::new();
            manager.set("Small", |_| Ok(Constructed::new(SmallService { value: 42 }))).unwrap();
            black_box(manager)
        })
    });

    group.bench_function("set_four", |b| {
        b.iter(|| black_box(populated()))
    });

    group.bench_function("duplicate_rejected", |b| {
        let manager = populated();
        b.iter(|| {
            let rejected = manager.set("Small", |_| Ok(Constructed::new(0u8))).is_err();
            black_box(rejected)
        })
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    let manager = populated();
    manager.resolve("Small").unwrap();
    manager.resolve("Medium").unwrap();

    group.bench_function("resolve_cached", |b| {
        b.iter(|| black_box(manager.resolve("Small").unwrap()))
    });

    group.bench_function("get_cached", |b| {
        b.iter(|| black_box(manager.get::<MediumService>("Medium").unwrap()))
    });

    group.bench_function("has", |b| b.iter(|| black_box(manager.has("Small"))));

    group.bench_function("try_get_not_found", |b| {
        b.iter(|| black_box(manager.try_get::<SmallService>("Missing")))
    });

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for name in ["Small", "Chained", "Injected"] {
        group.bench_with_input(BenchmarkId::new("first_resolve", name), name, |b, name| {
            b.iter_batched(
                populated,
                |manager| black_box(manager.resolve(name).unwrap()),
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("cycle_detected", |b| {
        let manager = ServiceManager::new();
        manager
            .set("Loop", |locator| {
                locator.resolve("Loop")?;
                Ok(Constructed::new(()))
            })
            .unwrap();
        b.iter(|| black_box(manager.resolve("Loop").is_err()))
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("concurrent_reads_4", |b| {
        let manager = Arc::new(populated());
        manager.resolve("Injected").unwrap();

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let m = Arc::clone(&manager);
                    thread::spawn(move || {
                        for _ in 0..100 {
                            let _ = m.get::<Injected>("Injected").unwrap();
                        }
                    })
                })
                .collect();

            for h in handles {
                h.join().unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_resolution,
    bench_construction,
    bench_concurrent,
);

criterion_main!(benches);
