use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parking_lot::RwLock;
use seq_man::{CopyOnWriteSequence, ExclusiveSequence};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// SINGLE-THREADED: ExclusiveSequence against a bare Vec

fn bench_single_threaded_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("01_single_threaded/append");
    for size in [1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("ExclusiveSequence", size), size, |b, &size| {
            b.iter(|| {
                let seq = ExclusiveSequence::new();
                for i in 0..size {
                    seq.append(black_box(i)).unwrap();
                }
                black_box(seq)
            });
        });
        group.bench_with_input(BenchmarkId::new("Vec", size), size, |b, &size| {
            b.iter(|| {
                let mut vec = Vec::new();
                for i in 0..size {
                    vec.push(black_box(i));
                }
                black_box(vec)
            });
        });
    }
    group.finish();
}

fn bench_single_threaded_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("01_single_threaded/iterate");
    let size = 100_000usize;
    let seq: ExclusiveSequence<usize> = (0..size).collect();
    let vec: Vec<usize> = (0..size).collect();
    group.throughput(Throughput::Elements(size as u64));
    group.bench_function("ExclusiveSequence", |b| {
        b.iter(|| black_box(seq.iter().map(|item| item.unwrap_or(0)).sum::<usize>()));
    });
    group.bench_function("Vec", |b| {
        b.iter(|| black_box(vec.iter().sum::<usize>()));
    });
    group.finish();
}

// MULTI-THREADED: readers racing one writer

fn run_readers_with_writer<R, W>(readers: usize, reads: usize, read: R, write: W)
where
    R: Fn(usize) + Sync,
    W: Fn(usize) + Sync,
{
    thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..reads / 10 {
                write(i);
            }
        });
        for _ in 0..readers {
            scope.spawn(|| {
                for i in 0..reads {
                    read(i);
                }
            });
        }
    });
}

fn bench_multi_threaded_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("02_multi_threaded/reads_with_writer");
    group.measurement_time(Duration::from_secs(10));
    for readers in [2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::new("CopyOnWriteSequence", readers), readers, |b, &readers| {
            b.iter(|| {
                let cow = Arc::new(CopyOnWriteSequence::from_vec((0..1_000usize).collect()));
                run_readers_with_writer(
                    readers,
                    10_000,
                    |i| {
                        black_box(cow.read_at(i % 1_000, |item| *item).unwrap());
                    },
                    |i| {
                        let _ = cow.set(i % 1_000, i);
                    },
                );
            });
        });
        group.bench_with_input(BenchmarkId::new("RwLock<Vec>", readers), readers, |b, &readers| {
            b.iter(|| {
                let locked = Arc::new(RwLock::new((0..1_000usize).collect::<Vec<_>>()));
                run_readers_with_writer(
                    readers,
                    10_000,
                    |i| {
                        black_box(locked.read()[i % 1_000]);
                    },
                    |i| locked.write()[i % 1_000] = i,
                );
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_threaded_append,
    bench_single_threaded_iterate,
    bench_multi_threaded_reads,
);
criterion_main!(benches);
