use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rayon::prelude::*;
use seq_man::{CopyOnWriteSequence, Cursor, ExclusiveSequence, Splitter};
use std::hint::black_box;

#[derive(Clone, Debug, PartialEq)]
struct Candle {
    open: u64,
    close: u64,
    volume: u64,
}

fn create_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle {
            open: 100 + (i as u64 * 7) % 50,
            close: 100 + (i as u64 * 11) % 50,
            volume: (i as u64 * 13) % 1_000,
        })
        .collect()
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("exclusive/append");
    for size in [1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let seq = ExclusiveSequence::new();
                for i in 0..size {
                    seq.append(black_box(i)).unwrap();
                }
                black_box(seq)
            });
        });
    }
    group.finish();
}

fn bench_insert_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("exclusive/insert_front");
    for size in [100, 1_000, 5_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let seq = ExclusiveSequence::new();
                for i in 0..size {
                    seq.insert(0, black_box(i)).unwrap();
                }
                black_box(seq)
            });
        });
    }
    group.finish();
}

fn bench_cursor(c: &mut Criterion) {
    let seq = ExclusiveSequence::from_vec(create_candles(100_000));
    c.bench_function("exclusive/cursor_100k", |b| {
        b.iter(|| {
            let mut cursor = seq.iter();
            let mut volume = 0;
            while let Some(candle) = cursor.advance().unwrap() {
                volume += candle.volume;
            }
            black_box(volume)
        });
    });
    c.bench_function("exclusive/for_each_100k", |b| {
        b.iter(|| {
            let mut volume = 0;
            seq.for_each(|candle| volume += candle.volume);
            black_box(volume)
        });
    });
}

fn bench_remove_if(c: &mut Criterion) {
    let mut group = c.benchmark_group("exclusive/remove_if");
    for size in [10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("half", size), size, |b, &size| {
            b.iter_batched(
                || ExclusiveSequence::from_vec(create_candles(size)),
                |seq| {
                    let removed = seq.remove_if(|candle| candle.close < candle.open).unwrap();
                    black_box(removed)
                },
                BatchSize::LargeInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("none", size), size, |b, &size| {
            b.iter_batched(
                || ExclusiveSequence::from_vec(create_candles(size)),
                |seq| black_box(seq.remove_if(|candle| candle.volume > 5_000).unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_splitter(c: &mut Criterion) {
    let seq = ExclusiveSequence::from_vec(create_candles(100_000));
    c.bench_function("exclusive/splitter_drain_100k", |b| {
        b.iter(|| {
            let mut right = seq.splitter();
            let mut volume = 0;
            if let Some(mut left) = right.try_split().unwrap() {
                left.for_each_remaining(|candle| volume += candle.volume).unwrap();
            }
            right.for_each_remaining(|candle| volume += candle.volume).unwrap();
            black_box(volume)
        });
    });
}

fn bench_cow(c: &mut Criterion) {
    let mut group = c.benchmark_group("cow");
    for size in [1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("append", size), size, |b, &size| {
            b.iter(|| {
                let cow = CopyOnWriteSequence::new();
                for i in 0..size {
                    cow.append(black_box(i)).unwrap();
                }
                black_box(cow)
            });
        });
    }

    let cow = CopyOnWriteSequence::from_vec(create_candles(100_000));
    group.bench_function("get_100k", |b| {
        b.iter(|| {
            let mut volume = 0;
            for i in 0..cow.len() {
                volume += cow.read_at(i, |candle| candle.volume).unwrap();
            }
            black_box(volume)
        });
    });
    group.bench_function("snapshot_iter_100k", |b| {
        b.iter(|| black_box(cow.iter().map(|candle| candle.volume).sum::<u64>()));
    });
    group.bench_function("par_iter_100k", |b| {
        b.iter(|| black_box(cow.par_iter().map(|candle| candle.volume).sum::<u64>()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_insert_front,
    bench_cursor,
    bench_remove_if,
    bench_splitter,
    bench_cow,
);
criterion_main!(benches);
