//! Benchmarks for streaming extraction throughput
//!
//! Measures how chunk size affects:
//! - RankedScanner over a large standings document (key search + top-K)
//! - TailExtractor over the retained window of a long lap feed
//!
//! Platform: Cross-platform (synthetic feeds, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pitboard::extract::{ArrayLocator, RankedScanner, TailExtractor};
use pitboard::feeds::driver_standing_row;
use pitboard::test_utils::{lap_feed, synthetic_driver_standings};
use pitboard::types::LapRecord;
use serde_json::Value;
use std::hint::black_box;

fn scan_standings(document: &[u8], chunk: usize) -> usize {
    let mut scanner = RankedScanner::new(ArrayLocator::key("DriverStandings"), 10, chunk, 16 * 1024, driver_standing_row);
    for piece in document.chunks(chunk) {
        match scanner.feed(piece) {
            Ok(true) | Err(_) => break,
            Ok(false) => {}
        }
    }
    scanner.finish().map(|rows| rows.len()).unwrap_or(0)
}

fn bench_ranked_scanner(c: &mut Criterion) {
    let document = synthetic_driver_standings(500).into_bytes();
    let mut group = c.benchmark_group("ranked_scanner");
    group.throughput(Throughput::Bytes(document.len() as u64));

    for chunk in [64usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("driver_standings_500", chunk), &chunk, |b, &chunk| {
            b.iter(|| black_box(scan_standings(black_box(&document), chunk)))
        });
    }
    group.finish();
}

fn bench_tail_extractor(c: &mut Criterion) {
    let durations: Vec<Option<f64>> = (0..300).map(|lap| (lap % 17 != 0).then_some(80.0 + lap as f64 / 10.0)).collect();
    let feed = lap_feed(44, &durations).into_bytes();
    let mut group = c.benchmark_group("tail_extractor");

    for tail in [1024usize, 4096] {
        let window = &feed[feed.len().saturating_sub(tail)..];
        group.throughput(Throughput::Bytes(window.len() as u64));
        group.bench_with_input(BenchmarkId::new("lap_feed_300", tail), &window, |b, window| {
            b.iter(|| {
                let mut extractor =
                    TailExtractor::new(tail, 256, 16 * 1024, |object: &Value| LapRecord::from_object(object));
                black_box(extractor.extract_from_tail(black_box(window)).ok())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ranked_scanner, bench_tail_extractor);
criterion_main!(benches);
