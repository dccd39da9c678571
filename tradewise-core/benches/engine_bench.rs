//! Criterion benchmarks for the decision path.
//!
//! Benchmarks:
//! 1. Indicator computation over typical window sizes
//! 2. Single-timeframe signal evaluation
//! 3. Full `evaluate()` over the default 1h/4h market

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradewise_core::domain::{AccountBalance, Interval, Kline, Position, PriceSeries};
use tradewise_core::indicators::Indicators;
use tradewise_core::signals::SignalEvaluator;
use tradewise_core::{DecisionEngine, EngineConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_klines(n: usize, interval: Interval) -> Vec<Kline> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 45_000.0 + (i as f64 * 0.1).sin() * 1_000.0;
            let open = close - 30.0;
            Kline {
                timestamp: start + interval.duration() * i as i32,
                open,
                high: close + 150.0,
                low: open - 150.0,
                close,
                volume: 100.0 + (i % 50) as f64,
            }
        })
        .collect()
}

fn make_series(n: usize, interval: Interval) -> PriceSeries {
    PriceSeries::new("BTCUSDT", interval, make_klines(n, interval)).unwrap()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for n in [50usize, 100, 200] {
        let klines = make_klines(n, Interval::OneHour);
        group.bench_with_input(BenchmarkId::from_parameter(n), &klines, |b, klines| {
            b.iter(|| Indicators::compute(black_box(klines), 14))
        });
    }
    group.finish();
}

// ── 2. Signal evaluation ─────────────────────────────────────────────

fn bench_evaluator(c: &mut Criterion) {
    let evaluator = SignalEvaluator::default();
    let series = make_series(100, Interval::OneHour);
    c.bench_function("evaluate_timeframe_100", |b| {
        b.iter(|| evaluator.evaluate(black_box(&series), black_box(44_800.0)))
    });
}

// ── 3. Full evaluation ───────────────────────────────────────────────

fn bench_engine(c: &mut Criterion) {
    let engine = DecisionEngine::new(EngineConfig::default()).unwrap();
    let series = vec![
        make_series(100, Interval::OneHour),
        make_series(50, Interval::FourHours),
    ];
    let balance = AccountBalance::new(0.01, 1_000.0);
    let position = Position::open(44_000.0, 0.01);

    c.bench_function("evaluate_1h_4h", |b| {
        b.iter(|| {
            engine.evaluate(
                black_box(&series),
                black_box(Some(44_800.0)),
                &balance,
                &position,
            )
        })
    });
}

criterion_group!(benches, bench_indicators, bench_evaluator, bench_engine);
criterion_main!(benches);
