//! Benchmark the feature pipeline and the full backtest loop.

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

use scalplab_core::config::ScalperConfig;
use scalplab_core::domain::Bar;
use scalplab_core::{compute_features, Backtest};

fn make_bars(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 15000.0;
    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        price += ((seed % 200) as f64 - 100.0) * 0.05 + 0.2;
        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(Bar {
            ts: base + Duration::minutes(15 * i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            volume: 1000 + (seed % 900),
        });
    }
    bars
}

fn bench_pipeline(c: &mut Criterion) {
    let cfg = ScalperConfig::validated();
    let bars = make_bars(5000);

    c.bench_function("compute_features_5k_bars", |b| {
        b.iter(|| compute_features(std::hint::black_box(&bars), &cfg))
    });
}

fn bench_backtest(c: &mut Criterion) {
    let cfg = ScalperConfig::validated();
    let bars = make_bars(5000);
    let backtest = Backtest::new(cfg).unwrap();

    c.bench_function("backtest_5k_bars", |b| {
        b.iter(|| backtest.run(std::hint::black_box(&bars)))
    });
}

criterion_group!(benches, bench_pipeline, bench_backtest);
criterion_main!(benches);
