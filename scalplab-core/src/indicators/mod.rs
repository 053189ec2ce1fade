//! Per-bar technical feature computation.
//!
//! Single-series indicators (EMA, RSI, ATR) implement the `Indicator` trait
//! and are computed batch-style over the whole bar slice, emitting NaN for
//! warm-up bars. Multi-series indicators (MACD, DMI, Supertrend) return a
//! struct of parallel columns instead of widening the trait.
//!
//! Every function here is strictly causal: the value at index `i` depends
//! only on bars `0..=i`. The lookahead test suite recomputes truncated
//! prefixes to enforce this.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod macd;
pub mod percentile;
pub mod rolling;
pub mod rsi;
pub mod supertrend;
pub mod vwap;

pub use adx::{dmi, DmiSeries};
pub use atr::{true_range, wilder_smooth, Atr};
pub use ema::{ema_of_series, Ema};
pub use macd::{macd, MacdSeries};
pub use percentile::rolling_percent_rank;
pub use rsi::Rsi;
pub use supertrend::{supertrend, SupertrendSeries};
pub use vwap::session_vwap;

use crate::domain::Bar;

/// A batch indicator over the base bar series.
pub trait Indicator {
    fn name(&self) -> &str;

    /// Bars required before the first non-NaN value.
    fn lookback(&self) -> usize;

    /// One output value per input bar; NaN during warm-up.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV on a 15-minute grid: open = prev close,
/// high/low bracket the body by one point, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                ts: base + Duration::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
