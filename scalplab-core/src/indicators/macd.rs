//! MACD — Moving Average Convergence/Divergence.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal_period)
//! hist = line - signal
//! Lookback: slow + signal_period - 2 (signal seeds on the first valid line run).

use crate::domain::Bar;
use crate::indicators::ema::ema_of_series;

/// The three MACD columns as parallel series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

pub fn macd(bars: &[Bar], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    assert!(fast >= 1 && slow >= 1 && signal_period >= 1, "MACD periods must be >= 1");
    assert!(fast < slow, "MACD fast period must be shorter than slow");

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_of_series(&closes, fast);
    let ema_slow = ema_of_series(&closes, slow);

    let n = bars.len();
    let mut line = vec![f64::NAN; n];
    for i in 0..n {
        line[i] = ema_fast[i] - ema_slow[i]; // NaN until both seeded
    }

    let signal = ema_of_series(&line, signal_period);

    let mut hist = vec![f64::NAN; n];
    for i in 0..n {
        hist[i] = line[i] - signal[i];
    }

    MacdSeries { line, signal, hist }
}
