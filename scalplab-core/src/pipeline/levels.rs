//! Key-level proximity: Fibonacci retracements, round numbers, session VWAP,
//! and prior day/week extremes.
//!
//! A bar is "near" a level when |close − level| < 0.4 × ATR. While ATR is
//! still NaN the radius is NaN and every proximity test is false — warm-up
//! bars never look close to anything.
//!
//! The 38.2% retracement of the reference feature set never feeds the
//! proximity test (only 50% and 61.8% do), so it is not materialized here.

use crate::config::PatternParams;
use crate::domain::Bar;
use crate::indicators::rolling::{rolling_max_min1, rolling_min_min1};

/// Upstream columns the level pass reads.
pub struct LevelInputs<'a> {
    pub bars: &'a [Bar],
    pub atr: &'a [f64],
    pub vwap: &'a [f64],
    pub prev_day_high: &'a [f64],
    pub prev_day_low: &'a [f64],
    pub prev_day_close: &'a [f64],
    pub prev_week_high: &'a [f64],
    pub prev_week_low: &'a [f64],
}

/// The three combined proximity flags consumed by scoring.
#[derive(Debug, Clone)]
pub struct LevelColumns {
    pub near_support: Vec<bool>,
    pub near_resist: Vec<bool>,
    pub near_daily_level: Vec<bool>,
}

pub fn compute_levels(inp: &LevelInputs<'_>, cfg: &PatternParams) -> LevelColumns {
    let bars = inp.bars;
    let n = bars.len();

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let fib_high = rolling_max_min1(&highs, cfg.fib_lookback);
    let fib_low = rolling_min_min1(&lows, cfg.fib_lookback);

    let mut cols = LevelColumns {
        near_support: vec![false; n],
        near_resist: vec![false; n],
        near_daily_level: vec![false; n],
    };

    for i in 0..n {
        let close = bars[i].close;
        let radius = inp.atr[i] * cfg.proximity_atr_frac;
        let near = |level: f64| (close - level).abs() < radius;

        let range = fib_high[i] - fib_low[i];
        let fib_500 = fib_high[i] - range * 0.500;
        let fib_618 = fib_high[i] - range * 0.618;
        let near_fib = near(fib_618) || near(fib_500);

        // The grid level below the close; the reference tests only this one.
        let round_down = (close / cfg.round_interval).floor() * cfg.round_interval;
        let near_round = near(round_down);

        let near_vwap = near(inp.vwap[i]);

        let near_pdh = near(inp.prev_day_high[i]);
        let near_pdl = near(inp.prev_day_low[i]);
        let near_pdc = near(inp.prev_day_close[i]);
        let near_pwh = near(inp.prev_week_high[i]);
        let near_pwl = near(inp.prev_week_low[i]);

        cols.near_support[i] = near_fib || near_round || near_vwap || near_pdl || near_pwl;
        cols.near_resist[i] = near_fib || near_round || near_vwap || near_pdh || near_pwh;
        cols.near_daily_level[i] = near_pdh || near_pdl || near_pdc;
    }

    cols
}
