//! Supertrend — the banded trend-flip indicator.
//!
//! A band is built around the bar midpoint (hl2 ± multiplier × ATR). The
//! upper band may only tighten downward while price holds below it, the
//! lower band only upward while price holds above it. The discrete state
//! flips when the close crosses the active band; the line is the active band
//! value (support when long, resistance when short).
//!
//! The internal ATR here is a plain rolling mean of the true range with a
//! one-sample minimum, not Wilder smoothing — the flip sequence of the
//! validated system depends on it.

use crate::domain::Bar;
use crate::indicators::atr::true_range;
use crate::indicators::rolling::rolling_mean_min1;

/// Supertrend line and discrete direction as parallel series.
#[derive(Debug, Clone)]
pub struct SupertrendSeries {
    pub line: Vec<f64>,
    pub bullish: Vec<bool>,
}

impl SupertrendSeries {
    /// True exactly on bars where the direction changed short → long.
    pub fn flip_bull(&self, i: usize) -> bool {
        i > 0 && self.bullish[i] && !self.bullish[i - 1]
    }
}

pub fn supertrend(bars: &[Bar], period: usize, multiplier: f64) -> SupertrendSeries {
    assert!(period >= 1, "Supertrend period must be >= 1");
    let n = bars.len();
    let mut line = vec![f64::NAN; n];
    let mut bullish = vec![false; n];

    if n == 0 {
        return SupertrendSeries { line, bullish };
    }

    let tr = true_range(bars);
    let atr = rolling_mean_min1(&tr, period);

    let hl2 = |i: usize| (bars[i].high + bars[i].low) / 2.0;

    let mut final_upper = hl2(0) + multiplier * atr[0];
    let mut final_lower = hl2(0) - multiplier * atr[0];

    // Start short: the first line is the upper band.
    line[0] = final_upper;
    bullish[0] = false;

    for i in 1..n {
        let basic_upper = hl2(i) + multiplier * atr[i];
        let basic_lower = hl2(i) - multiplier * atr[i];
        let prev_close = bars[i - 1].close;

        // Bands only tighten toward price while price holds inside them.
        if basic_upper < final_upper || prev_close > final_upper {
            final_upper = basic_upper;
        }
        if basic_lower > final_lower || prev_close < final_lower {
            final_lower = basic_lower;
        }

        if !bullish[i - 1] {
            if bars[i].close <= final_upper {
                line[i] = final_upper;
                bullish[i] = false;
            } else {
                line[i] = final_lower;
                bullish[i] = true;
            }
        } else if bars[i].close >= final_lower {
            line[i] = final_lower;
            bullish[i] = true;
        } else {
            line[i] = final_upper;
            bullish[i] = false;
        }
    }

    SupertrendSeries { line, bullish }
}
