//! Candle patterns, breakouts, and the momentum-shift blocking window.
//!
//! Batch column passes over the base series, like the indicator layer. All
//! flags are strictly causal: bar `i` only reads bars at or before `i`.

use crate::config::PatternParams;
use crate::domain::{Bar, Session};
use crate::indicators::rolling::{rolling_max_min1, rolling_mean_min1};

/// Rolling window for the average candle body, shared by every body-relative
/// threshold below.
const AVG_BODY_WINDOW: usize = 20;

/// Upstream columns the pattern pass reads.
pub struct PatternInputs<'a> {
    pub bars: &'a [Bar],
    pub sessions: &'a [Session],
    pub vol_ratio: &'a [f64],
    pub vol_above: &'a [bool],
    pub vol_spike: &'a [bool],
    pub macd_line: &'a [f64],
    pub macd_signal: &'a [f64],
    pub rsi: &'a [f64],
}

/// One boolean column per pattern, parallel to the base series.
#[derive(Debug, Clone)]
pub struct PatternColumns {
    pub bull_engulf: Vec<bool>,
    pub hammer: Vec<bool>,
    pub hammer_confirm: Vec<bool>,
    pub morning_star: Vec<bool>,
    pub bull_breakout: Vec<bool>,
    pub bull_cons_breakout: Vec<bool>,
    pub bull_sess_break: Vec<bool>,
    pub bull_shift: Vec<bool>,
    pub bear_shift: Vec<bool>,
    pub longs_blocked: Vec<bool>,
}

pub fn compute_patterns(inp: &PatternInputs<'_>, cfg: &PatternParams) -> PatternColumns {
    let bars = inp.bars;
    let n = bars.len();

    // ── Candle metrics ──
    let body: Vec<f64> = bars.iter().map(|b| (b.close - b.open).abs()).collect();
    let avg_body = rolling_mean_min1(&body, AVG_BODY_WINDOW);
    let upper_wick: Vec<f64> = bars.iter().map(|b| b.high - b.close.max(b.open)).collect();
    let lower_wick: Vec<f64> = bars.iter().map(|b| b.close.min(b.open) - b.low).collect();
    let green: Vec<bool> = bars.iter().map(|b| b.close > b.open).collect();

    let mut cols = PatternColumns {
        bull_engulf: vec![false; n],
        hammer: vec![false; n],
        hammer_confirm: vec![false; n],
        morning_star: vec![false; n],
        bull_breakout: vec![false; n],
        bull_cons_breakout: vec![false; n],
        bull_sess_break: vec![false; n],
        bull_shift: vec![false; n],
        bear_shift: vec![false; n],
        longs_blocked: vec![false; n],
    };

    // ── Hammer (pin bar) ──
    for i in 0..n {
        cols.hammer[i] = body[i] > 0.0
            && lower_wick[i] >= body[i] * cfg.pin_bar_ratio
            && upper_wick[i] < body[i] * 0.5;
    }

    // ── Bullish engulfing / confirmed hammer ──
    for i in 1..n {
        cols.bull_engulf[i] = green[i]
            && !green[i - 1]
            && bars[i].close > bars[i - 1].open
            && bars[i].open < bars[i - 1].close
            && body[i] > 0.0;

        cols.hammer_confirm[i] = cols.hammer[i - 1] && green[i] && inp.vol_above[i];
    }

    // ── Morning star (3-candle reversal) ──
    for i in 2..n {
        cols.morning_star[i] = !green[i - 2]
            && body[i - 2] > avg_body[i] * 0.8
            && body[i - 1] < avg_body[i] * 0.4
            && green[i]
            && bars[i].close > (bars[i - 2].open + bars[i - 2].close) / 2.0
            && body[i] > avg_body[i] * 0.6;
    }

    // ── N-bar-high breakout with volume confirmation ──
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let highest_n = rolling_max_min1(&highs, cfg.breakout_lookback);
    for i in 1..n {
        let broke = bars[i].close > highest_n[i - 1];
        cols.bull_breakout[i] = broke && inp.vol_ratio[i] >= cfg.breakout_vol_ratio;
    }

    // ── Consolidation-then-expansion breakout ──
    let small_body: Vec<bool> = (0..n).map(|i| body[i] < avg_body[i] * 0.5).collect();
    let cons_high = rolling_max_min1(&highs, cfg.consolidation_bars + 1);
    for i in 1..n {
        // Consolidation is judged on the window ending at the previous bar;
        // the breakout bar itself is excluded from its own base.
        let start_prev = i.saturating_sub(cfg.consolidation_bars);
        let prev_consolidating =
            i >= cfg.consolidation_bars && small_body[start_prev..i].iter().all(|&s| s);

        cols.bull_cons_breakout[i] = prev_consolidating
            && body[i] > avg_body[i] * 1.5
            && bars[i].close > cons_high[i - 1]
            && green[i]
            && inp.vol_ratio[i] >= cfg.cons_breakout_vol_ratio;
    }

    // ── Prior-session-range breakout ──
    let prev_sess_high = previous_session_highs(bars, inp.sessions);
    for i in 0..n {
        cols.bull_sess_break[i] = !prev_sess_high[i].is_nan()
            && bars[i].close > prev_sess_high[i]
            && green[i]
            && inp.vol_above[i]
            && (inp.macd_line[i] > inp.macd_signal[i] || inp.rsi[i] > 50.0);
    }

    // ── Momentum shift candles and the blocking window ──
    for i in 0..n {
        let threshold = bars[i].close * cfg.shift_body_pct / 100.0;
        let big = body[i] >= threshold && inp.vol_spike[i];
        cols.bull_shift[i] = big && green[i];
        cols.bear_shift[i] = big && !green[i];
    }
    for i in 0..n {
        // Blocked when any of the previous `shift_block_bars` bars was a
        // bearish shift; the shift bar itself is not in its own window.
        for k in 1..=cfg.shift_block_bars {
            if k <= i && cols.bear_shift[i - k] {
                cols.longs_blocked[i] = true;
                break;
            }
        }
    }

    cols
}

/// High of the most recently *completed* tracked session, per bar.
///
/// Maintenance, Closed, and After-Hours bars neither open a new tracked
/// session nor extend the current one; the running range freezes across
/// them.
fn previous_session_highs(bars: &[Bar], sessions: &[Session]) -> Vec<f64> {
    let n = bars.len();
    let mut out = vec![f64::NAN; n];

    let mut current: Option<Session> = None;
    let mut running_high = f64::NAN;
    let mut last_high = f64::NAN;

    for i in 0..n {
        let s = sessions[i];
        let tracked = !matches!(s, Session::Maintenance | Session::Closed | Session::AfterHours);

        if current != Some(s) && tracked {
            if !running_high.is_nan() {
                last_high = running_high;
            }
            current = Some(s);
            running_high = bars[i].high;
        } else if current == Some(s) {
            running_high = if running_high.is_nan() {
                bars[i].high
            } else {
                running_high.max(bars[i].high)
            };
        }

        out[i] = last_high;
    }

    out
}
