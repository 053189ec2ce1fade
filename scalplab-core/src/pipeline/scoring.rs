//! Composite score, confirmation-derived threshold, and the technical stop.
//!
//! The weight application order follows the reference system exactly,
//! including the consolidation breakout contributing in both the structure
//! and events groups. NaN oscillator values fail every comparison, so a
//! warm-up bar collects neither bonuses nor oscillator penalties.

use crate::config::ScoreWeights;
use crate::domain::{FeatureBar, Session};

/// Bounded composite long score for one bar. Always within [0, 10].
pub fn long_score(fb: &FeatureBar, w: &ScoreWeights) -> f64 {
    let mut score = 0.0;

    // === Trend (max 3.5) ===
    if fb.primary_bull {
        score += w.trend_primary;
    }
    if fb.mtf1h_bullish {
        score += w.trend_h1;
    }
    if fb.mtf4h_bullish {
        score += w.trend_h4;
    }
    if fb.st_bullish {
        score += w.trend_supertrend;
    }
    if fb.daily_bullish {
        score += w.trend_daily;
    }

    // === Volume (max 2.5) ===
    if fb.vol_spike {
        score += w.volume_spike;
    } else if fb.vol_above {
        score += w.volume_above;
    }
    if fb.vol_weak {
        score += w.volume_weak;
    }

    // === Structure (max 2.0) ===
    if fb.bull_breakout && fb.vol_above {
        score += w.structure_breakout;
    }
    if fb.near_support {
        score += w.structure_support;
    }
    if fb.bull_cons_breakout {
        score += w.structure_cons_breakout;
    }
    if fb.near_daily_level {
        score += w.structure_daily_level;
    }

    // === Momentum (max 1.5) ===
    if fb.rsi >= 35.0 && fb.rsi <= 65.0 {
        score += w.momentum_rsi_band;
    }
    if fb.macd_line > fb.macd_signal {
        score += w.momentum_macd;
    }
    if fb.adx > 20.0 && fb.di_plus > fb.di_minus {
        score += w.momentum_adx;
    }

    // === Events ===
    if fb.hammer_confirm {
        score += w.event_hammer_confirm;
    }
    if fb.morning_star {
        score += w.event_morning_star;
    }
    if fb.bull_engulf {
        score += w.event_engulfing;
    }
    if fb.bull_cons_breakout {
        // Counted a second time on top of the structure group.
        score += w.event_cons_breakout;
    }
    if fb.bull_shift {
        score += w.event_shift;
    }
    if fb.st_flip_bull {
        score += w.event_flip;
    }
    if fb.bull_sess_break {
        score += w.event_session_breakout;
    }

    // === Session bonus ===
    match fb.session {
        Session::Us => score += w.session_us_bonus,
        Session::Asia => score += w.session_asia_bonus,
        _ => {}
    }

    // === Penalties (negative weights) ===
    if fb.adx < 20.0 {
        score += w.penalty_ranging;
    }
    if fb.rsi > 75.0 || fb.rsi < 25.0 {
        score += w.penalty_rsi_extreme;
    }
    if fb.longs_blocked {
        score += w.penalty_blocked;
    }
    if !fb.st_bullish {
        score += w.penalty_st_bearish;
    }
    if fb.near_resist && !fb.bull_breakout {
        score += w.penalty_resistance;
    }
    if fb.vol_declining {
        score += w.penalty_vol_declining;
    }

    score.clamp(0.0, 10.0)
}

/// Confirmation count (0–4) feeding the dynamic base threshold.
///
/// Uses a stricter ADX bar (30, not the scoring 25/20 bands) and accepts
/// either MTF alignment flag.
pub fn confirmations(fb: &FeatureBar) -> u8 {
    let mut count = 0u8;
    if fb.st_bullish {
        count += 1;
    }
    if fb.adx > 30.0 && fb.di_plus > fb.di_minus {
        count += 1;
    }
    if fb.vol_above {
        count += 1;
    }
    if fb.mtf1h_bullish || fb.mtf4h_bullish {
        count += 1;
    }
    count
}

/// Base entry threshold from the confirmation count (fixed step function).
pub fn base_threshold(confirmations: u8) -> f64 {
    match confirmations {
        c if c >= 4 => 7.0,
        3 => 7.5,
        2 => 8.0,
        1 => 8.5,
        _ => 9.0,
    }
}

/// Session-specific threshold penalty. Asia is effectively blocked.
pub fn session_penalty(session: Session) -> f64 {
    match session {
        Session::Europe => 1.0,
        Session::Asia => 2.0,
        Session::Us => 1.0,
        _ => 1.0,
    }
}

/// Volatility-percentile threshold adjustment. NaN rank (not enough history)
/// contributes nothing.
pub fn volatility_adjustment(atr_percentile: f64) -> f64 {
    if atr_percentile.is_nan() {
        0.0
    } else if atr_percentile > 80.0 {
        0.5
    } else if atr_percentile > 65.0 {
        0.25
    } else if atr_percentile < 20.0 {
        -0.25
    } else {
        0.0
    }
}

/// Technical stop for a long entry at this bar's close.
///
/// The lesser of the rolling pivot low and (supertrend line when bullish,
/// else low − ATR), floored so the implied risk never exceeds
/// `max_stop_points`. NaN while the inputs are still warming up.
pub fn technical_stop(
    close: f64,
    pivot_low: f64,
    low: f64,
    atr: f64,
    st_bullish: bool,
    st_line: f64,
    max_stop_points: f64,
) -> f64 {
    let band = if st_bullish { st_line } else { low - atr };
    if pivot_low.is_nan() || band.is_nan() {
        return f64::NAN;
    }
    pivot_low.min(band).max(close - max_stop_points)
}
