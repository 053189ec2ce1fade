//! FeatureBar — a Bar enriched with every derived per-bar field.
//!
//! One FeatureBar per Bar, computed once by the feature pipeline and never
//! mutated afterwards. A value of NaN (floats) together with `ready = false`
//! marks warm-up bars whose derived fields must not be consumed; this is a
//! distinct state from a flag that is genuinely `false`.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::session::Session;

/// A base-interval bar plus all indicator, alignment, pattern, and scoring
/// fields the signal gate and lifecycle machine consume.
#[derive(Debug, Clone)]
pub struct FeatureBar {
    // ── Raw bar ──
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,

    // ── Exchange clock ──
    pub hour: u32,
    pub minute: u32,
    pub weekday: Weekday,
    pub session: Session,

    // ── Trend ──
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: f64,
    pub ema_long: f64,
    /// EMA-50 rising vs. the prior bar.
    pub ema_slope_bull: bool,
    /// close > EMA-50 and EMA-50 > EMA-200 on the base interval.
    pub primary_bull: bool,

    // ── Oscillators ──
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,
    pub atr: f64,

    // ── Trend-flip (Supertrend) ──
    pub st_line: f64,
    pub st_bullish: bool,
    /// Direction changed short → long on this exact bar.
    pub st_flip_bull: bool,

    // ── Volume ──
    pub vwap: f64,
    pub vol_ratio: f64,
    pub vol_above: bool,
    pub vol_spike: bool,
    pub vol_weak: bool,
    pub vol_declining: bool,

    // ── Multi-timeframe alignment (lag-merged) ──
    pub mtf1h_bullish: bool,
    pub mtf4h_bullish: bool,
    pub mtf_strong_bull: bool,
    pub daily_bullish: bool,

    // ── Patterns ──
    pub bull_engulf: bool,
    pub hammer: bool,
    pub hammer_confirm: bool,
    pub morning_star: bool,
    pub bull_breakout: bool,
    pub bull_cons_breakout: bool,
    pub bull_sess_break: bool,
    pub bull_shift: bool,
    pub bear_shift: bool,
    /// Inside the blocking window opened by a recent bearish shift candle.
    pub longs_blocked: bool,

    // ── Key-level proximity ──
    pub near_support: bool,
    pub near_resist: bool,
    pub near_daily_level: bool,

    // ── Scoring ──
    pub score: f64,
    pub confirmations: u8,
    pub base_thresh: f64,
    pub session_penalty: f64,
    pub vol_adjust: f64,
    pub effective_thresh: f64,
    pub tech_stop: f64,

    /// False while inside the warm-up window; the driver must skip the bar.
    pub ready: bool,
}

impl Default for FeatureBar {
    fn default() -> Self {
        Self {
            ts: DateTime::<Utc>::UNIX_EPOCH,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: 0,
            hour: 0,
            minute: 0,
            weekday: Weekday::Mon,
            session: Session::Closed,
            ema_fast: f64::NAN,
            ema_slow: f64::NAN,
            ema_trend: f64::NAN,
            ema_long: f64::NAN,
            ema_slope_bull: false,
            primary_bull: false,
            rsi: f64::NAN,
            macd_line: f64::NAN,
            macd_signal: f64::NAN,
            macd_hist: f64::NAN,
            adx: f64::NAN,
            di_plus: f64::NAN,
            di_minus: f64::NAN,
            atr: f64::NAN,
            st_line: f64::NAN,
            st_bullish: false,
            st_flip_bull: false,
            vwap: f64::NAN,
            vol_ratio: f64::NAN,
            vol_above: false,
            vol_spike: false,
            vol_weak: false,
            vol_declining: false,
            mtf1h_bullish: false,
            mtf4h_bullish: false,
            mtf_strong_bull: false,
            daily_bullish: false,
            bull_engulf: false,
            hammer: false,
            hammer_confirm: false,
            morning_star: false,
            bull_breakout: false,
            bull_cons_breakout: false,
            bull_sess_break: false,
            bull_shift: false,
            bear_shift: false,
            longs_blocked: false,
            near_support: false,
            near_resist: false,
            near_daily_level: false,
            score: f64::NAN,
            confirmations: 0,
            base_thresh: f64::NAN,
            session_penalty: f64::NAN,
            vol_adjust: 0.0,
            effective_thresh: f64::NAN,
            tech_stop: f64::NAN,
            ready: false,
        }
    }
}

impl FeatureBar {
    /// Cooldown override: a bullish shift candle or a flip-to-bull event on
    /// this bar bypasses the bar-count/price-move cooldown.
    pub fn cooldown_override(&self) -> bool {
        self.bull_shift || self.st_flip_bull
    }

    /// Compact serializable view for external logging/alerting.
    pub fn signal_record(&self) -> SignalRecord {
        SignalRecord {
            ts: self.ts,
            session: self.session,
            close: self.close,
            score: self.score,
            confirmations: self.confirmations,
            effective_thresh: self.effective_thresh,
            tech_stop: self.tech_stop,
            st_bullish: self.st_bullish,
            mtf1h_bullish: self.mtf1h_bullish,
            mtf4h_bullish: self.mtf4h_bullish,
            vol_spike: self.vol_spike,
            longs_blocked: self.longs_blocked,
            ready: self.ready,
        }
    }
}

/// Per-bar signal record exposed to external logging/alerting collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    pub ts: DateTime<Utc>,
    pub session: Session,
    pub close: f64,
    pub score: f64,
    pub confirmations: u8,
    pub effective_thresh: f64,
    pub tech_stop: f64,
    pub st_bullish: bool,
    pub mtf1h_bullish: bool,
    pub mtf4h_bullish: bool,
    pub vol_spike: bool,
    pub longs_blocked: bool,
    pub ready: bool,
}
