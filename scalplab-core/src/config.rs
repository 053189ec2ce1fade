//! Immutable engine configuration.
//!
//! Every magic number lives here. A config value is constructed once at
//! process start and passed by reference into each stage — there is no
//! module-level mutable state, so independent engine instances (e.g. a
//! parameter sweep) cannot interfere with each other.
//!
//! The defaults reproduce the validated reference parameter set. The scoring
//! weight table in particular is a contract, not a tuning surface: the
//! historical trade record depends on the exact score distribution it
//! produces.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("contract count must be an even number >= 2 to support the partial exit (got {0})")]
    OddContracts(u32),
    #[error("warm-up must cover the longest indicator window ({required} bars, got {got})")]
    WarmupTooShort { required: usize, got: usize },
}

/// Futures contract specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractSpec {
    /// Dollars per index point (NQ = $20).
    pub point_value: f64,
    pub tick_size: f64,
}

impl ContractSpec {
    pub fn tick_value(&self) -> f64 {
        self.tick_size * self.point_value
    }
}

impl Default for ContractSpec {
    fn default() -> Self {
        Self { point_value: 20.0, tick_size: 0.25 }
    }
}

/// Base-interval indicator windows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    pub ema_long: usize,
    pub rsi_len: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub adx_len: usize,
    pub atr_len: usize,
    pub st_period: usize,
    pub st_multiplier: f64,
    pub vol_sma_len: usize,
    /// Volume ratio at or above this counts as above-average.
    pub vol_above_ratio: f64,
    /// Volume ratio at or above this counts as a spike.
    pub vol_spike_ratio: f64,
    /// Volume ratio below this counts as weak.
    pub vol_weak_ratio: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            ema_trend: 50,
            ema_long: 200,
            rsi_len: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            adx_len: 14,
            atr_len: 14,
            st_period: 10,
            st_multiplier: 3.0,
            vol_sma_len: 20,
            vol_above_ratio: 1.2,
            vol_spike_ratio: 2.0,
            vol_weak_ratio: 0.8,
        }
    }
}

/// Pattern and key-level detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternParams {
    /// Lower wick must be at least this multiple of the body for a hammer.
    pub pin_bar_ratio: f64,
    /// Consecutive small-body bars that define a consolidation.
    pub consolidation_bars: usize,
    /// Lookback for the N-bar-high breakout.
    pub breakout_lookback: usize,
    /// Volume ratio required to confirm the N-bar-high breakout.
    pub breakout_vol_ratio: f64,
    /// Volume ratio required to confirm the consolidation breakout.
    pub cons_breakout_vol_ratio: f64,
    /// Shift candle body as a percentage of the close.
    pub shift_body_pct: f64,
    /// Bars blocked for longs after a bearish shift candle.
    pub shift_block_bars: usize,
    pub fib_lookback: usize,
    /// Round-number grid interval in points.
    pub round_interval: f64,
    /// Rolling-low lookback for the technical stop.
    pub pivot_lookback: usize,
    /// Key-level proximity radius as a fraction of ATR.
    pub proximity_atr_frac: f64,
}

impl Default for PatternParams {
    fn default() -> Self {
        Self {
            pin_bar_ratio: 2.5,
            consolidation_bars: 5,
            breakout_lookback: 20,
            breakout_vol_ratio: 1.5,
            cons_breakout_vol_ratio: 1.3,
            shift_body_pct: 0.5,
            shift_block_bars: 4,
            fib_lookback: 30,
            round_interval: 100.0,
            pivot_lookback: 10,
            proximity_atr_frac: 0.4,
        }
    }
}

/// Exchange clock and driver time rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionParams {
    pub exchange_tz: Tz,
    /// Hour at which the session VWAP (and the Globex trading day) resets.
    pub vwap_anchor_hour: u32,
    pub eod_close_hour: u32,
    pub eod_close_minute: u32,
    /// The validated system does not force-close at end of day.
    pub use_eod_close: bool,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            exchange_tz: chrono_tz::America::New_York,
            vwap_anchor_hour: 18,
            eod_close_hour: 16,
            eod_close_minute: 45,
            use_eod_close: false,
        }
    }
}

/// Take-profit sizing for the first (partial) target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TakeProfitMode {
    /// TP1 = entry + stop distance × ratio (validated default).
    RiskReward { ratio: f64 },
    /// Fixed TP1 in points, with the stop capped so R:R stays >= min_rr.
    Fixed { points: f64, min_rr: f64 },
}

impl Default for TakeProfitMode {
    fn default() -> Self {
        TakeProfitMode::RiskReward { ratio: 1.5 }
    }
}

/// Entry sizing, stop capping, and the cost model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskParams {
    pub contracts: u32,
    /// Stop distance is capped at this many points from the entry.
    pub max_stop_points: f64,
    /// Round-trip commission per contract, charged as half-commission fills.
    pub commission_per_contract: f64,
    pub slippage_ticks: u32,
    pub initial_capital: f64,
    pub take_profit: TakeProfitMode,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            contracts: 2,
            max_stop_points: 40.0,
            commission_per_contract: 4.50,
            slippage_ticks: 1,
            initial_capital: 100_000.0,
            take_profit: TakeProfitMode::default(),
        }
    }
}

/// Three-stage trailing stop parameters (multiples of the stop distance).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrailingParams {
    /// Unrealized profit (× stop distance) that advances stage 1 → 2.
    pub stage2_trigger: f64,
    /// Trail floor after stage 2, as a multiple of the stop distance.
    pub stage2_lock: f64,
    /// Unrealized profit (× stop distance) that advances stage 2 → 3.
    pub stage3_trigger: f64,
    /// ATR multiple for the stage-3 trail.
    pub atr_mult: f64,
    /// Let the supertrend line tighten the stage-3 trail when bullish.
    pub use_supertrend: bool,
}

impl Default for TrailingParams {
    fn default() -> Self {
        Self {
            stage2_trigger: 1.5,
            stage2_lock: 0.5,
            stage3_trigger: 2.0,
            atr_mult: 2.0,
            use_supertrend: true,
        }
    }
}

/// Signal gate floors and the cooldown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateParams {
    pub cooldown_bars: usize,
    /// Price move (percent of last entry) that releases the cooldown early.
    pub min_price_move_pct: f64,
    pub wednesday_floor: f64,
    pub thursday_floor: f64,
    pub europe_floor: f64,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            cooldown_bars: 8,
            min_price_move_pct: 0.25,
            wednesday_floor: 9.0,
            thursday_floor: 9.0,
            europe_floor: 8.5,
        }
    }
}

/// Volatility-percentile threshold adjustment window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolPercentileParams {
    pub lookback_days: usize,
    pub bars_per_day: usize,
    /// Minimum samples in the window before the rank is considered valid.
    pub min_samples: usize,
}

impl VolPercentileParams {
    pub fn window(&self) -> usize {
        self.lookback_days * self.bars_per_day
    }
}

impl Default for VolPercentileParams {
    fn default() -> Self {
        Self { lookback_days: 252, bars_per_day: 26, min_samples: 100 }
    }
}

/// The composite-score weight table.
///
/// These values are data copied from the validated reference configuration.
/// Note the consolidation breakout contributes twice — once in the structure
/// group and once in the events group. That duplication is part of the
/// validated score distribution and is preserved as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreWeights {
    // Trend (max 3.5)
    pub trend_primary: f64,
    pub trend_h1: f64,
    pub trend_h4: f64,
    pub trend_supertrend: f64,
    pub trend_daily: f64,
    // Volume (max 2.5)
    pub volume_spike: f64,
    pub volume_above: f64,
    pub volume_weak: f64,
    // Structure (max 2.0)
    pub structure_breakout: f64,
    pub structure_support: f64,
    pub structure_cons_breakout: f64,
    pub structure_daily_level: f64,
    // Momentum (max 1.5)
    pub momentum_rsi_band: f64,
    pub momentum_macd: f64,
    pub momentum_adx: f64,
    // Events
    pub event_hammer_confirm: f64,
    pub event_morning_star: f64,
    pub event_engulfing: f64,
    pub event_cons_breakout: f64,
    pub event_shift: f64,
    pub event_flip: f64,
    pub event_session_breakout: f64,
    // Session bonus
    pub session_us_bonus: f64,
    pub session_asia_bonus: f64,
    // Penalties (signed, added as-is)
    pub penalty_ranging: f64,
    pub penalty_rsi_extreme: f64,
    pub penalty_blocked: f64,
    pub penalty_st_bearish: f64,
    pub penalty_resistance: f64,
    pub penalty_vol_declining: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            trend_primary: 1.0,
            trend_h1: 0.8,
            trend_h4: 0.8,
            trend_supertrend: 0.6,
            trend_daily: 0.3,
            volume_spike: 2.5,
            volume_above: 1.5,
            volume_weak: -0.5,
            structure_breakout: 0.8,
            structure_support: 0.4,
            structure_cons_breakout: 0.4,
            structure_daily_level: 0.4,
            momentum_rsi_band: 0.5,
            momentum_macd: 0.5,
            momentum_adx: 0.5,
            event_hammer_confirm: 0.7,
            event_morning_star: 0.7,
            event_engulfing: 0.5,
            event_cons_breakout: 0.4,
            event_shift: 0.4,
            event_flip: 0.5,
            event_session_breakout: 0.5,
            session_us_bonus: 0.3,
            session_asia_bonus: -0.3,
            penalty_ranging: -0.5,
            penalty_rsi_extreme: -0.5,
            penalty_blocked: -1.5,
            penalty_st_bearish: -0.5,
            penalty_resistance: -0.3,
            penalty_vol_declining: -0.3,
        }
    }
}

/// Top-level engine configuration. Construct once, share by reference.
///
/// Deserialization fills omitted tables with the validated defaults, so a
/// TOML run file only needs its overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScalperConfig {
    /// Bars to mark not-ready before scoring is trusted (EMA-200 settling).
    pub warmup_bars: usize,
    pub contract: ContractSpec,
    pub indicators: IndicatorParams,
    pub patterns: PatternParams,
    pub session: SessionParams,
    pub risk: RiskParams,
    pub trailing: TrailingParams,
    pub gate: GateParams,
    pub volatility: VolPercentileParams,
    pub weights: ScoreWeights,
}

impl Default for ScalperConfig {
    fn default() -> Self {
        Self {
            warmup_bars: 300,
            contract: ContractSpec::default(),
            indicators: IndicatorParams::default(),
            patterns: PatternParams::default(),
            session: SessionParams::default(),
            risk: RiskParams::default(),
            trailing: TrailingParams::default(),
            gate: GateParams::default(),
            volatility: VolPercentileParams::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl ScalperConfig {
    /// The validated reference parameter set (same as `Default`).
    pub fn validated() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositive { field, value })
            }
        }

        positive("contract.point_value", self.contract.point_value)?;
        positive("contract.tick_size", self.contract.tick_size)?;
        positive("risk.max_stop_points", self.risk.max_stop_points)?;
        positive("risk.initial_capital", self.risk.initial_capital)?;
        match self.risk.take_profit {
            TakeProfitMode::RiskReward { ratio } => positive("risk.take_profit.ratio", ratio)?,
            TakeProfitMode::Fixed { points, min_rr } => {
                positive("risk.take_profit.points", points)?;
                positive("risk.take_profit.min_rr", min_rr)?;
            }
        }
        if self.risk.contracts < 2 || self.risk.contracts % 2 != 0 {
            return Err(ConfigError::OddContracts(self.risk.contracts));
        }
        if self.warmup_bars < self.indicators.ema_long {
            return Err(ConfigError::WarmupTooShort {
                required: self.indicators.ema_long,
                got: self.warmup_bars,
            });
        }
        Ok(())
    }

    /// Content-addressed fingerprint: identical configs hash to the same id,
    /// so a run is reproducible and cacheable by id.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("config serialization is infallible");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
