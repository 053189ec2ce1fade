//! Position and the three-stage trailing stop for the runner contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TrailingParams;

use super::session::Session;

/// Trailing-stop stage for the runner contract.
///
/// Stages only advance forward:
/// 1. `Breakeven` — trail parked at the entry price.
/// 2. `ProfitLock` — profit reached 1.5× the stop distance; trail lifted to
///    entry + 0.5× stop distance.
/// 3. `AtrTrail` — profit reached 2.0× the stop distance; trail follows
///    max(close − ATR × mult, supertrend line, entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrailStage {
    Breakeven,
    ProfitLock,
    AtrTrail,
}

impl TrailStage {
    pub fn number(self) -> u8 {
        match self {
            TrailStage::Breakeven => 1,
            TrailStage::ProfitLock => 2,
            TrailStage::AtrTrail => 3,
        }
    }
}

/// Three-stage trailing stop state, created when the partial exit fires.
///
/// The trail price only ratchets toward profit, never back — the same
/// invariant for every stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailingStop {
    pub entry_price: f64,
    pub stop_distance: f64,
    pub trail: f64,
    pub stage: TrailStage,
}

impl TrailingStop {
    /// Stage 1 starts with the trail at breakeven.
    pub fn new(entry_price: f64, stop_distance: f64) -> Self {
        Self {
            entry_price,
            stop_distance,
            trail: entry_price,
            stage: TrailStage::Breakeven,
        }
    }

    /// Advance the trail from the current bar. Called once per bar while the
    /// runner is open. Stage transitions may cascade within a single bar
    /// (1 → 2 → 3 on a large enough move).
    pub fn update(&mut self, close: f64, atr: f64, st_line: f64, st_bullish: bool, params: &TrailingParams) {
        let profit = close - self.entry_price;

        if self.stage == TrailStage::Breakeven && profit >= self.stop_distance * params.stage2_trigger {
            self.stage = TrailStage::ProfitLock;
            let lock = self.entry_price + self.stop_distance * params.stage2_lock;
            self.trail = self.trail.max(lock);
        }

        if self.stage == TrailStage::ProfitLock && profit >= self.stop_distance * params.stage3_trigger {
            self.stage = TrailStage::AtrTrail;
        }

        if self.stage == TrailStage::AtrTrail && !atr.is_nan() {
            let atr_trail = close - atr * params.atr_mult;
            let st_trail = if params.use_supertrend && st_bullish && !st_line.is_nan() {
                st_line
            } else {
                atr_trail
            };
            let proposed = atr_trail.max(st_trail).max(self.entry_price);
            self.trail = self.trail.max(proposed);
        }
    }

    /// Whether the runner's trailing stop was touched by this bar.
    pub fn is_stopped(&self, bar_low: f64) -> bool {
        bar_low <= self.trail
    }
}

/// The single open long position. Exactly zero or one exists at any time;
/// ownership lives with the engine and is never shared across stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub entry_bar: usize,
    pub entry_ts: DateTime<Utc>,
    pub entry_price: f64,
    pub entry_score: f64,
    pub entry_session: Session,
    pub stop_loss: f64,
    pub stop_distance: f64,
    pub take_profit: f64,
    pub contracts: u32,
    /// Present once the partial exit has fired — its existence IS the
    /// "partial done" state, so the two can never disagree.
    pub trailing: Option<TrailingStop>,
    /// Highest high observed since entry.
    pub high_water: f64,
}

impl Position {
    pub fn partial_done(&self) -> bool {
        self.trailing.is_some()
    }

    pub fn unrealized_points(&self, price: f64) -> f64 {
        price - self.entry_price
    }

    /// Serializable snapshot for external presentation layers.
    pub fn snapshot(&self, last_close: f64) -> PositionSnapshot {
        PositionSnapshot {
            entry_ts: self.entry_ts,
            entry_price: self.entry_price,
            entry_score: self.entry_score,
            entry_session: self.entry_session,
            stop_loss: self.stop_loss,
            stop_distance: self.stop_distance,
            take_profit: self.take_profit,
            contracts: self.contracts,
            partial_done: self.partial_done(),
            trail: self.trailing.as_ref().map(|t| t.trail),
            trail_stage: self.trailing.as_ref().map(|t| t.stage.number()),
            high_water: self.high_water,
            unrealized_points: self.unrealized_points(last_close),
        }
    }
}

/// Point-in-time view of the open position for external presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub entry_ts: DateTime<Utc>,
    pub entry_price: f64,
    pub entry_score: f64,
    pub entry_session: Session,
    pub stop_loss: f64,
    pub stop_distance: f64,
    pub take_profit: f64,
    pub contracts: u32,
    pub partial_done: bool,
    pub trail: Option<f64>,
    pub trail_stage: Option<u8>,
    pub high_water: f64,
    pub unrealized_points: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TrailingParams {
        TrailingParams::default()
    }

    #[test]
    fn trail_starts_at_breakeven() {
        let trail = TrailingStop::new(17000.0, 30.0);
        assert_eq!(trail.stage, TrailStage::Breakeven);
        assert_eq!(trail.trail, 17000.0);
    }

    #[test]
    fn stage2_lifts_trail_to_half_distance() {
        let mut trail = TrailingStop::new(17000.0, 30.0);
        // profit 45 = 1.5 × 30 → stage 2, trail = entry + 15
        trail.update(17045.0, 10.0, f64::NAN, false, &params());
        assert_eq!(trail.stage, TrailStage::ProfitLock);
        assert_eq!(trail.trail, 17015.0);
    }

    #[test]
    fn stage3_follows_atr_and_supertrend() {
        let mut trail = TrailingStop::new(17000.0, 30.0);
        // profit 60 = 2.0 × 30 → cascades 1 → 2 → 3 on one bar
        trail.update(17060.0, 10.0, 17048.0, true, &params());
        assert_eq!(trail.stage, TrailStage::AtrTrail);
        // atr trail = 17060 - 20 = 17040; supertrend 17048 wins
        assert_eq!(trail.trail, 17048.0);
    }

    #[test]
    fn stage3_never_trails_below_entry() {
        let mut trail = TrailingStop::new(17000.0, 30.0);
        trail.update(17060.0, 40.0, f64::NAN, false, &params());
        assert_eq!(trail.stage, TrailStage::AtrTrail);
        // atr trail = 17060 - 80 = 16980 < entry → floored at entry
        assert_eq!(trail.trail, 17000.0);
    }

    #[test]
    fn trail_never_regresses() {
        let mut trail = TrailingStop::new(17000.0, 30.0);
        trail.update(17060.0, 10.0, 17048.0, true, &params());
        assert_eq!(trail.trail, 17048.0);
        // Price falls back, proposed trail would be lower — ratchet holds.
        trail.update(17020.0, 10.0, 17005.0, true, &params());
        assert_eq!(trail.trail, 17048.0);
        assert_eq!(trail.stage, TrailStage::AtrTrail);
    }

    #[test]
    fn stage_never_goes_backwards() {
        let mut trail = TrailingStop::new(17000.0, 30.0);
        trail.update(17045.0, 10.0, f64::NAN, false, &params());
        assert_eq!(trail.stage, TrailStage::ProfitLock);
        trail.update(17001.0, 10.0, f64::NAN, false, &params());
        assert_eq!(trail.stage, TrailStage::ProfitLock);
    }

    #[test]
    fn nan_atr_is_skipped_at_stage3() {
        let mut trail = TrailingStop::new(17000.0, 30.0);
        trail.update(17060.0, f64::NAN, f64::NAN, false, &params());
        assert_eq!(trail.stage, TrailStage::AtrTrail);
        // No ATR → trail untouched this bar (still breakeven level).
        assert_eq!(trail.trail, 17000.0);
    }

    #[test]
    fn stop_detection() {
        let trail = TrailingStop::new(17000.0, 30.0);
        assert!(trail.is_stopped(16999.0));
        assert!(trail.is_stopped(17000.0));
        assert!(!trail.is_stopped(17001.0));
    }
}
