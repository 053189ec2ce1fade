//! Signal gate — turns a scored bar into an entry decision.
//!
//! The gate is a pure function of (FeatureBar, bar index, CooldownState,
//! gate parameters). It cannot observe the open position: the driver only
//! consults it while flat, and the signature gives it no way to peek. See
//! the contract test in `lib.rs`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::config::GateParams;
use crate::domain::FeatureBar;

/// Cooldown between consecutive entries, tracked per engine instance.
///
/// The cooldown releases when enough bars have elapsed, when price has moved
/// far enough from the last entry, or when the current bar carries an
/// override event (bullish shift candle or flip-to-bull).
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    last_entry_bar: Option<usize>,
    last_entry_price: f64,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call exactly once per accepted entry, before the next bar arrives.
    pub fn record_entry(&mut self, bar_index: usize, entry_price: f64) {
        self.last_entry_bar = Some(bar_index);
        self.last_entry_price = entry_price;
    }

    pub fn is_ready(&self, bar_index: usize, close: f64, is_override: bool, gate: &GateParams) -> bool {
        if is_override {
            return true;
        }
        let last_bar = match self.last_entry_bar {
            Some(b) => b,
            None => return true,
        };
        if bar_index.saturating_sub(last_bar) >= gate.cooldown_bars {
            return true;
        }
        if self.last_entry_price > 0.0 {
            let pct_move = (close - self.last_entry_price).abs() / self.last_entry_price * 100.0;
            if pct_move >= gate.min_price_move_pct {
                return true;
            }
        }
        false
    }
}

/// Why a bar did not become an entry. Exposed so drivers can trace the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Warm-up fields unavailable; distinct from any real rejection.
    NotReady,
    SessionClosed,
    LongsBlocked,
    TrendSlope,
    BelowThreshold,
    WednesdayFloor,
    ThursdayFloor,
    EuropeFloor,
    Cooldown,
}

/// Outcome of gating a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Enter,
    Reject(RejectReason),
}

/// Evaluate the entry rules for one bar. Checks run in the validated order;
/// the first failing rule names the rejection.
pub fn evaluate(
    fb: &FeatureBar,
    bar_index: usize,
    cooldown: &CooldownState,
    gate: &GateParams,
) -> GateDecision {
    use GateDecision::Reject;

    if !fb.ready || fb.score.is_nan() || fb.effective_thresh.is_nan() {
        return Reject(RejectReason::NotReady);
    }
    if !fb.session.is_tradeable() {
        return Reject(RejectReason::SessionClosed);
    }
    if fb.longs_blocked {
        return Reject(RejectReason::LongsBlocked);
    }
    if !fb.ema_slope_bull {
        return Reject(RejectReason::TrendSlope);
    }
    if fb.score < fb.effective_thresh {
        return Reject(RejectReason::BelowThreshold);
    }
    if fb.weekday == Weekday::Wed && fb.score < gate.wednesday_floor {
        return Reject(RejectReason::WednesdayFloor);
    }
    if fb.weekday == Weekday::Thu && fb.score < gate.thursday_floor {
        return Reject(RejectReason::ThursdayFloor);
    }
    if fb.session == crate::domain::Session::Europe && fb.score < gate.europe_floor {
        return Reject(RejectReason::EuropeFloor);
    }
    if !cooldown.is_ready(bar_index, fb.close, fb.cooldown_override(), gate) {
        return Reject(RejectReason::Cooldown);
    }

    GateDecision::Enter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Session;

    fn gate() -> GateParams {
        GateParams::default()
    }

    /// A bar that clears every rule on a Friday US session.
    fn passing_bar() -> FeatureBar {
        FeatureBar {
            ready: true,
            score: 9.5,
            effective_thresh: 8.0,
            ema_slope_bull: true,
            session: Session::Us,
            weekday: Weekday::Fri,
            close: 17000.0,
            ..FeatureBar::default()
        }
    }

    #[test]
    fn clean_bar_enters() {
        let fb = passing_bar();
        let cd = CooldownState::new();
        assert_eq!(evaluate(&fb, 10, &cd, &gate()), GateDecision::Enter);
    }

    #[test]
    fn not_ready_is_reported_first() {
        let fb = FeatureBar { ready: false, ..passing_bar() };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::NotReady)
        );
    }

    #[test]
    fn maintenance_session_rejected() {
        let fb = FeatureBar { session: Session::Maintenance, ..passing_bar() };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::SessionClosed)
        );
    }

    #[test]
    fn blocking_window_rejects() {
        let fb = FeatureBar { longs_blocked: true, ..passing_bar() };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::LongsBlocked)
        );
    }

    #[test]
    fn falling_trend_slope_rejects() {
        let fb = FeatureBar { ema_slope_bull: false, ..passing_bar() };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::TrendSlope)
        );
    }

    #[test]
    fn score_below_threshold_rejects() {
        let fb = FeatureBar { score: 7.9, ..passing_bar() };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::BelowThreshold)
        );
    }

    #[test]
    fn wednesday_floor_applies() {
        let fb = FeatureBar { weekday: Weekday::Wed, score: 8.9, ..passing_bar() };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::WednesdayFloor)
        );

        let fb = FeatureBar { weekday: Weekday::Wed, score: 9.0, ..passing_bar() };
        assert_eq!(evaluate(&fb, 10, &cd, &gate()), GateDecision::Enter);
    }

    #[test]
    fn thursday_floor_applies() {
        let fb = FeatureBar { weekday: Weekday::Thu, score: 8.9, ..passing_bar() };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::ThursdayFloor)
        );
    }

    #[test]
    fn europe_floor_applies() {
        let fb = FeatureBar {
            session: Session::Europe,
            score: 8.4,
            effective_thresh: 8.0,
            ..passing_bar()
        };
        let cd = CooldownState::new();
        assert_eq!(
            evaluate(&fb, 10, &cd, &gate()),
            GateDecision::Reject(RejectReason::EuropeFloor)
        );

        let fb = FeatureBar { score: 8.5, ..fb };
        assert_eq!(evaluate(&fb, 10, &cd, &gate()), GateDecision::Enter);
    }

    #[test]
    fn cooldown_counts_bars() {
        let fb = passing_bar();
        let mut cd = CooldownState::new();
        cd.record_entry(10, 17000.0);

        // 7 bars later, price unchanged: still cooling down.
        assert_eq!(
            evaluate(&fb, 17, &cd, &gate()),
            GateDecision::Reject(RejectReason::Cooldown)
        );
        // 8 bars later: released.
        assert_eq!(evaluate(&fb, 18, &cd, &gate()), GateDecision::Enter);
    }

    #[test]
    fn cooldown_releases_on_price_move() {
        let mut cd = CooldownState::new();
        cd.record_entry(10, 17000.0);

        // 0.25% of 17000 = 42.5 points.
        let fb = FeatureBar { close: 17043.0, ..passing_bar() };
        assert_eq!(evaluate(&fb, 12, &cd, &gate()), GateDecision::Enter);

        let fb = FeatureBar { close: 17040.0, ..passing_bar() };
        assert_eq!(
            evaluate(&fb, 12, &cd, &gate()),
            GateDecision::Reject(RejectReason::Cooldown)
        );
    }

    #[test]
    fn shift_or_flip_overrides_cooldown() {
        let mut cd = CooldownState::new();
        cd.record_entry(10, 17000.0);

        let fb = FeatureBar { bull_shift: true, ..passing_bar() };
        assert_eq!(evaluate(&fb, 11, &cd, &gate()), GateDecision::Enter);

        let fb = FeatureBar { st_flip_bull: true, ..passing_bar() };
        assert_eq!(evaluate(&fb, 11, &cd, &gate()), GateDecision::Enter);
    }

    #[test]
    fn fresh_state_is_ready() {
        let cd = CooldownState::new();
        assert!(cd.is_ready(0, 17000.0, false, &gate()));
    }
}
