//! Position lifecycle: entry sizing, partial take-profit, runner trailing,
//! and the cost model.
//!
//! Shared verbatim by the batch backtest and the tick-driven paper path —
//! there is exactly one implementation of these transitions.
//!
//! Intrabar ordering is worst-case: the stop is tested before the target on
//! the same bar.

use crate::config::{ContractSpec, RiskParams, ScalperConfig, TakeProfitMode};
use crate::domain::{ExitReason, FeatureBar, Position, TrailingStop};

/// Entry levels computed at signal time.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPlan {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub stop_distance: f64,
    pub take_profit: f64,
}

/// Compute entry levels for a long at the bar close, or None when the
/// technical stop is degenerate (at or above the entry price).
pub fn plan_entry(close: f64, tech_stop: f64, risk: &RiskParams) -> Option<EntryPlan> {
    if tech_stop.is_nan() {
        return None;
    }

    let mut stop_distance = close - tech_stop;
    if stop_distance <= 0.0 {
        return None;
    }

    if stop_distance > risk.max_stop_points {
        stop_distance = risk.max_stop_points;
    }

    let take_profit = match risk.take_profit {
        TakeProfitMode::RiskReward { ratio } => close + stop_distance * ratio,
        TakeProfitMode::Fixed { points, min_rr } => {
            // Cap the stop so the fixed target still pays at least min_rr.
            let max_dist = points / min_rr;
            if stop_distance > max_dist {
                stop_distance = max_dist;
            }
            close + points
        }
    };

    Some(EntryPlan {
        entry_price: close,
        stop_loss: close - stop_distance,
        stop_distance,
        take_profit,
    })
}

/// Everything needed to turn a closing position into a TradeRecord.
#[derive(Debug, Clone)]
pub struct TradeClose {
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub partial_done: bool,
    pub pnl_partial: f64,
    pub pnl_runner: f64,
    pub costs: f64,
}

/// What happened to the open position on one bar.
#[derive(Debug, Clone)]
pub enum BarOutcome {
    Held,
    /// Take-profit touched: half the contracts realized, trail armed.
    PartialExit,
    Closed(TradeClose),
}

/// Round-trip friction for one closed trade.
///
/// Without the partial exit: 4 half-commission fills + 2 slippage fills.
/// With it: 6 half-commission fills + 4 slippage fills — splitting the
/// position costs two extra fills.
pub fn round_trip_costs(risk: &RiskParams, contract: &ContractSpec, partial_done: bool) -> f64 {
    let half_commission = risk.commission_per_contract / 2.0;
    let slip_per_fill = f64::from(risk.slippage_ticks) * contract.tick_value();
    if partial_done {
        6.0 * half_commission + 4.0 * slip_per_fill
    } else {
        4.0 * half_commission + 2.0 * slip_per_fill
    }
}

/// Manage an open position against one bar. Mutates the position in place;
/// a `Closed` outcome means the caller must drop it and record the trade.
pub fn manage_bar(pos: &mut Position, fb: &FeatureBar, cfg: &ScalperConfig) -> BarOutcome {
    pos.high_water = pos.high_water.max(fb.high);
    let point_value = cfg.contract.point_value;

    match pos.trailing.as_mut() {
        None => {
            // ── Pre-partial: full position, hard stop then target ──
            if fb.low <= pos.stop_loss {
                let pnl = (pos.stop_loss - pos.entry_price) * point_value * f64::from(pos.contracts);
                return BarOutcome::Closed(TradeClose {
                    exit_price: pos.stop_loss,
                    exit_reason: ExitReason::FullStop,
                    partial_done: false,
                    pnl_partial: 0.0,
                    pnl_runner: pnl,
                    costs: round_trip_costs(&cfg.risk, &cfg.contract, false),
                });
            }

            if fb.high >= pos.take_profit {
                pos.contracts -= pos.contracts / 2;
                pos.trailing = Some(TrailingStop::new(pos.entry_price, pos.stop_distance));
                return BarOutcome::PartialExit;
            }

            BarOutcome::Held
        }
        Some(trail) => {
            // ── Runner: advance the trail, then test it ──
            trail.update(fb.close, fb.atr, fb.st_line, fb.st_bullish, &cfg.trailing);

            if trail.is_stopped(fb.low) {
                let half = f64::from(cfg.risk.contracts / 2);
                let runner = f64::from(pos.contracts);
                let pnl_partial = (pos.take_profit - pos.entry_price) * point_value * half;
                let pnl_runner = (trail.trail - pos.entry_price) * point_value * runner;
                return BarOutcome::Closed(TradeClose {
                    exit_price: trail.trail,
                    exit_reason: ExitReason::from_trail_stage(trail.stage),
                    partial_done: true,
                    pnl_partial,
                    pnl_runner,
                    costs: round_trip_costs(&cfg.risk, &cfg.contract, true),
                });
            }

            BarOutcome::Held
        }
    }
}

/// Close the position at an arbitrary price (driver-level forced close).
pub fn force_close(pos: &Position, price: f64, reason: ExitReason, cfg: &ScalperConfig) -> TradeClose {
    let point_value = cfg.contract.point_value;
    if pos.partial_done() {
        let half = f64::from(cfg.risk.contracts / 2);
        let runner = f64::from(pos.contracts);
        TradeClose {
            exit_price: price,
            exit_reason: reason,
            partial_done: true,
            pnl_partial: (pos.take_profit - pos.entry_price) * point_value * half,
            pnl_runner: (price - pos.entry_price) * point_value * runner,
            costs: round_trip_costs(&cfg.risk, &cfg.contract, true),
        }
    } else {
        TradeClose {
            exit_price: price,
            exit_reason: reason,
            partial_done: false,
            pnl_partial: 0.0,
            pnl_runner: (price - pos.entry_price) * point_value * f64::from(pos.contracts),
            costs: round_trip_costs(&cfg.risk, &cfg.contract, false),
        }
    }
}
