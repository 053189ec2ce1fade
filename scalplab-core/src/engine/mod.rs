//! The shared per-bar engine.
//!
//! One `Engine` instance owns the only mutable trading state: the optional
//! Position, the CooldownState, capital, and the ledgers. Both drivers —
//! batch backtest and tick-driven paper trading — funnel every FeatureBar
//! through `on_bar`, so the two modes cannot diverge behaviorally.

pub mod backtest;
pub mod paper;

pub use backtest::{Backtest, RunResult};
pub use paper::{FeedError, PaperTrader, TickOutcome};

use chrono::Weekday;
use tracing::{debug, info};

use crate::config::ScalperConfig;
use crate::domain::{ExitReason, FeatureBar, Position, PositionSnapshot, TradeRecord};
use crate::lifecycle::{self, BarOutcome, TradeClose};
use crate::signal::{self, CooldownState, GateDecision};

#[derive(Debug)]
pub struct Engine {
    cfg: ScalperConfig,
    cooldown: CooldownState,
    position: Option<Position>,
    capital: f64,
    trades: Vec<TradeRecord>,
    equity: Vec<f64>,
    bar_index: usize,
    last_close: f64,
}

impl Engine {
    pub fn new(cfg: ScalperConfig) -> Self {
        let capital = cfg.risk.initial_capital;
        Self {
            cfg,
            cooldown: CooldownState::new(),
            position: None,
            capital,
            trades: Vec::new(),
            equity: Vec::new(),
            bar_index: 0,
            last_close: f64::NAN,
        }
    }

    /// Process one FeatureBar. Capital is recorded after every bar, whether
    /// or not anything happened.
    pub fn on_bar(&mut self, fb: &FeatureBar) {
        let i = self.bar_index;
        self.bar_index += 1;
        self.last_close = fb.close;

        self.step(fb, i);
        self.equity.push(self.capital);
    }

    fn step(&mut self, fb: &FeatureBar, i: usize) {
        // Warm-up bars carry no trusted fields.
        if !fb.ready || fb.score.is_nan() {
            return;
        }

        // Optional end-of-day forced close (only acts on an open position).
        if self.cfg.session.use_eod_close
            && fb.hour == self.cfg.session.eod_close_hour
            && fb.minute >= self.cfg.session.eod_close_minute
        {
            if let Some(pos) = self.position.take() {
                let tc = lifecycle::force_close(&pos, fb.close, ExitReason::EodClose, &self.cfg);
                self.record_trade(pos, tc, i, fb);
            }
            return;
        }

        // The maintenance hour and Saturday are skipped before any
        // management, matching the validated engine.
        if fb.hour == 17 || fb.weekday == Weekday::Sat {
            return;
        }

        match self.position.take() {
            Some(mut pos) => match lifecycle::manage_bar(&mut pos, fb, &self.cfg) {
                BarOutcome::Closed(tc) => self.record_trade(pos, tc, i, fb),
                BarOutcome::PartialExit => {
                    info!(
                        entry = pos.entry_price,
                        take_profit = pos.take_profit,
                        "partial exit filled, runner trailing from breakeven"
                    );
                    self.position = Some(pos);
                }
                BarOutcome::Held => self.position = Some(pos),
            },
            None => self.try_enter(fb, i),
        }
    }

    fn try_enter(&mut self, fb: &FeatureBar, i: usize) {
        match signal::evaluate(fb, i, &self.cooldown, &self.cfg.gate) {
            GateDecision::Enter => {
                let Some(plan) = lifecycle::plan_entry(fb.close, fb.tech_stop, &self.cfg.risk) else {
                    debug!(close = fb.close, tech_stop = fb.tech_stop, "entry skipped: degenerate stop");
                    return;
                };
                self.cooldown.record_entry(i, plan.entry_price);
                info!(
                    bar = i,
                    entry = plan.entry_price,
                    stop = plan.stop_loss,
                    target = plan.take_profit,
                    score = fb.score,
                    threshold = fb.effective_thresh,
                    session = %fb.session,
                    "long entry"
                );
                self.position = Some(Position {
                    entry_bar: i,
                    entry_ts: fb.ts,
                    entry_price: plan.entry_price,
                    entry_score: fb.score,
                    entry_session: fb.session,
                    stop_loss: plan.stop_loss,
                    stop_distance: plan.stop_distance,
                    take_profit: plan.take_profit,
                    contracts: self.cfg.risk.contracts,
                    trailing: None,
                    high_water: fb.high,
                });
            }
            GateDecision::Reject(reason) => {
                debug!(bar = i, ?reason, score = fb.score, "entry rejected");
            }
        }
    }

    fn record_trade(&mut self, pos: Position, tc: TradeClose, exit_bar: usize, fb: &FeatureBar) {
        let net_pnl = tc.pnl_partial + tc.pnl_runner - tc.costs;
        self.capital += net_pnl;

        let rr_achieved = if pos.stop_distance > 0.0 {
            (tc.exit_price - pos.entry_price) / pos.stop_distance
        } else {
            0.0
        };

        let trade = TradeRecord {
            trade_num: self.trades.len() + 1,
            entry_bar: pos.entry_bar,
            entry_ts: pos.entry_ts,
            entry_price: pos.entry_price,
            entry_score: pos.entry_score,
            entry_session: pos.entry_session,
            stop_loss: pos.stop_loss,
            stop_distance: pos.stop_distance,
            take_profit: pos.take_profit,
            exit_bar,
            exit_ts: fb.ts,
            exit_price: tc.exit_price,
            exit_reason: tc.exit_reason,
            partial_done: tc.partial_done,
            trail_stage: pos.trailing.as_ref().map(|t| t.stage),
            pnl_partial: tc.pnl_partial,
            pnl_runner: tc.pnl_runner,
            costs: tc.costs,
            net_pnl,
            rr_achieved,
            capital_after: self.capital,
        };

        info!(
            trade = trade.trade_num,
            reason = %trade.exit_reason,
            net = trade.net_pnl,
            capital = self.capital,
            "trade closed"
        );
        self.trades.push(trade);
    }

    // ── Continuous outputs for external collaborators ──

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn equity(&self) -> &[f64] {
        &self.equity
    }

    pub fn position_snapshot(&self) -> Option<PositionSnapshot> {
        self.position.as_ref().map(|p| p.snapshot(self.last_close))
    }

    pub fn bars_processed(&self) -> usize {
        self.bar_index
    }

    pub fn config(&self) -> &ScalperConfig {
        &self.cfg
    }

    /// Consume the engine into its ledgers.
    pub fn into_ledgers(self) -> (Vec<TradeRecord>, Vec<f64>, f64) {
        (self.trades, self.equity, self.capital)
    }
}
