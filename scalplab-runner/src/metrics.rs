//! Summary metrics over a completed run.
//!
//! The aggregates operators actually compare across runs: net P&L, profit
//! factor, win rate, expectancy, and peak-to-trough drawdown in dollars.

use serde::{Deserialize, Serialize};

use scalplab_core::RunResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate_pct: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub net_pnl: f64,
    /// Average net P&L per trade.
    pub expectancy: f64,
    /// Largest peak-to-trough equity decline, in dollars (>= 0).
    pub max_drawdown: f64,
    pub partial_fill_count: usize,
    pub final_capital: f64,
}

pub fn summarize(result: &RunResult) -> Summary {
    let trades = result.trades.len();
    let wins = result.trades.iter().filter(|t| t.is_winner()).count();
    let losses = trades - wins;

    let gross_profit: f64 = result
        .trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .sum();
    let gross_loss: f64 = result
        .trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| -t.net_pnl)
        .sum();

    let net_pnl: f64 = result.trades.iter().map(|t| t.net_pnl).sum();

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let win_rate_pct = if trades > 0 {
        wins as f64 / trades as f64 * 100.0
    } else {
        0.0
    };

    let expectancy = if trades > 0 { net_pnl / trades as f64 } else { 0.0 };

    let partial_fill_count = result.trades.iter().filter(|t| t.partial_done).count();

    Summary {
        trades,
        wins,
        losses,
        win_rate_pct,
        gross_profit,
        gross_loss,
        profit_factor,
        net_pnl,
        expectancy,
        max_drawdown: max_drawdown(&result.equity),
        partial_fill_count,
        final_capital: result.final_capital,
    }
}

/// Largest peak-to-trough decline of the equity curve, in dollars.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for &e in equity {
        peak = peak.max(e);
        worst = worst.max(peak - e);
    }
    worst
}
