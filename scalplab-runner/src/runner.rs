//! Single-run orchestration: config → backtest → summary.

use anyhow::Context;
use tracing::info;

use scalplab_core::domain::Bar;
use scalplab_core::{Backtest, RunResult, ScalperConfig};

use crate::metrics::{summarize, Summary};

/// Run one backtest over pre-loaded bars and summarize it.
pub fn run_backtest(bars: &[Bar], cfg: ScalperConfig) -> anyhow::Result<(RunResult, Summary)> {
    anyhow::ensure!(!bars.is_empty(), "no bars to simulate");

    let fingerprint = cfg.fingerprint();
    let backtest = Backtest::new(cfg).context("building backtest")?;
    let result = backtest.run(bars);
    let summary = summarize(&result);

    info!(
        %fingerprint,
        trades = summary.trades,
        net = summary.net_pnl,
        final_capital = summary.final_capital,
        "run complete"
    );

    Ok((result, summary))
}
