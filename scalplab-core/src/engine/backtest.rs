//! Batch driver: precompute the feature sequence, then walk it in order.

use tracing::info;

use crate::config::{ConfigError, ScalperConfig};
use crate::domain::{Bar, SignalRecord, TradeRecord};
use crate::pipeline::compute_features;

use super::Engine;

/// Everything a run produces: the trade ledger, the per-bar equity curve,
/// and the per-bar signal records for external logging.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub trades: Vec<TradeRecord>,
    pub equity: Vec<f64>,
    pub signals: Vec<SignalRecord>,
    pub final_capital: f64,
}

/// Offline historical simulation over a full bar sequence.
#[derive(Debug, Clone)]
pub struct Backtest {
    cfg: ScalperConfig,
}

impl Backtest {
    pub fn new(cfg: ScalperConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Run the simulation. Bars must be well-formed, deduplicated, and
    /// chronologically ordered (the feed boundary guarantees this).
    ///
    /// Strictly sequential: each bar's decision depends on prior bars'
    /// finalized state, so there is nothing to parallelize here.
    pub fn run(&self, bars: &[Bar]) -> RunResult {
        info!(bars = bars.len(), config = %self.cfg.fingerprint(), "backtest start");

        let features = compute_features(bars, &self.cfg);
        let signals: Vec<SignalRecord> = features.iter().map(|fb| fb.signal_record()).collect();

        let mut engine = Engine::new(self.cfg.clone());
        for fb in &features {
            engine.on_bar(fb);
        }

        let (trades, equity, final_capital) = engine.into_ledgers();
        info!(trades = trades.len(), final_capital, "backtest complete");

        RunResult { trades, equity, signals, final_capital }
    }
}
