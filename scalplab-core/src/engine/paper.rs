//! Tick-driven driver for live/paper execution.
//!
//! Receives one newest Bar per invocation, recomputes the feature pipeline
//! over the full history, and feeds the newest FeatureBar to the same
//! engine the backtest uses. Because the pipeline is prefix-stable, the
//! resulting decisions are byte-identical to a batch run over the same
//! bars — the parity test pins this down.
//!
//! A rejected bar is a no-op: validation happens before any state is
//! touched, so a failed tick cannot half-mutate the engine.

use thiserror::Error;
use tracing::warn;

use chrono::{DateTime, Utc};

use crate::config::{ConfigError, ScalperConfig};
use crate::domain::{Bar, PositionSnapshot, SignalRecord, TradeRecord};
use crate::pipeline::compute_features;

use super::Engine;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("bar at {got} does not advance the clock (last bar at {last})")]
    NonMonotonicBar { last: DateTime<Utc>, got: DateTime<Utc> },
    #[error("malformed bar at {ts}: OHLC fields are not a valid range")]
    MalformedBar { ts: DateTime<Utc> },
}

/// What one accepted tick produced, for external logging and presentation.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub signal: SignalRecord,
    /// Present when this tick closed the open position.
    pub closed_trade: Option<TradeRecord>,
    pub position: Option<PositionSnapshot>,
    pub capital: f64,
}

/// Paper-trading driver: single instrument, single position, one tick at a
/// time. `&mut self` serializes ticks — a second tick cannot observe a
/// half-committed transition.
#[derive(Debug)]
pub struct PaperTrader {
    cfg: ScalperConfig,
    engine: Engine,
    history: Vec<Bar>,
}

impl PaperTrader {
    pub fn new(cfg: ScalperConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let engine = Engine::new(cfg.clone());
        Ok(Self { cfg, engine, history: Vec::new() })
    }

    /// Seed history without trading it, e.g. warm-up bars loaded at startup.
    ///
    /// Seeded bars still pass through the engine so that bar indexing and
    /// the equity curve stay aligned with a batch run over the same bars.
    pub fn seed_history(&mut self, bars: Vec<Bar>) -> Result<(), FeedError> {
        for bar in bars {
            self.push_bar(bar)?;
        }
        Ok(())
    }

    /// Append the newest bar and run one engine step.
    pub fn push_bar(&mut self, bar: Bar) -> Result<TickOutcome, FeedError> {
        if !bar.is_sane() {
            return Err(FeedError::MalformedBar { ts: bar.ts });
        }
        if let Some(last) = self.history.last() {
            if bar.ts <= last.ts {
                warn!(last = %last.ts, got = %bar.ts, "rejecting out-of-order bar");
                return Err(FeedError::NonMonotonicBar { last: last.ts, got: bar.ts });
            }
        }

        self.history.push(bar);
        let features = compute_features(&self.history, &self.cfg);
        let fb = features.last().expect("one feature bar per bar");

        let trades_before = self.engine.trades().len();
        self.engine.on_bar(fb);

        let closed_trade = if self.engine.trades().len() > trades_before {
            self.engine.trades().last().cloned()
        } else {
            None
        };

        Ok(TickOutcome {
            signal: fb.signal_record(),
            closed_trade,
            position: self.engine.position_snapshot(),
            capital: self.engine.capital(),
        })
    }

    pub fn capital(&self) -> f64 {
        self.engine.capital()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        self.engine.trades()
    }

    pub fn equity(&self) -> &[f64] {
        self.engine.equity()
    }

    pub fn position_snapshot(&self) -> Option<PositionSnapshot> {
        self.engine.position_snapshot()
    }

    pub fn bars_seen(&self) -> usize {
        self.history.len()
    }
}
