//! ScalpLab Core — the long-only futures swing-scalp engine.
//!
//! This crate contains the whole decision core:
//! - Domain types (bars, sessions, feature bars, positions, trades)
//! - Batch indicator layer with strict no-lookahead semantics
//! - Multi-timeframe resampling with lag-merged alignment flags
//! - Pattern / key-level detection
//! - Composite scoring with the validated weight contract
//! - Signal gate (cooldown, blocking windows, day/session floors)
//! - Position lifecycle (partial take-profit, three-stage trailing stop)
//! - One shared engine driven by both the batch backtest and the
//!   tick-driven paper trader

pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod lifecycle;
pub mod pipeline;
pub mod signal;

pub use config::ScalperConfig;
pub use engine::{Backtest, Engine, FeedError, PaperTrader, RunResult, TickOutcome};
pub use pipeline::compute_features;
