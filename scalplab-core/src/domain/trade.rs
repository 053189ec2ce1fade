//! TradeRecord — a completed round-trip trade, appended to the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::TrailStage;
use super::session::Session;

/// Why the position was closed. Exactly one reason per closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Bar low touched the initial stop before the partial exit fired.
    FullStop,
    /// Runner stopped out while the trail was at breakeven.
    TrailS1,
    /// Runner stopped out at the profit-lock trail.
    TrailS2,
    /// Runner stopped out at the ATR/supertrend trail.
    TrailS3,
    /// Forced close by the driver (end-of-day window).
    EodClose,
}

impl ExitReason {
    pub fn from_trail_stage(stage: TrailStage) -> Self {
        match stage {
            TrailStage::Breakeven => ExitReason::TrailS1,
            TrailStage::ProfitLock => ExitReason::TrailS2,
            TrailStage::AtrTrail => ExitReason::TrailS3,
        }
    }

    pub fn is_trail(self) -> bool {
        matches!(self, ExitReason::TrailS1 | ExitReason::TrailS2 | ExitReason::TrailS3)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::FullStop => "FULL_STOP",
            ExitReason::TrailS1 => "TRAIL_S1",
            ExitReason::TrailS2 => "TRAIL_S2",
            ExitReason::TrailS3 => "TRAIL_S3",
            ExitReason::EodClose => "EOD_CLOSE",
        };
        f.write_str(s)
    }
}

/// Immutable record of one closed position: entry → exit with itemized P&L.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_num: usize,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_ts: DateTime<Utc>,
    pub entry_price: f64,
    pub entry_score: f64,
    pub entry_session: Session,
    pub stop_loss: f64,
    pub stop_distance: f64,
    pub take_profit: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_ts: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub partial_done: bool,
    pub trail_stage: Option<TrailStage>,

    // ── P&L ──
    pub pnl_partial: f64,
    pub pnl_runner: f64,
    pub costs: f64,
    pub net_pnl: f64,
    /// Runner exit distance expressed in multiples of the stop distance.
    pub rr_achieved: f64,
    pub capital_after: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar.saturating_sub(self.entry_bar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> TradeRecord {
        TradeRecord {
            trade_num: 1,
            entry_bar: 320,
            entry_ts: Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap(),
            entry_price: 17900.0,
            entry_score: 8.7,
            entry_session: Session::Us,
            stop_loss: 17870.0,
            stop_distance: 30.0,
            take_profit: 17945.0,
            exit_bar: 330,
            exit_ts: Utc.with_ymd_and_hms(2024, 3, 4, 17, 30, 0).unwrap(),
            exit_price: 17915.0,
            exit_reason: ExitReason::TrailS2,
            partial_done: true,
            trail_stage: Some(TrailStage::ProfitLock),
            pnl_partial: 900.0,
            pnl_runner: 300.0,
            costs: 33.5,
            net_pnl: 1166.5,
            rr_achieved: 0.5,
            capital_after: 101_166.5,
        }
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::FullStop.to_string(), "FULL_STOP");
        assert_eq!(ExitReason::TrailS1.to_string(), "TRAIL_S1");
        assert_eq!(ExitReason::TrailS3.to_string(), "TRAIL_S3");
        assert_eq!(ExitReason::EodClose.to_string(), "EOD_CLOSE");
    }

    #[test]
    fn exit_reason_serde_names() {
        let json = serde_json::to_string(&ExitReason::TrailS2).unwrap();
        assert_eq!(json, "\"TRAIL_S2\"");
        let back: ExitReason = serde_json::from_str("\"FULL_STOP\"").unwrap();
        assert_eq!(back, ExitReason::FullStop);
    }

    #[test]
    fn trail_reason_from_stage() {
        assert_eq!(ExitReason::from_trail_stage(TrailStage::Breakeven), ExitReason::TrailS1);
        assert_eq!(ExitReason::from_trail_stage(TrailStage::AtrTrail), ExitReason::TrailS3);
        assert!(ExitReason::TrailS1.is_trail());
        assert!(!ExitReason::FullStop.is_trail());
        assert!(!ExitReason::EodClose.is_trail());
    }

    #[test]
    fn trade_helpers() {
        let trade = sample_trade();
        assert!(trade.is_winner());
        assert_eq!(trade.bars_held(), 10);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.exit_reason, ExitReason::TrailS2);
        assert_eq!(deser.net_pnl, trade.net_pnl);
        assert_eq!(deser.entry_session, Session::Us);
    }
}
