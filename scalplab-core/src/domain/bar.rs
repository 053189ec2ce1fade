//! Bar — the fundamental market data unit.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One fixed-interval OHLCV sample for the traded contract.
///
/// Bars arrive from the feed boundary already deduplicated and in
/// chronological order; the engine never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high/low bracket open and close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }

    /// (high + low + close) / 3 — the anchor price for session VWAP.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// A bar timestamp broken down on the exchange wall clock.
///
/// All session labels, weekday filters, and resampling buckets are defined in
/// exchange time (America/New_York for CME index futures), not UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeTime {
    pub hour: u32,
    pub minute: u32,
    pub weekday: Weekday,
    /// Days since the common era, used as a stable daily bucket key.
    pub day_number: i64,
    /// ISO week key (year * 64 + week), used as the weekly bucket key.
    pub week_number: i64,
}

impl ExchangeTime {
    pub fn of(ts: DateTime<Utc>, tz: Tz) -> Self {
        let local = ts.with_timezone(&tz);
        let iso = local.iso_week();
        Self {
            hour: local.hour(),
            minute: local.minute(),
            weekday: local.weekday(),
            day_number: i64::from(local.num_days_from_ce()),
            week_number: i64::from(iso.year()) * 64 + i64::from(iso.week()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn sample_bar() -> Bar {
        Bar {
            ts: Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap(),
            open: 16800.0,
            high: 16850.0,
            low: 16780.0,
            close: 16840.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 16770.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn typical_price() {
        let bar = sample_bar();
        let expected = (16850.0 + 16780.0 + 16840.0) / 3.0;
        assert!((bar.typical_price() - expected).abs() < 1e-10);
    }

    #[test]
    fn exchange_time_converts_to_eastern() {
        // 14:30 UTC on Jan 2 2024 = 09:30 ET (EST, UTC-5)
        let et = ExchangeTime::of(sample_bar().ts, New_York);
        assert_eq!(et.hour, 9);
        assert_eq!(et.minute, 30);
        assert_eq!(et.weekday, Weekday::Tue);
    }

    #[test]
    fn exchange_time_daylight_saving() {
        // 14:30 UTC in July = 10:30 ET (EDT, UTC-4)
        let ts = Utc.with_ymd_and_hms(2024, 7, 2, 14, 30, 0).unwrap();
        let et = ExchangeTime::of(ts, New_York);
        assert_eq!(et.hour, 10);
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.ts, deser.ts);
        assert_eq!(bar.close, deser.close);
        assert_eq!(bar.volume, deser.volume);
    }
}
