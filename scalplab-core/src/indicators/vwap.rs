//! Session-anchored VWAP.
//!
//! Accumulates typical-price × volume from the session anchor (the 18:00
//! exchange-time Globex open) and resets when the session id changes. A bar
//! with no accumulated volume yet carries the previous session's final value
//! forward rather than emitting infinity.

use crate::domain::Bar;

/// VWAP per bar, reset whenever `session_ids` changes between bars.
///
/// `session_ids[i]` is any stable key identifying the trading day bar `i`
/// belongs to (bars at or after the anchor hour belong to the next day).
pub fn session_vwap(bars: &[Bar], session_ids: &[i64]) -> Vec<f64> {
    assert_eq!(bars.len(), session_ids.len(), "one session id per bar");
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    let mut cum_tp_vol = 0.0;
    let mut cum_vol = 0.0;
    let mut last_valid = f64::NAN;

    for i in 0..n {
        if i == 0 || session_ids[i] != session_ids[i - 1] {
            cum_tp_vol = 0.0;
            cum_vol = 0.0;
        }

        let vol = bars[i].volume as f64;
        cum_tp_vol += bars[i].typical_price() * vol;
        cum_vol += vol;

        if cum_vol > 0.0 {
            last_valid = cum_tp_vol / cum_vol;
        }
        result[i] = last_valid; // forward-fill across zero-volume opens
    }

    result
}

/// Trading-day id for the session anchor: bars at or after `anchor_hour`
/// (exchange time) roll into the next day's session.
pub fn trading_day_id(day_number: i64, hour: u32, anchor_hour: u32) -> i64 {
    if hour >= anchor_hour {
        day_number + 1
    } else {
        day_number
    }
}
