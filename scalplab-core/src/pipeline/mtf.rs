//! Multi-timeframe resampling and lag-merging.
//!
//! The base series is bucketed into hourly, 4-hour, daily, and weekly
//! aggregates on the exchange clock, trend features are computed per bucket,
//! and every merged column is read one bucket behind the bar's own bucket.
//! A base bar therefore never observes a value computed from its own
//! still-forming bucket — the one-bar lag is the whole lookahead defense.
//!
//! Prior-day/week level columns are themselves built from the previous
//! bucket on the coarse series and then lag-merged like every other column,
//! so a bar in day D reads the levels of day D-2. This double lag matches
//! the validated reference merge.

use crate::domain::{Bar, ExchangeTime};
use crate::indicators::ema_of_series;

/// One coarser aggregation level of the base series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Hourly,
    FourHour,
    Daily,
    Weekly,
}

impl Timeframe {
    /// Stable, monotonically increasing bucket key for a base bar.
    pub fn bucket_key(self, et: &ExchangeTime) -> i64 {
        match self {
            Timeframe::Hourly => et.day_number * 24 + i64::from(et.hour),
            Timeframe::FourHour => et.day_number * 6 + i64::from(et.hour / 4),
            Timeframe::Daily => et.day_number,
            Timeframe::Weekly => et.week_number,
        }
    }
}

/// OHLCV buckets plus, for each base bar, the index of its bucket.
#[derive(Debug, Clone)]
pub struct Resampled {
    pub bars: Vec<Bar>,
    pub bucket_of: Vec<usize>,
}

/// Aggregate the base series into buckets using first/max/min/last/sum.
///
/// Base bars are chronological, so equal keys are always contiguous.
pub fn resample(bars: &[Bar], ex: &[ExchangeTime], tf: Timeframe) -> Resampled {
    let mut out: Vec<Bar> = Vec::new();
    let mut bucket_of = Vec::with_capacity(bars.len());
    let mut current_key: Option<i64> = None;

    for (bar, et) in bars.iter().zip(ex) {
        let key = tf.bucket_key(et);
        match (current_key, out.last_mut()) {
            (Some(k), Some(agg)) if k == key => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                current_key = Some(key);
                out.push(bar.clone());
            }
        }
        bucket_of.push(out.len() - 1);
    }

    Resampled { bars: out, bucket_of }
}

/// Lag-merged MTF columns, one value per base bar.
#[derive(Debug, Clone)]
pub struct MtfColumns {
    pub mtf1h_bullish: Vec<bool>,
    pub mtf4h_bullish: Vec<bool>,
    pub mtf_strong_bull: Vec<bool>,
    pub daily_bullish: Vec<bool>,
    pub prev_day_high: Vec<f64>,
    pub prev_day_low: Vec<f64>,
    pub prev_day_close: Vec<f64>,
    pub prev_week_high: Vec<f64>,
    pub prev_week_low: Vec<f64>,
}

/// Value of a coarse column for a base bar in bucket `k`: always the
/// previous bucket's value. NaN before any bucket has completed.
fn lagged(series: &[f64], k: usize) -> f64 {
    if k >= 1 {
        series[k - 1]
    } else {
        f64::NAN
    }
}

pub fn compute_mtf(bars: &[Bar], ex: &[ExchangeTime]) -> MtfColumns {
    let n = bars.len();

    let h1 = resample(bars, ex, Timeframe::Hourly);
    let h4 = resample(bars, ex, Timeframe::FourHour);
    let daily = resample(bars, ex, Timeframe::Daily);
    let weekly = resample(bars, ex, Timeframe::Weekly);

    let closes = |r: &Resampled| r.bars.iter().map(|b| b.close).collect::<Vec<f64>>();

    // 1H: EMA-9/21 stack plus close above the fast EMA.
    let h1_closes = closes(&h1);
    let h1_ema9 = ema_of_series(&h1_closes, 9);
    let h1_ema21 = ema_of_series(&h1_closes, 21);

    // 4H: price above EMA-50 and EMA-50 above EMA-200.
    let h4_closes = closes(&h4);
    let h4_ema50 = ema_of_series(&h4_closes, 50);
    let h4_ema200 = ema_of_series(&h4_closes, 200);

    // Daily: EMA-50/200 trend plus prior-day levels.
    let d_closes = closes(&daily);
    let d_ema50 = ema_of_series(&d_closes, 50);
    let d_ema200 = ema_of_series(&d_closes, 200);
    let d_prev_high = prev_bucket(&daily.bars, |b| b.high);
    let d_prev_low = prev_bucket(&daily.bars, |b| b.low);
    let d_prev_close = prev_bucket(&daily.bars, |b| b.close);

    // Weekly: prior-week extremes.
    let w_prev_high = prev_bucket(&weekly.bars, |b| b.high);
    let w_prev_low = prev_bucket(&weekly.bars, |b| b.low);

    let mut cols = MtfColumns {
        mtf1h_bullish: vec![false; n],
        mtf4h_bullish: vec![false; n],
        mtf_strong_bull: vec![false; n],
        daily_bullish: vec![false; n],
        prev_day_high: vec![f64::NAN; n],
        prev_day_low: vec![f64::NAN; n],
        prev_day_close: vec![f64::NAN; n],
        prev_week_high: vec![f64::NAN; n],
        prev_week_low: vec![f64::NAN; n],
    };

    for i in 0..n {
        // NaN comparisons are false, which keeps warm-up flags off.
        let k1 = h1.bucket_of[i];
        let (e9, e21, c1) = (lagged(&h1_ema9, k1), lagged(&h1_ema21, k1), lagged(&h1_closes, k1));
        cols.mtf1h_bullish[i] = e9 > e21 && c1 > e9;

        let k4 = h4.bucket_of[i];
        let (e50, e200, c4) = (lagged(&h4_ema50, k4), lagged(&h4_ema200, k4), lagged(&h4_closes, k4));
        cols.mtf4h_bullish[i] = c4 > e50 && e50 > e200;

        cols.mtf_strong_bull[i] = cols.mtf1h_bullish[i] && cols.mtf4h_bullish[i];

        let kd = daily.bucket_of[i];
        cols.daily_bullish[i] = lagged(&d_ema50, kd) > lagged(&d_ema200, kd);
        cols.prev_day_high[i] = lagged(&d_prev_high, kd);
        cols.prev_day_low[i] = lagged(&d_prev_low, kd);
        cols.prev_day_close[i] = lagged(&d_prev_close, kd);

        let kw = weekly.bucket_of[i];
        cols.prev_week_high[i] = lagged(&w_prev_high, kw);
        cols.prev_week_low[i] = lagged(&w_prev_low, kw);
    }

    cols
}

/// Per-bucket column holding the previous bucket's value of `f`.
fn prev_bucket(buckets: &[Bar], f: impl Fn(&Bar) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; buckets.len()];
    for k in 1..buckets.len() {
        out[k] = f(&buckets[k - 1]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::America::New_York;

    /// 15-minute bars starting at the given UTC time with the given closes.
    fn bars_from(start_h: u32, closes: &[f64]) -> (Vec<Bar>, Vec<ExchangeTime>) {
        let base = Utc.with_ymd_and_hms(2024, 1, 8, start_h, 0, 0).unwrap();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                ts: base + Duration::minutes(15 * i as i64),
                open: c,
                high: c + 2.0,
                low: c - 2.0,
                close: c,
                volume: 100,
            })
            .collect();
        let ex: Vec<ExchangeTime> = bars.iter().map(|b| ExchangeTime::of(b.ts, New_York)).collect();
        (bars, ex)
    }

    #[test]
    fn hourly_resample_aggregates_ohlcv() {
        // 8 bars = 2 full hours
        let (bars, ex) = bars_from(14, &[10.0, 12.0, 9.0, 11.0, 20.0, 22.0, 19.0, 21.0]);
        let r = resample(&bars, &ex, Timeframe::Hourly);
        assert_eq!(r.bars.len(), 2);
        let first = &r.bars[0];
        assert_eq!(first.open, 10.0); // first
        assert_eq!(first.high, 14.0); // max(close + 2)
        assert_eq!(first.low, 7.0); // min(close - 2)
        assert_eq!(first.close, 11.0); // last
        assert_eq!(first.volume, 400); // sum
        assert_eq!(&r.bucket_of, &[0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn four_hour_buckets_align_to_local_midnight() {
        // 13:00 UTC = 08:00 ET in January; 4h buckets are 08:00-11:59 ET.
        let (bars, ex) = bars_from(13, &[1.0; 20]); // 5 hours of bars
        let r = resample(&bars, &ex, Timeframe::FourHour);
        // 08:00-11:59 ET = 16 bars, then 12:00+ starts a new bucket.
        assert_eq!(r.bars.len(), 2);
        assert_eq!(r.bucket_of[15], 0);
        assert_eq!(r.bucket_of[16], 1);
    }

    #[test]
    fn merged_values_come_from_the_prior_bucket() {
        // Two hours of rising closes; the second hour's bars must see the
        // FIRST hour's close, never their own forming bucket.
        let (bars, ex) = bars_from(14, &[10.0, 11.0, 12.0, 13.0, 50.0, 51.0, 52.0, 53.0]);
        let h1 = resample(&bars, &ex, Timeframe::Hourly);
        let closes: Vec<f64> = h1.bars.iter().map(|b| b.close).collect();
        for i in 4..8 {
            let k = h1.bucket_of[i];
            assert_eq!(lagged(&closes, k), 13.0, "bar {i} must read hour 1's close");
        }
        // First hour has no completed bucket behind it.
        assert!(lagged(&closes, h1.bucket_of[0]).is_nan());
    }

    #[test]
    fn prior_day_levels_are_double_lagged() {
        // Three exchange-local days of bars (one bar per day at 10:00 ET).
        let base = Utc.with_ymd_and_hms(2024, 1, 8, 15, 0, 0).unwrap();
        let bars: Vec<Bar> = (0..3)
            .map(|d| Bar {
                ts: base + Duration::days(d),
                open: 100.0,
                high: 110.0 + d as f64,
                low: 90.0,
                close: 100.0,
                volume: 1,
            })
            .collect();
        let ex: Vec<ExchangeTime> = bars.iter().map(|b| ExchangeTime::of(b.ts, New_York)).collect();
        let cols = compute_mtf(&bars, &ex);
        // Day 0 and day 1: nothing far enough back yet.
        assert!(cols.prev_day_high[0].is_nan());
        assert!(cols.prev_day_high[1].is_nan());
        // Day 2 reads day 0's high (previous-bucket column, then lag-merge).
        assert_eq!(cols.prev_day_high[2], 110.0);
    }

    #[test]
    fn weekly_buckets_group_iso_weeks() {
        // Mon Jan 8 and Mon Jan 15 2024 are different ISO weeks.
        let monday1 = Utc.with_ymd_and_hms(2024, 1, 8, 15, 0, 0).unwrap();
        let monday2 = Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap();
        let bars = vec![
            Bar { ts: monday1, open: 1.0, high: 2.0, low: 0.5, close: 1.5, volume: 1 },
            Bar { ts: monday2, open: 1.0, high: 3.0, low: 0.5, close: 1.5, volume: 1 },
        ];
        let ex: Vec<ExchangeTime> = bars.iter().map(|b| ExchangeTime::of(b.ts, New_York)).collect();
        let r = resample(&bars, &ex, Timeframe::Weekly);
        assert_eq!(r.bars.len(), 2);
    }

    #[test]
    fn mtf_flags_false_during_warmup() {
        let (bars, ex) = bars_from(14, &[10.0; 12]);
        let cols = compute_mtf(&bars, &ex);
        // Not enough hourly buckets for any EMA: flags must be false, not true.
        assert!(cols.mtf1h_bullish.iter().all(|&b| !b));
        assert!(cols.mtf4h_bullish.iter().all(|&b| !b));
        assert!(cols.daily_bullish.iter().all(|&b| !b));
    }
}
