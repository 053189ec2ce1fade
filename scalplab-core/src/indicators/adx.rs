//! DMI / ADX — directional movement and trend strength (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! Lookback: 2 * period (period for DI smoothing, then period for ADX).

use crate::domain::Bar;
use crate::indicators::atr::{true_range, wilder_smooth};

/// ADX plus its two directional components as parallel series.
#[derive(Debug, Clone)]
pub struct DmiSeries {
    pub adx: Vec<f64>,
    pub di_plus: Vec<f64>,
    pub di_minus: Vec<f64>,
}

pub fn dmi(bars: &[Bar], period: usize) -> DmiSeries {
    assert!(period >= 1, "DMI period must be >= 1");
    let n = bars.len();
    let nan = vec![f64::NAN; n];

    if n < 2 {
        return DmiSeries { adx: nan.clone(), di_plus: nan.clone(), di_minus: nan };
    }

    // Step 1: +DM and -DM (undefined on the first bar)
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for i in 1..n {
        let high_diff = bars[i].high - bars[i - 1].high;
        let low_diff = bars[i - 1].low - bars[i].low;

        plus_dm[i] = if high_diff > low_diff && high_diff > 0.0 { high_diff } else { 0.0 };
        minus_dm[i] = if low_diff > high_diff && low_diff > 0.0 { low_diff } else { 0.0 };
    }

    // Step 2: Wilder smooth +DM, -DM, and TR over the same window
    let mut tr = true_range(bars);
    tr[0] = f64::NAN; // no previous close
    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus_dm = wilder_smooth(&plus_dm, period);
    let smooth_minus_dm = wilder_smooth(&minus_dm, period);

    // Steps 3-5: DI and DX
    let mut di_plus = vec![f64::NAN; n];
    let mut di_minus = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan()
            || smooth_plus_dm[i].is_nan()
            || smooth_minus_dm[i].is_nan()
            || smooth_tr[i] == 0.0
        {
            continue;
        }

        let p = 100.0 * smooth_plus_dm[i] / smooth_tr[i];
        let m = 100.0 * smooth_minus_dm[i] / smooth_tr[i];
        di_plus[i] = p;
        di_minus[i] = m;

        let di_sum = p + m;
        dx[i] = if di_sum == 0.0 { 0.0 } else { 100.0 * (p - m).abs() / di_sum };
    }

    // Step 6: ADX
    let adx = wilder_smooth(&dx, period);

    DmiSeries { adx, di_plus, di_minus }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                ts: base + Duration::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn trending_up(n: usize) -> Vec<Bar> {
        let data: Vec<(f64, f64, f64, f64)> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 1.0)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn uptrend_has_plus_di_above_minus_di() {
        let bars = trending_up(20);
        let result = dmi(&bars, 3);
        for i in 8..20 {
            assert!(
                result.di_plus[i] > result.di_minus[i],
                "+DI should dominate in an uptrend at bar {i}"
            );
        }
    }

    #[test]
    fn strong_trend_has_high_adx() {
        let bars = trending_up(30);
        let result = dmi(&bars, 3);
        let last = *result.adx.last().unwrap();
        assert!(last > 25.0, "steady uptrend ADX should be strong, got {last}");
    }

    #[test]
    fn warmup_is_nan() {
        let bars = trending_up(20);
        let result = dmi(&bars, 5);
        // DI needs 5 smoothed values (first at index 5), ADX another 5.
        for i in 0..5 {
            assert!(result.di_plus[i].is_nan());
            assert!(result.adx[i].is_nan());
        }
        assert!(!result.di_plus[5].is_nan());
        assert!(result.adx[8].is_nan());
        assert!(!result.adx[9].is_nan());
    }

    #[test]
    fn adx_bounds() {
        let data: Vec<(f64, f64, f64, f64)> = (0..40)
            .map(|i| {
                let base = 100.0 + ((i * 7) % 13) as f64 - 6.0;
                (base, base + 2.0, base - 2.0, base + if i % 2 == 0 { 1.0 } else { -1.0 })
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let result = dmi(&bars, 4);
        for &v in &result.adx {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "ADX out of bounds: {v}");
            }
        }
    }

    #[test]
    fn too_few_bars_all_nan() {
        let bars = trending_up(1);
        let result = dmi(&bars, 3);
        assert!(result.adx.iter().all(|v| v.is_nan()));
        assert!(result.di_plus.iter().all(|v| v.is_nan()));
    }
}
