//! Rolling-window primitives with a one-sample minimum.
//!
//! A value exists from the very first bar, computed over however much of
//! the trailing window is available so far. NaN inputs are skipped; a
//! window with no valid samples yields NaN.

/// Rolling mean over up to `window` trailing values (current included).
pub fn rolling_mean_min1(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        let (sum, count) = w
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    })
}

/// Rolling maximum over up to `window` trailing values (current included).
pub fn rolling_max_min1(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        w.iter()
            .filter(|v| !v.is_nan())
            .fold(f64::NAN, |acc, &v| if acc.is_nan() || v > acc { v } else { acc })
    })
}

/// Rolling minimum over up to `window` trailing values (current included).
pub fn rolling_min_min1(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        w.iter()
            .filter(|v| !v.is_nan())
            .fold(f64::NAN, |acc, &v| if acc.is_nan() || v < acc { v } else { acc })
    })
}

fn rolling_apply(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    assert!(window >= 1, "rolling window must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in 0..n {
        let start = (i + 1).saturating_sub(window);
        result[i] = f(&values[start..=i]);
    }
    result
}
