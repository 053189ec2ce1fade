//! Rolling percentile rank.
//!
//! Ranks the current value within its own trailing window (current value
//! included), returning 0–100. Ties take the average rank. A window with
//! fewer than `min_samples` valid values yields NaN — the rank is not
//! trusted until the distribution has enough history behind it.

/// Percentile rank of `values[i]` within `values[i+1-window ..= i]`.
pub fn rolling_percent_rank(values: &[f64], window: usize, min_samples: usize) -> Vec<f64> {
    assert!(window >= 1, "window must be >= 1");
    assert!(min_samples >= 1, "min_samples must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    for i in 0..n {
        let current = values[i];
        if current.is_nan() {
            continue;
        }

        let start = (i + 1).saturating_sub(window);
        let mut count = 0usize;
        let mut less = 0usize;
        let mut equal = 0usize;
        for &v in &values[start..=i] {
            if v.is_nan() {
                continue;
            }
            count += 1;
            if v < current {
                less += 1;
            } else if v == current {
                equal += 1;
            }
        }

        if count < min_samples {
            continue;
        }

        // Average rank for ties (the current value is one of the equals).
        let rank = less as f64 + (equal as f64 + 1.0) / 2.0;
        result[i] = rank / count as f64 * 100.0;
    }

    result
}
