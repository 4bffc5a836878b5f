//! Percentile extraction for simulated samples
//!
//! Percentiles are on the 0-100 scale and use linear interpolation between
//! the two closest ranks of the sorted sample (rank = p/100 * (n - 1)).

/// Percentile of an unsorted sample, or `None` when the sample is empty
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    Some(interpolate_sorted(&sorted, p))
}

/// Several percentiles of one unsorted sample, sorting it only once
///
/// Output order matches `ps`. Every entry is `None` when the sample is empty.
pub fn percentiles(values: &[f64], ps: &[f64]) -> Vec<Option<f64>> {
    if values.is_empty() {
        return vec![None; ps.len()];
    }
    let sorted = sorted_copy(values);
    ps.iter().map(|&p| Some(interpolate_sorted(&sorted, p))).collect()
}

/// Percentile of an already ascending-sorted, non-empty slice
///
/// `p` is clamped to [0, 100].
pub fn interpolate_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);

    if lower == upper {
        return sorted[lower];
    }

    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}
