//! Order statistics over sorted samples.

use rayon::prelude::*;

/// Sort a copy of `values` ascending. NaN sorts last.
pub fn sorted(values: impl IntoParallelIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_par_iter().collect();
    out.par_sort_unstable_by(f64::total_cmp);
    out
}

/// Value at fractional rank `pos` (0-based) with linear interpolation
/// between the neighbouring order statistics.
pub fn at_rank(sorted: &[f64], pos: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = pos.clamp(0.0, (n - 1) as f64);
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Value at quantile `q` in `[0, 1]` (linear interpolation, numpy default).
pub fn at_quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    at_rank(sorted, q * (sorted.len() - 1) as f64)
}

/// Fractional rank of `v` within `sorted`.
///
/// Ties resolve to the midpoint of the tied run; values between two order
/// statistics interpolate linearly; values outside the sample clamp to the
/// first or last rank.
pub fn rank_of(sorted: &[f64], v: f64) -> f64 {
    let n = sorted.len();
    if n <= 1 {
        return 0.0;
    }
    let below = sorted.partition_point(|&x| x < v);
    let through = sorted.partition_point(|&x| x <= v);
    if through > below {
        // v occurs at ranks below..through-1
        return (below + through - 1) as f64 / 2.0;
    }
    if below == 0 {
        return 0.0;
    }
    if below == n {
        return (n - 1) as f64;
    }
    let (lo, hi) = (sorted[below - 1], sorted[below]);
    (below - 1) as f64 + (v - lo) / (hi - lo)
}

/// Thin `sorted` to at most `max_len` evenly spaced order statistics,
/// always keeping the minimum and maximum.
pub fn decimate(sorted: Vec<f64>, max_len: usize) -> Vec<f64> {
    let n = sorted.len();
    if n <= max_len || max_len < 2 {
        return sorted;
    }
    (0..max_len)
        .map(|k| at_rank(&sorted, k as f64 * (n - 1) as f64 / (max_len - 1) as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_at_quantile_matches_numpy_linear() {
        let s = [1.0, 2.0, 3.0, 4.0];
        // numpy.percentile([1,2,3,4], 25) == 1.75
        assert!((at_quantile(&s, 0.25) - 1.75).abs() < EPSILON);
        assert!((at_quantile(&s, 0.75) - 3.25).abs() < EPSILON);
        assert_eq!(at_quantile(&s, 0.0), 1.0);
        assert_eq!(at_quantile(&s, 1.0), 4.0);
    }

    #[test]
    fn test_rank_of_exact_and_between() {
        let s = [0.0, 10.0, 20.0];
        assert_eq!(rank_of(&s, 10.0), 1.0);
        assert!((rank_of(&s, 15.0) - 1.5).abs() < EPSILON);
        assert_eq!(rank_of(&s, -5.0), 0.0);
        assert_eq!(rank_of(&s, 99.0), 2.0);
    }

    #[test]
    fn test_rank_of_ties_take_midpoint() {
        let s = [1.0, 5.0, 5.0, 5.0, 9.0];
        assert_eq!(rank_of(&s, 5.0), 2.0);
        let flat = [3.0; 4];
        assert_eq!(rank_of(&flat, 3.0), 1.5);
    }

    #[test]
    fn test_rank_and_at_rank_are_inverse_on_samples() {
        let s = sorted(vec![4.0, 1.0, 9.0, 16.0, 0.0]);
        for (i, &v) in s.iter().enumerate() {
            assert_eq!(rank_of(&s, v), i as f64);
            assert_eq!(at_rank(&s, i as f64), v);
        }
    }

    #[test]
    fn test_decimate_keeps_extremes() {
        let s: Vec<f64> = (0..1001).map(f64::from).collect();
        let d = decimate(s, 11);
        assert_eq!(d.len(), 11);
        assert_eq!(d[0], 0.0);
        assert_eq!(d[10], 1000.0);
        assert!((d[5] - 500.0).abs() < EPSILON);
    }

    #[test]
    fn test_decimate_short_input_untouched() {
        let s = vec![1.0, 2.0];
        assert_eq!(decimate(s.clone(), 10), s);
    }
}
