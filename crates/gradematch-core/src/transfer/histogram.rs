//! Per-channel histogram matching by inverse CDF.
//!
//! A target value is located in the sorted target distribution as a
//! fractional rank, and replaced by the reference value at the same
//! fractional position in the sorted reference distribution.

use rayon::prelude::*;

use crate::color::LabPixel;
use crate::stats::quantile;

/// Monotone mapping of one channel from the target to the reference
/// distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileMap {
    target: Vec<f64>,
    reference: Vec<f64>,
}

impl QuantileMap {
    /// Build from two ascending samples, keeping at most `max_knots`
    /// order statistics of each.
    pub fn fit(reference_sorted: Vec<f64>, target_sorted: Vec<f64>, max_knots: usize) -> Self {
        Self {
            target: quantile::decimate(target_sorted, max_knots),
            reference: quantile::decimate(reference_sorted, max_knots),
        }
    }

    /// Map one value. Empty distributions leave it unchanged.
    pub fn map(&self, v: f64) -> f64 {
        if self.target.is_empty() || self.reference.is_empty() {
            return v;
        }
        let fraction = match self.target.len() {
            1 => 0.5,
            n => quantile::rank_of(&self.target, v) / (n - 1) as f64,
        };
        quantile::at_rank(&self.reference, fraction * (self.reference.len() - 1) as f64)
    }
}

/// The `histogram` strategy: an independent [`QuantileMap`] per LAB channel.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramTransfer {
    channels: [QuantileMap; 3],
}

impl HistogramTransfer {
    /// Fit from the full reference and target LAB buffers.
    pub fn fit(reference: &[LabPixel], target: &[LabPixel], max_knots: usize) -> Self {
        let channels = [0, 1, 2].map(|c| {
            QuantileMap::fit(
                quantile::sorted(reference.par_iter().map(|px| px[c])),
                quantile::sorted(target.par_iter().map(|px| px[c])),
                max_knots,
            )
        });
        Self { channels }
    }

    /// Map one target pixel.
    pub fn apply(&self, px: LabPixel) -> LabPixel {
        [
            self.channels[0].map(px[0]),
            self.channels[1].map(px[1]),
            self.channels[2].map(px[2]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_rank_maps_to_same_rank() {
        let map = QuantileMap::fit(vec![10.0, 20.0, 30.0], vec![0.0, 1.0, 2.0], 4096);
        assert!((map.map(0.0) - 10.0).abs() < EPSILON);
        assert!((map.map(1.0) - 20.0).abs() < EPSILON);
        assert!((map.map(2.0) - 30.0).abs() < EPSILON);
        // Between order statistics interpolates on both sides.
        assert!((map.map(0.5) - 15.0).abs() < EPSILON);
    }

    #[test]
    fn test_outside_values_clamp_to_extremes() {
        let map = QuantileMap::fit(vec![10.0, 20.0, 30.0], vec![0.0, 1.0, 2.0], 4096);
        assert_eq!(map.map(-100.0), 10.0);
        assert_eq!(map.map(100.0), 30.0);
    }

    #[test]
    fn test_different_lengths() {
        let reference: Vec<f64> = (0..=100).map(f64::from).collect();
        let map = QuantileMap::fit(reference, vec![0.0, 1.0], 4096);
        assert!((map.map(0.0)).abs() < EPSILON);
        assert!((map.map(1.0) - 100.0).abs() < EPSILON);
        assert!((map.map(0.25) - 25.0).abs() < EPSILON);
    }

    #[test]
    fn test_constant_target_maps_to_reference_median() {
        let map = QuantileMap::fit(vec![0.0, 10.0, 20.0], vec![5.0; 4], 4096);
        assert!((map.map(5.0) - 10.0).abs() < EPSILON);
        let single = QuantileMap::fit(vec![0.0, 10.0, 20.0], vec![5.0], 4096);
        assert!((single.map(5.0) - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_mapping_is_monotone() {
        let reference: Vec<f64> = (0..500).map(|i| ((i * 37) % 101) as f64 * 0.8).collect();
        let target: Vec<f64> = (0..700).map(|i| ((i * 13) % 89) as f64 + 5.0).collect();
        let (reference, target) = (quantile::sorted(reference), quantile::sorted(target));
        let map = QuantileMap::fit(reference, target, 64);
        let mut last = f64::NEG_INFINITY;
        for step in 0..=200 {
            let out = map.map(step as f64 * 0.5);
            assert!(out >= last - EPSILON, "{step}");
            last = out;
        }
    }

    #[test]
    fn test_matched_distribution_equals_reference() {
        let reference: Vec<LabPixel> = (0..50).map(|i| [i as f64 * 2.0, 0.0, -(i as f64)]).collect();
        let target: Vec<LabPixel> = (0..50).map(|i| [i as f64, 3.0 * i as f64, i as f64]).collect();
        let transfer = HistogramTransfer::fit(&reference, &target, 4096);
        for (t, r) in target.iter().zip(&reference) {
            let out = transfer.apply(*t);
            assert!((out[0] - r[0]).abs() < EPSILON, "{out:?}");
        }
        // b channel is reversed in the reference; matching sorts both sides.
        let out = transfer.apply(target[0]);
        assert!((out[2] - -49.0).abs() < EPSILON, "{out:?}");
    }
}
