//! Whole-image mean/std matching (Reinhard-style) in LAB.

use crate::color::LabPixel;
use crate::stats::LabStats;
use crate::stats::channel::STD_EPSILON;

/// Per-channel `out = x * scale + offset`.
///
/// Fitting maps the target's mean and standard deviation onto the
/// reference's. A channel whose target deviation is zero keeps unit scale
/// but still has its mean shifted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelAffine {
    /// Multiplier per channel.
    pub scale: [f64; 3],
    /// Additive term per channel, applied after scaling.
    pub offset: [f64; 3],
}

impl ChannelAffine {
    /// Leaves every value unchanged.
    pub const IDENTITY: Self = Self {
        scale: [1.0; 3],
        offset: [0.0; 3],
    };

    /// Fit the affine that moves `target` moments onto `reference` moments.
    ///
    /// Returns [`ChannelAffine::IDENTITY`] when either side is empty.
    pub fn fit(reference: &LabStats, target: &LabStats) -> Self {
        if reference.is_empty() || target.is_empty() {
            return Self::IDENTITY;
        }
        let mut scale = [1.0; 3];
        let mut offset = [0.0; 3];
        for c in 0..3 {
            if target.std[c] >= STD_EPSILON {
                scale[c] = reference.std[c] / target.std[c];
            }
            offset[c] = reference.mean[c] - target.mean[c] * scale[c];
        }
        Self { scale, offset }
    }

    /// Apply to one LAB pixel. The result is not clamped.
    #[inline]
    pub fn apply(&self, px: LabPixel) -> LabPixel {
        [
            px[0] * self.scale[0] + self.offset[0],
            px[1] * self.scale[1] + self.offset[1],
            px[2] * self.scale[2] + self.offset[2],
        ]
    }
}

/// The `global_lab` strategy: one affine fitted on whole-image statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalLabTransfer {
    affine: ChannelAffine,
}

impl GlobalLabTransfer {
    /// Fit from whole-image reference and target statistics.
    pub fn fit(reference: &LabStats, target: &LabStats) -> Self {
        Self {
            affine: ChannelAffine::fit(reference, target),
        }
    }

    /// The fitted per-channel affine.
    pub fn affine(&self) -> &ChannelAffine {
        &self.affine
    }

    /// Map one target pixel.
    pub fn apply(&self, px: LabPixel) -> LabPixel {
        self.affine.apply(px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::global_stats;

    const EPSILON: f64 = 1e-9;

    fn stats(mean: [f64; 3], std: [f64; 3]) -> LabStats {
        LabStats {
            count: 10,
            mean,
            std,
        }
    }

    #[test]
    fn test_moments_are_matched() {
        let target: Vec<LabPixel> = (0..200)
            .map(|i| {
                let t = i as f64;
                [20.0 + (t % 40.0), (t * 0.7).sin() * 10.0, (t * 0.3).cos() * 6.0]
            })
            .collect();
        let reference = stats([60.0, 5.0, -8.0], [12.0, 3.0, 9.0]);
        let transfer = GlobalLabTransfer::fit(&reference, &global_stats(&target));

        let out: Vec<LabPixel> = target.iter().map(|&px| transfer.apply(px)).collect();
        let got = global_stats(&out);
        for c in 0..3 {
            assert!((got.mean[c] - reference.mean[c]).abs() < 1e-6, "{got:?}");
            assert!((got.std[c] - reference.std[c]).abs() < 1e-6, "{got:?}");
        }
    }

    #[test]
    fn test_zero_target_std_keeps_scale_but_shifts_mean() {
        let reference = stats([70.0, 10.0, 20.0], [5.0, 5.0, 5.0]);
        let target = stats([40.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let affine = ChannelAffine::fit(&reference, &target);
        assert_eq!(affine.scale[0], 1.0);
        assert_eq!(affine.scale[2], 1.0);
        assert!((affine.scale[1] - 2.5).abs() < EPSILON);

        let out = affine.apply([40.0, 0.0, 0.0]);
        assert!((out[0] - 70.0).abs() < EPSILON);
        assert!((out[2] - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_uniform_reference_collapses_to_its_mean() {
        let reference = stats([55.0, 12.0, 30.0], [0.0; 3]);
        let target = stats([40.0, -3.0, 2.0], [9.0, 4.0, 6.0]);
        let affine = ChannelAffine::fit(&reference, &target);
        for px in [[0.0, 0.0, 0.0], [100.0, 50.0, -50.0]] {
            let out = affine.apply(px);
            for c in 0..3 {
                assert!((out[c] - reference.mean[c]).abs() < EPSILON, "{out:?}");
            }
        }
    }

    #[test]
    fn test_empty_side_is_identity() {
        let full = stats([50.0, 0.0, 0.0], [10.0; 3]);
        assert_eq!(ChannelAffine::fit(&LabStats::EMPTY, &full), ChannelAffine::IDENTITY);
        assert_eq!(ChannelAffine::fit(&full, &LabStats::EMPTY), ChannelAffine::IDENTITY);
    }
}
