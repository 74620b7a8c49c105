//! Per-channel mean and standard deviation of LAB pixels.
//!
//! Uses the pairwise-mergeable form of Welford's update (Chan et al.) so
//! partial results from rayon partitions combine without a second pass, and
//! a constant channel yields a standard deviation of exactly zero.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::LabPixel;

/// Standard deviations below this are treated as zero.
pub const STD_EPSILON: f64 = 1e-6;

/// Running count, mean and sum of squared deviations for three channels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelAccumulator {
    count: u64,
    mean: [f64; 3],
    m2: [f64; 3],
}

impl ChannelAccumulator {
    /// Add one pixel.
    pub fn push(&mut self, px: LabPixel) {
        self.count += 1;
        let n = self.count as f64;
        for c in 0..3 {
            let delta = px[c] - self.mean[c];
            self.mean[c] += delta / n;
            self.m2[c] += delta * (px[c] - self.mean[c]);
        }
    }

    /// Combine two partial accumulators.
    pub fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let count = self.count + other.count;
        let (na, nb, n) = (self.count as f64, other.count as f64, count as f64);
        let mut mean = [0.0; 3];
        let mut m2 = [0.0; 3];
        for c in 0..3 {
            let delta = other.mean[c] - self.mean[c];
            mean[c] = self.mean[c] + delta * nb / n;
            m2[c] = self.m2[c] + other.m2[c] + delta * delta * na * nb / n;
        }
        Self { count, mean, m2 }
    }

    /// Population statistics of everything pushed so far.
    pub fn finish(&self) -> LabStats {
        if self.count == 0 {
            return LabStats::EMPTY;
        }
        let n = self.count as f64;
        LabStats {
            count: self.count as usize,
            mean: self.mean,
            std: self.m2.map(|m2| (m2 / n).max(0.0).sqrt()),
        }
    }
}

/// Mean and population standard deviation of L, a and b over a pixel set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabStats {
    /// Number of pixels the moments were computed over.
    pub count: usize,
    /// Per-channel mean.
    pub mean: [f64; 3],
    /// Per-channel population standard deviation.
    pub std: [f64; 3],
}

impl LabStats {
    /// Statistics of an empty pixel set.
    pub const EMPTY: Self = Self {
        count: 0,
        mean: [0.0; 3],
        std: [0.0; 3],
    };

    /// True when no pixels contributed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when every moment is a finite number.
    pub fn is_finite(&self) -> bool {
        self.mean.iter().chain(&self.std).all(|v| v.is_finite())
    }
}

/// Whole-image statistics.
pub fn global_stats(lab: &[LabPixel]) -> LabStats {
    lab.par_iter()
        .fold(ChannelAccumulator::default, |mut acc, &px| {
            acc.push(px);
            acc
        })
        .reduce(ChannelAccumulator::default, ChannelAccumulator::merge)
        .finish()
}
