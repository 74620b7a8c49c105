//! Shadow / midtone / highlight partitioning on the L axis.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::channel::{ChannelAccumulator, LabStats};
use super::quantile;
use crate::color::LabPixel;
use crate::config::ZoneThresholds;

/// Percentile of L used as the adaptive shadow boundary.
const ADAPTIVE_SHADOW_PERCENTILE: f64 = 0.25;
/// Percentile of L used as the adaptive highlight boundary.
const ADAPTIVE_HIGHLIGHT_PERCENTILE: f64 = 0.75;
/// Adaptive shadow boundary limits, so extreme images keep three usable zones.
const ADAPTIVE_SHADOW_LIMITS: (f64, f64) = (15.0, 45.0);
/// Adaptive highlight boundary limits.
const ADAPTIVE_HIGHLIGHT_LIMITS: (f64, f64) = (55.0, 85.0);

/// A luminance zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// `[0, shadow_max)`
    Shadow,
    /// `[shadow_max, highlight_min)`
    Midtone,
    /// `[highlight_min, 100]`
    Highlight,
}

impl Zone {
    /// All zones, darkest first.
    pub const ALL: [Zone; 3] = [Zone::Shadow, Zone::Midtone, Zone::Highlight];

    /// Position in [`Zone::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Shadow => 0,
            Self::Midtone => 1,
            Self::Highlight => 2,
        }
    }
}

impl ZoneThresholds {
    /// The zone an L value falls in. Every L lands in exactly one zone.
    pub fn classify(&self, l: f64) -> Zone {
        if l < self.shadow_max {
            Zone::Shadow
        } else if l < self.highlight_min {
            Zone::Midtone
        } else {
            Zone::Highlight
        }
    }

    /// Boundaries at the 25th/75th percentiles of the image's L channel,
    /// limited to `[15, 45]` and `[55, 85]`.
    ///
    /// An empty slice yields the default equal thirds.
    pub fn adaptive(lab: &[LabPixel]) -> Self {
        if lab.is_empty() {
            return Self::default();
        }
        let l = quantile::sorted(lab.par_iter().map(|px| px[0]));
        let (s_lo, s_hi) = ADAPTIVE_SHADOW_LIMITS;
        let (h_lo, h_hi) = ADAPTIVE_HIGHLIGHT_LIMITS;
        Self {
            shadow_max: quantile::at_quantile(&l, ADAPTIVE_SHADOW_PERCENTILE).clamp(s_lo, s_hi),
            highlight_min: quantile::at_quantile(&l, ADAPTIVE_HIGHLIGHT_PERCENTILE)
                .clamp(h_lo, h_hi),
        }
    }
}

/// LAB moments for each zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    /// Pixels with `L < shadow_max`.
    pub shadow: LabStats,
    /// Pixels with `shadow_max <= L < highlight_min`.
    pub midtone: LabStats,
    /// Pixels with `L >= highlight_min`.
    pub highlight: LabStats,
    /// Boundaries the set was computed with.
    pub thresholds: ZoneThresholds,
}

impl ZoneSet {
    /// Partition `lab` by L and reduce each zone in parallel.
    pub fn compute(lab: &[LabPixel], thresholds: &ZoneThresholds) -> Self {
        let acc = lab
            .par_iter()
            .fold(
                || [ChannelAccumulator::default(); 3],
                |mut acc, &px| {
                    acc[thresholds.classify(px[0]).index()].push(px);
                    acc
                },
            )
            .reduce(
                || [ChannelAccumulator::default(); 3],
                |a, b| [a[0].merge(b[0]), a[1].merge(b[1]), a[2].merge(b[2])],
            );

        let set = Self {
            shadow: acc[0].finish(),
            midtone: acc[1].finish(),
            highlight: acc[2].finish(),
            thresholds: *thresholds,
        };
        for zone in Zone::ALL {
            if set.get(zone).is_empty() {
                tracing::debug!(?zone, "zone has no pixels; treated as identity");
            }
        }
        set
    }

    /// Statistics for one zone.
    pub fn get(&self, zone: Zone) -> &LabStats {
        match zone {
            Zone::Shadow => &self.shadow,
            Zone::Midtone => &self.midtone,
            Zone::Highlight => &self.highlight,
        }
    }

    /// Total pixels across zones.
    pub fn total(&self) -> usize {
        self.shadow.count + self.midtone.count + self.highlight.count
    }
}
