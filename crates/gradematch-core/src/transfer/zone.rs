//! Per-zone mean/std matching with ramped blending across zone boundaries.
//!
//! Each zone gets its own [`ChannelAffine`]. A pixel is mapped by every
//! affine and the results are mixed by weights that depend only on the
//! pixel's own L:
//!
//! ```text
//! weight
//!   1 |------\          /\          /------
//!     |       \   S    /  \   H    /
//!     |        \      / M  \      /
//!   0 +---------\----/------\----/--------- L
//!             shadow_max   highlight_min
//!             |<-w->|       |<-w->|
//! ```
//!
//! Each boundary is straddled by a linear ramp of width `w`; with `w = 0`
//! the weights degenerate to the hard half-open classification.

use super::global::ChannelAffine;
use crate::color::LabPixel;
use crate::config::ZoneThresholds;
use crate::stats::{Zone, ZoneSet};

/// The `zone_based` strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneTransfer {
    affines: [ChannelAffine; 3],
    thresholds: ZoneThresholds,
    transition_width: f64,
}

impl ZoneTransfer {
    /// Fit one affine per zone. Zones empty on either side map as identity.
    ///
    /// Both sets must have been computed with the same thresholds.
    pub fn fit(reference: &ZoneSet, target: &ZoneSet, transition_width: f64) -> Self {
        let affines = Zone::ALL.map(|zone| {
            let (r, t) = (reference.get(zone), target.get(zone));
            if r.is_empty() || t.is_empty() {
                tracing::debug!(?zone, "zone empty on one side; mapping as identity");
            }
            ChannelAffine::fit(r, t)
        });
        Self {
            affines,
            thresholds: target.thresholds,
            transition_width,
        }
    }

    /// The fitted affine for `zone`.
    pub fn affine(&self, zone: Zone) -> &ChannelAffine {
        &self.affines[zone.index()]
    }

    /// Map one target pixel.
    pub fn apply(&self, px: LabPixel) -> LabPixel {
        let weights = zone_weights(px[0], &self.thresholds, self.transition_width);
        let mut out = [0.0; 3];
        for (affine, w) in self.affines.iter().zip(weights) {
            if w == 0.0 {
                continue;
            }
            let mapped = affine.apply(px);
            for c in 0..3 {
                out[c] += w * mapped[c];
            }
        }
        out
    }
}

/// Shadow, midtone and highlight weights for an L value. Non-negative and
/// summing to one.
pub fn zone_weights(l: f64, thresholds: &ZoneThresholds, transition_width: f64) -> [f64; 3] {
    let above_shadow = ramp(l, thresholds.shadow_max, transition_width);
    let above_midtone = ramp(l, thresholds.highlight_min, transition_width);
    // Ramps share a width and the boundaries are ordered, so
    // above_shadow >= above_midtone everywhere.
    [
        1.0 - above_shadow,
        above_shadow - above_midtone,
        above_midtone,
    ]
}

/// 0 below `center - width/2`, 1 from `center + width/2` upward, linear between.
fn ramp(l: f64, center: f64, width: f64) -> f64 {
    if width <= 0.0 {
        return if l >= center { 1.0 } else { 0.0 };
    }
    ((l - (center - width / 2.0)) / width).clamp(0.0, 1.0)
}
