//! Image statistics: global and per-zone LAB moments, hue-band summaries.
//!
//! Every reduction here is a rayon `fold`/`reduce` over an accumulator whose
//! `merge` is associative, so partition order never changes the result
//! beyond floating-point rounding.

pub mod channel;
pub mod hue_bands;
pub mod quantile;
pub mod zones;

pub use channel::{ChannelAccumulator, LabStats, global_stats};
pub use hue_bands::{HueBand, HueBandSet, HueBandStats};
pub use zones::{Zone, ZoneSet};

use crate::color::LabPixel;
use crate::config::ZoneThresholds;
use crate::image::GradingImage;

/// Everything preset extraction needs to know about one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorProfile {
    /// Whole-image LAB moments.
    pub global: LabStats,
    /// Per-zone LAB moments.
    pub zones: ZoneSet,
    /// Saturated-pixel summaries for the eight editor hue bands.
    pub hue_bands: HueBandSet,
}

impl ColorProfile {
    /// Profile an image whose LAB conversion is already at hand.
    pub fn compute(image: &GradingImage, lab: &[LabPixel], thresholds: &ZoneThresholds) -> Self {
        Self {
            global: global_stats(lab),
            zones: ZoneSet::compute(lab, thresholds),
            hue_bands: HueBandSet::compute(&image.pixels),
        }
    }
}
