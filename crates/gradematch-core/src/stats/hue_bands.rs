//! Hue-band summaries matching the editor's eight HSL channels.
//!
//! A pixel joins a band when its HSV hue falls in the band's range and its
//! saturation exceeds [`MIN_SATURATION`]; grays carry no hue information.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::hsv::rgb_to_hsv;
use crate::image::Rgb;

/// Pixels at or below this HSV saturation are ignored.
pub const MIN_SATURATION: f64 = 0.1;

/// One of the editor's HSL channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HueBand {
    /// 345° to 15°, wrapping through 0°.
    Red,
    /// 15° to 45°.
    Orange,
    /// 45° to 75°.
    Yellow,
    /// 75° to 165°.
    Green,
    /// 165° to 195°.
    Aqua,
    /// 195° to 255°.
    Blue,
    /// 255° to 315°.
    Purple,
    /// 315° to 345°.
    Magenta,
}

impl HueBand {
    /// All bands in the editor's panel order.
    pub const ALL: [HueBand; 8] = [
        HueBand::Red,
        HueBand::Orange,
        HueBand::Yellow,
        HueBand::Green,
        HueBand::Aqua,
        HueBand::Blue,
        HueBand::Purple,
        HueBand::Magenta,
    ];

    /// Name used in `crs:*Adjustment<Name>` properties.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::Aqua => "Aqua",
            Self::Blue => "Blue",
            Self::Purple => "Purple",
            Self::Magenta => "Magenta",
        }
    }

    /// Hue range in degrees, `[start, end)`. Red wraps through 0°.
    pub const fn range(self) -> (f64, f64) {
        match self {
            Self::Red => (345.0, 15.0),
            Self::Orange => (15.0, 45.0),
            Self::Yellow => (45.0, 75.0),
            Self::Green => (75.0, 165.0),
            Self::Aqua => (165.0, 195.0),
            Self::Blue => (195.0, 255.0),
            Self::Purple => (255.0, 315.0),
            Self::Magenta => (315.0, 345.0),
        }
    }

    /// Position in [`HueBand::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The band containing `hue` (degrees in `[0, 360)`).
    pub fn of_hue(hue: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|band| {
                let (start, end) = band.range();
                if start > end {
                    hue >= start || hue < end
                } else {
                    hue >= start && hue < end
                }
            })
            .unwrap_or(Self::Red)
    }
}

/// Summary of the saturated pixels in one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueBandStats {
    /// Pixels in the band.
    pub count: usize,
    /// Circular mean hue in degrees `[0, 360)`.
    pub mean_hue: f64,
    /// Mean HSV saturation.
    pub mean_saturation: f64,
    /// Mean HSV value.
    pub mean_value: f64,
}

impl HueBandStats {
    const EMPTY: Self = Self {
        count: 0,
        mean_hue: 0.0,
        mean_saturation: 0.0,
        mean_value: 0.0,
    };
}

/// Per-band statistics for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HueBandSet {
    bands: [HueBandStats; 8],
}

#[derive(Clone, Copy, Default)]
struct BandAccumulator {
    count: u64,
    hue_cos: f64,
    hue_sin: f64,
    saturation: f64,
    value: f64,
}

impl BandAccumulator {
    fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            hue_cos: self.hue_cos + other.hue_cos,
            hue_sin: self.hue_sin + other.hue_sin,
            saturation: self.saturation + other.saturation,
            value: self.value + other.value,
        }
    }

    fn finish(&self) -> HueBandStats {
        if self.count == 0 {
            return HueBandStats::EMPTY;
        }
        let n = self.count as f64;
        let mean_hue = self.hue_sin.atan2(self.hue_cos).to_degrees().rem_euclid(360.0);
        HueBandStats {
            count: self.count as usize,
            mean_hue,
            mean_saturation: self.saturation / n,
            mean_value: self.value / n,
        }
    }
}

impl HueBandSet {
    /// Bucket `pixels` into hue bands in parallel.
    pub fn compute(pixels: &[Rgb]) -> Self {
        let acc = pixels
            .par_iter()
            .fold(
                || [BandAccumulator::default(); 8],
                |mut acc, &px| {
                    let (hue, sat, value) = rgb_to_hsv(px);
                    if sat > MIN_SATURATION {
                        let slot = &mut acc[HueBand::of_hue(hue).index()];
                        let rad = hue.to_radians();
                        slot.count += 1;
                        slot.hue_cos += rad.cos();
                        slot.hue_sin += rad.sin();
                        slot.saturation += sat;
                        slot.value += value;
                    }
                    acc
                },
            )
            .reduce(
                || [BandAccumulator::default(); 8],
                |a, b| std::array::from_fn(|i| a[i].merge(b[i])),
            );
        Self {
            bands: std::array::from_fn(|i| acc[i].finish()),
        }
    }

    /// Statistics for one band.
    pub fn get(&self, band: HueBand) -> &HueBandStats {
        &self.bands[band.index()]
    }
}
