//! sRGB ↔ CIE LAB (D65) conversion.
//!
//! ```text
//! sRGB --(IEC 61966-2-1 EOTF)--> linear RGB --(BT.709 primaries)--> XYZ --(D65 white)--> L*a*b*
//! ```
//!
//! The chain is delegated to `palette` at `f64` precision. Both directions
//! are pure per-pixel functions; the slice helpers fan out over rayon.

use palette::white_point::D65;
use palette::{FromColor, Lab, Srgb};
use rayon::prelude::*;

use crate::image::Rgb;

/// A CIE LAB triple: `L` in `[0, 100]`, `a` and `b` in `[-128, 127]`.
pub type LabPixel = [f64; 3];

/// Valid L range.
pub const L_RANGE: (f64, f64) = (0.0, 100.0);
/// Valid range of the a and b axes.
pub const AB_RANGE: (f64, f64) = (-128.0, 127.0);

/// Convert an sRGB pixel in `[0, 1]³` to LAB.
pub fn rgb_to_lab(rgb: Rgb) -> LabPixel {
    let lab: Lab<D65, f64> = Lab::from_color(Srgb::new(rgb[0], rgb[1], rgb[2]));
    [lab.l, lab.a, lab.b]
}

/// Convert a LAB pixel back to sRGB, clamped to `[0, 1]³`.
pub fn lab_to_rgb(lab: LabPixel) -> Rgb {
    let srgb: Srgb<f64> = Srgb::from_color(Lab::<D65, f64>::new(lab[0], lab[1], lab[2]));
    [
        clamp_unit(srgb.red),
        clamp_unit(srgb.green),
        clamp_unit(srgb.blue),
    ]
}

/// Clamp a LAB triple to its valid ranges. NaN collapses to the range floor.
pub fn clamp_lab(lab: LabPixel) -> LabPixel {
    [
        clamp_or_floor(lab[0], L_RANGE),
        clamp_or_floor(lab[1], AB_RANGE),
        clamp_or_floor(lab[2], AB_RANGE),
    ]
}

/// Convert a whole pixel buffer to LAB in parallel.
pub fn pixels_to_lab(pixels: &[Rgb]) -> Vec<LabPixel> {
    pixels.par_iter().map(|&px| rgb_to_lab(px)).collect()
}

/// Convert a LAB buffer back to clamped sRGB in parallel.
pub fn lab_to_pixels(lab: &[LabPixel]) -> Vec<Rgb> {
    lab.par_iter().map(|&px| lab_to_rgb(px)).collect()
}

fn clamp_unit(v: f64) -> f64 {
    clamp_or_floor(v, (0.0, 1.0))
}

fn clamp_or_floor(v: f64, (lo, hi): (f64, f64)) -> f64 {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}
