//! RGB → HSV, used to bucket pixels into editor hue bands.

use crate::image::Rgb;

/// Convert RGB to HSV (hue in degrees `[0, 360)`, saturation and value in `0..1`).
///
/// Achromatic pixels report hue `0.0`.
pub fn rgb_to_hsv(rgb: Rgb) -> (f64, f64, f64) {
    let [r, g, b] = rgb;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let value = max;

    if delta < 1e-12 {
        return (0.0, 0.0, value);
    }

    let sat = if max > 0.0 { delta / max } else { 0.0 };

    let hue = if (max - r).abs() < 1e-12 {
        ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < 1e-12 {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    let hue = (hue * 60.0).rem_euclid(360.0);
    (hue, sat, value)
}
