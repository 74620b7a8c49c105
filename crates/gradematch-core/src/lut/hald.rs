//! Hald CLUT images.
//!
//! A level-`L` Hald image is an `L³ × L³` square holding an `L²`-per-axis
//! lattice, one entry per pixel in row-major order, red-fastest. Running an
//! identity Hald through any per-pixel filter and reading it back captures
//! that filter as a LUT.

use super::{Lut3D, lattice_point};
use crate::error::{GradeError, Result};
use crate::image::GradingImage;

/// Levels accepted by [`identity`]: 64³ and 144³ lattices.
pub const SUPPORTED_LEVELS: [u32; 2] = [8, 12];

/// An identity Hald image at `level`, quantized to 8 bits.
pub fn identity(level: u32) -> Result<GradingImage> {
    if !SUPPORTED_LEVELS.contains(&level) {
        return Err(GradeError::validation("hald level", level, "expected 8 or 12"));
    }
    let edge = (level * level) as usize;
    let side = level * level * level;
    let bytes: Vec<u8> = (0..edge * edge * edge)
        .flat_map(|i| lattice_point(edge, i).map(|c| (c * 255.0).round() as u8))
        .collect();
    GradingImage::from_rgb8(side, side, &bytes)
}

/// Read a processed Hald image back as a LUT.
pub fn to_lut(image: &GradingImage) -> Result<Lut3D> {
    if image.width != image.height {
        return Err(GradeError::format(
            "hald",
            format!("image must be square, got {}x{}", image.width, image.height),
        ));
    }
    let side = image.width;
    let level = integer_root(side, 3).ok_or_else(|| {
        GradeError::format("hald", format!("side {side} is not a perfect cube"))
    })?;
    let edge = (level * level) as usize;
    Lut3D::from_data(edge, image.pixels.clone())
        .map_err(|e| GradeError::format("hald", e.to_string()))
}

/// Lay a LUT out as a Hald image. The LUT edge must be a perfect square.
pub fn from_lut(lut: &Lut3D) -> Result<GradingImage> {
    let level = u32::try_from(lut.size)
        .ok()
        .and_then(|edge| integer_root(edge, 2))
        .ok_or_else(|| {
            GradeError::format(
                "hald",
                format!("LUT size {} is not a perfect square (e.g. 64 = 8², 144 = 12²)", lut.size),
            )
        })?;
    let side = level * level * level;
    let pixels = lut
        .data
        .iter()
        .map(|rgb| rgb.map(|c| c.clamp(0.0, 1.0)))
        .collect();
    GradingImage::from_pixels(side, side, pixels)
}

fn integer_root(n: u32, power: u32) -> Option<u32> {
    let guess = f64::from(n).powf(1.0 / f64::from(power)).round() as u32;
    [guess.saturating_sub(1), guess, guess + 1]
        .into_iter()
        .find(|&r| r > 1 && r.checked_pow(power) == Some(n))
}
