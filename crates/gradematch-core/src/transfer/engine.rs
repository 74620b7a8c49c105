//! Orchestration of a reference-driven transfer.
//!
//! ```text
//! reference ─┐
//!            ├─ LAB ─ fit ─┐
//! target ────┘             ├─ apply ─ strength blend ─ [restore L] ─ RGB
//! target LAB ──────────────┘
//! ```

use std::time::Instant;

use rayon::prelude::*;

use super::method::FittedTransfer;
use crate::color::lab::pixels_to_lab;
use crate::color::{LabPixel, clamp_lab, lab_to_rgb, rgb_to_lab};
use crate::config::TransferConfig;
use crate::error::{GradeError, Result};
use crate::image::{GradingImage, Rgb};

/// Grade `target` so its color distribution follows `reference`.
///
/// Parameters are validated before any pixel is read. At strength 0 the
/// target is returned unchanged, without a LAB round trip.
pub fn transfer(
    reference: &GradingImage,
    target: &GradingImage,
    config: &TransferConfig,
) -> Result<GradingImage> {
    config.validate()?;
    ensure_not_empty("reference", reference)?;
    ensure_not_empty("target", target)?;

    if config.strength == 0.0 {
        tracing::debug!("strength is zero; returning target unchanged");
        return Ok(target.clone());
    }

    let started = Instant::now();
    let reference_lab = pixels_to_lab(&reference.pixels);
    let target_lab = pixels_to_lab(&target.pixels);
    let fitted = FittedTransfer::fit(&reference_lab, &target_lab, config)?;
    let fitted_at = started.elapsed();

    let pixels: Vec<Rgb> = target_lab
        .par_iter()
        .map(|&px| lab_to_rgb(grade_lab(&fitted, px, config)))
        .collect();

    tracing::debug!(
        method = %config.method,
        strength = config.strength,
        preserve_luminance = config.preserve_luminance,
        pixels = pixels.len(),
        fit_ms = fitted_at.as_secs_f64() * 1e3,
        total_ms = started.elapsed().as_secs_f64() * 1e3,
        "transfer complete"
    );

    Ok(GradingImage {
        width: target.width,
        height: target.height,
        pixels,
        source_bit_depth: target.source_bit_depth,
    })
}

/// Steps after fitting, for one LAB pixel of the target: full-strength
/// mapping, strength blend and optional luminance restore.
pub fn grade_lab(fitted: &FittedTransfer, px: LabPixel, config: &TransferConfig) -> LabPixel {
    let mapped = fitted.apply(px);
    let mut out = blend(px, mapped, config.strength);
    if config.preserve_luminance {
        out[0] = px[0];
    }
    clamp_lab(out)
}

/// [`grade_lab`] for one RGB pixel. Strength 0 passes the pixel through.
pub fn grade_rgb(fitted: &FittedTransfer, rgb: Rgb, config: &TransferConfig) -> Rgb {
    if config.strength == 0.0 {
        return rgb;
    }
    lab_to_rgb(grade_lab(fitted, rgb_to_lab(rgb), config))
}

/// `original * (1 - s) + graded * s`, exact at both ends.
pub fn blend(original: LabPixel, graded: LabPixel, strength: f64) -> LabPixel {
    if strength >= 1.0 {
        return graded;
    }
    if strength <= 0.0 {
        return original;
    }
    [0, 1, 2].map(|c| original[c] * (1.0 - strength) + graded[c] * strength)
}

pub(crate) fn ensure_not_empty(role: &'static str, image: &GradingImage) -> Result<()> {
    if image.is_empty() || image.pixels.len() != image.width as usize * image.height as usize {
        return Err(GradeError::validation(
            "image",
            format!("{role} {}x{} with {} pixels", image.width, image.height, image.len()),
            "image must be non-empty and match its dimensions",
        ));
    }
    Ok(())
}
