//! gradematch core: reference-driven color grading.
//!
//! Given a reference image and a target image, this crate
//!
//! - grades the target so its color distribution follows the reference
//!   ([`transfer_image`], [`transfer_file`]),
//! - captures the reference's look as a portable 3D LUT ([`generate_lut`]),
//! - or as an editor preset with tone, split-toning and HSL moves
//!   ([`generate_preset`]).
//!
//! All work happens in CIE LAB. Pixel maps and statistic reductions run on
//! rayon; configuration is passed by value into every call and nothing is
//! global. The crate logs through `tracing` and installs no subscriber.

mod atomic;
pub mod color;
pub mod config;
pub mod error;
pub mod image;
pub mod lut;
pub mod preset;
pub mod stats;
pub mod transfer;

use std::path::Path;

// Re-exports for convenience.
pub use config::{
    DEFAULT_IMPROVED_HISTOGRAM_WEIGHT, DEFAULT_LUT_TITLE, LutSize, PresetConfig, TransferConfig,
    TransferMethod, ZoneThresholds,
};
pub use error::{GradeError, Result};
pub use crate::image::{BitDepth, GradingImage, Rgb, load_image, save_image};
pub use lut::Lut3D;
pub use preset::PresetDelta;
pub use transfer::FittedTransfer;

use color::lab::pixels_to_lab;
use stats::ColorProfile;
use transfer::engine::ensure_not_empty;

/// Grade `target` toward `reference`. See [`transfer::transfer`].
pub fn transfer_image(
    reference: &GradingImage,
    target: &GradingImage,
    config: &TransferConfig,
) -> Result<GradingImage> {
    transfer::transfer(reference, target, config)
}

/// Load both images, grade the target and save the result to `output`.
///
/// The config is validated before either file is opened.
pub fn transfer_file(
    reference: &Path,
    target: &Path,
    output: &Path,
    config: &TransferConfig,
) -> Result<GradingImage> {
    config.validate()?;
    let reference = load_image(reference)?;
    let target = load_image(target)?;
    let graded = transfer::transfer(&reference, &target, config)?;
    save_image(&graded, output)?;
    tracing::info!(path = %output.display(), method = %config.method, "wrote graded image");
    Ok(graded)
}

/// Capture `reference`'s look as a `size³` LUT and write it as a `.cube`
/// file at `path`.
///
/// The transfer is fitted against the identity lattice, so the LUT is a
/// fixed color-to-color mapping usable on any image.
pub fn generate_lut(
    reference: &GradingImage,
    config: &TransferConfig,
    size: LutSize,
    path: &Path,
    title: Option<&str>,
) -> Result<Lut3D> {
    config.validate()?;
    ensure_not_empty("reference", reference)?;

    let fitted = lut::sampler::fit_for_lattice(reference, config, size)?;
    let lut = lut::sample(&fitted, config, size);
    lut::cube::write(&lut, path, title.unwrap_or(DEFAULT_LUT_TITLE))?;
    Ok(lut)
}

/// Derive preset deltas that move `target` toward `reference` and write
/// them as an XMP preset named `name` at `path`.
///
/// The same inputs always produce a byte-identical file.
pub fn generate_preset(
    reference: &GradingImage,
    target: &GradingImage,
    name: &str,
    path: &Path,
    config: &PresetConfig,
) -> Result<PresetDelta> {
    config.validate()?;
    ensure_not_empty("reference", reference)?;
    ensure_not_empty("target", target)?;

    let profile = |image: &GradingImage| {
        let lab = pixels_to_lab(&image.pixels);
        ColorProfile::compute(image, &lab, &config.zones)
    };
    let delta = preset::extract(&profile(reference), &profile(target), config);
    if !delta.is_finite() {
        return Err(GradeError::computation(
            "preset extraction",
            "delta contains non-finite values",
        ));
    }
    preset::xmp::write(&delta, name, path)?;
    Ok(delta)
}
