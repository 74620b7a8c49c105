//! Evaluate a fitted transfer over a LUT lattice.
//!
//! Every lattice color is graded as a one-pixel target with the same
//! fitted transfer, strength and luminance setting an image would get.

use rayon::prelude::*;

use super::{Lut3D, lattice_point};
use crate::color::lab::pixels_to_lab;
use crate::color::LabPixel;
use crate::config::{LutSize, TransferConfig};
use crate::error::Result;
use crate::image::GradingImage;
use crate::transfer::{FittedTransfer, grade_rgb};

/// LAB values of every lattice color, red-fastest.
///
/// A LUT does not know which image it will be applied to, so the lattice
/// itself stands in as the target distribution when fitting.
pub fn lattice_lab(size: LutSize) -> Vec<LabPixel> {
    let n = size.edge();
    let lattice: Vec<_> = (0..size.entries()).map(|i| lattice_point(n, i)).collect();
    pixels_to_lab(&lattice)
}

/// Fit `config.method` from `reference` against the identity lattice.
pub fn fit_for_lattice(
    reference: &GradingImage,
    config: &TransferConfig,
    size: LutSize,
) -> Result<FittedTransfer> {
    let reference_lab = pixels_to_lab(&reference.pixels);
    FittedTransfer::fit(&reference_lab, &lattice_lab(size), config)
}

/// Sample `fitted` on a `size³` lattice, red-fastest.
pub fn sample(fitted: &FittedTransfer, config: &TransferConfig, size: LutSize) -> Lut3D {
    let n = size.edge();
    let data = (0..size.entries())
        .into_par_iter()
        .map(|i| grade_rgb(fitted, lattice_point(n, i), config))
        .collect();
    Lut3D { size: n, data }
}
