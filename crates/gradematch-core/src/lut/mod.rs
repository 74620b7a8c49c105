//! 3D lookup tables: sampling a fitted transfer, `.cube` I/O, Hald CLUTs.

pub mod cube;
pub mod hald;
pub mod sampler;

pub use sampler::sample;

use crate::error::{GradeError, Result};
use crate::image::Rgb;

/// A 3D lookup table on a uniform lattice over `[0, 1]³`.
///
/// Entries are stored red-fastest, then green, then blue: the entry for
/// lattice point `(r, g, b)` lives at `r + g * size + b * size²`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Lattice points per axis.
    pub size: usize,
    /// Output RGB per lattice point. Length = size³.
    pub data: Vec<Rgb>,
}

/// Largest lattice accepted from files or callers (256³ ≈ 16.7M entries).
pub const MAX_SIZE: usize = 256;

impl Lut3D {
    /// Wrap existing entries, checking the length against `size`.
    pub fn from_data(size: usize, data: Vec<Rgb>) -> Result<Self> {
        let expected = entries(size)?;
        if data.len() != expected {
            return Err(GradeError::format(
                "lut",
                format!("{size}³ LUT needs {expected} entries, got {}", data.len()),
            ));
        }
        Ok(Self { size, data })
    }

    /// The LUT that maps every color to itself.
    pub fn identity(size: usize) -> Result<Self> {
        let data = (0..entries(size)?)
            .map(|i| lattice_point(size, i))
            .collect();
        Ok(Self { size, data })
    }

    /// Number of entries (`size³`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of lattice point `(r, g, b)`.
    #[inline]
    pub fn index(&self, r: usize, g: usize, b: usize) -> usize {
        r + g * self.size + b * self.size * self.size
    }

    /// Entry at lattice point `(r, g, b)`.
    pub fn lookup(&self, r: usize, g: usize, b: usize) -> Rgb {
        self.data[self.index(r, g, b)]
    }

    /// Apply to an RGB value with trilinear interpolation. Inputs outside
    /// `[0, 1]` are clamped to the domain. A table too small to interpolate
    /// passes the input through.
    pub fn apply(&self, rgb: Rgb) -> Rgb {
        if self.size < 2 || self.size.checked_pow(3).is_none_or(|n| self.data.len() < n) {
            return rgb;
        }
        let max = (self.size - 1) as f64;
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        let mut frac = [0.0; 3];
        for c in 0..3 {
            let pos = if rgb[c].is_nan() { 0.0 } else { rgb[c].clamp(0.0, 1.0) * max };
            lo[c] = (pos.floor() as usize).min(self.size - 2);
            hi[c] = lo[c] + 1;
            frac[c] = pos - lo[c] as f64;
        }

        let corner = |r: usize, g: usize, b: usize| self.lookup(r, g, b);
        let mut out = [0.0; 3];
        for c in 0..3 {
            let c00 = lerp(corner(lo[0], lo[1], lo[2])[c], corner(hi[0], lo[1], lo[2])[c], frac[0]);
            let c10 = lerp(corner(lo[0], hi[1], lo[2])[c], corner(hi[0], hi[1], lo[2])[c], frac[0]);
            let c01 = lerp(corner(lo[0], lo[1], hi[2])[c], corner(hi[0], lo[1], hi[2])[c], frac[0]);
            let c11 = lerp(corner(lo[0], hi[1], hi[2])[c], corner(hi[0], hi[1], hi[2])[c], frac[0]);
            let c0 = lerp(c00, c10, frac[1]);
            let c1 = lerp(c01, c11, frac[1]);
            out[c] = lerp(c0, c1, frac[2]);
        }
        out
    }
}

/// `size³`, for sizes in `2..=MAX_SIZE`.
fn entries(size: usize) -> Result<usize> {
    if !(2..=MAX_SIZE).contains(&size) {
        return Err(GradeError::validation(
            "grid size",
            size,
            format!("a LUT needs between 2 and {MAX_SIZE} points per axis"),
        ));
    }
    Ok(size * size * size)
}

/// Input color of flat lattice index `i` in a `size³` lattice.
pub fn lattice_point(size: usize, i: usize) -> Rgb {
    let max = (size - 1) as f64;
    let r = i % size;
    let g = (i / size) % size;
    let b = i / (size * size);
    [r as f64 / max, g as f64 / max, b as f64 / max]
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
