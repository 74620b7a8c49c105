//! Image representation for the transfer pipeline.
//!
//! Decoded pixels enter once, are normalized to `[0, 1]` `f64` RGB, and stay
//! that way until [`GradingImage::to_rgb8`] quantizes them for output.

use std::fmt;
use std::io::Write;
use std::path::Path;

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};

/// Supported bit depths for source images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitDepth {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit floating point.
    F32,
    /// Already-normalized `f64` values supplied by the caller.
    F64,
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "8-bit"),
            Self::U16 => write!(f, "16-bit"),
            Self::F32 => write!(f, "32-bit float"),
            Self::F64 => write!(f, "64-bit float"),
        }
    }
}

/// An RGB pixel with channels in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Internal image representation. Row-major, always RGB `f64` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, `width * height` entries.
    pub pixels: Vec<Rgb>,
    /// Original bit depth of the source image.
    pub source_bit_depth: BitDepth,
}

impl GradingImage {
    /// Build an image from normalized pixels.
    ///
    /// Rejects mismatched dimensions, empty images and any channel value
    /// outside `[0, 1]` (including NaN).
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        check_dimensions(width, height, pixels.len())?;
        if let Some((index, px)) = pixels
            .iter()
            .enumerate()
            .find(|(_, px)| px.iter().any(|c| !(0.0..=1.0).contains(c)))
        {
            return Err(GradeError::validation(
                "pixel",
                format!("#{index} = {px:?}"),
                "channel values must be within [0, 1]",
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
            source_bit_depth: BitDepth::F64,
        })
    }

    /// A `width × height` image filled with one color.
    pub fn uniform(width: u32, height: u32, rgb: Rgb) -> Result<Self> {
        Self::from_pixels(width, height, vec![rgb; width as usize * height as usize])
    }

    /// Build an image from interleaved 8-bit RGB samples.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let count = width as usize * height as usize;
        if data.len() != count * 3 {
            return Err(GradeError::format(
                "pixel ingress",
                format!(
                    "expected {} bytes of 3-channel data for {width}x{height}, got {}",
                    count * 3,
                    data.len()
                ),
            ));
        }
        check_dimensions(width, height, count)?;
        let pixels = data
            .chunks_exact(3)
            .map(|c| {
                [
                    f64::from(c[0]) / 255.0,
                    f64::from(c[1]) / 255.0,
                    f64::from(c[2]) / 255.0,
                ]
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
            source_bit_depth: BitDepth::U8,
        })
    }

    /// Convert a decoded image. Only 3-channel layouts are accepted.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
        let (width, height) = (img.width(), img.height());
        match img {
            DynamicImage::ImageRgb8(buf) => Self::from_rgb8(width, height, buf.as_raw()),
            DynamicImage::ImageRgb16(buf) => {
                check_dimensions(width, height, width as usize * height as usize)?;
                let pixels = buf
                    .pixels()
                    .map(|p| p.0.map(|c| f64::from(c) / 65535.0))
                    .collect();
                Ok(Self {
                    width,
                    height,
                    pixels,
                    source_bit_depth: BitDepth::U16,
                })
            }
            DynamicImage::ImageRgb32F(buf) => {
                check_dimensions(width, height, width as usize * height as usize)?;
                // Finite values outside [0, 1] are clamped; NaN and infinities are not data.
                if let Some((index, px)) = buf
                    .pixels()
                    .enumerate()
                    .find(|(_, p)| p.0.iter().any(|c| !c.is_finite()))
                {
                    return Err(GradeError::validation(
                        "pixel",
                        format!("#{index} = {:?}", px.0),
                        "float channel values must be finite",
                    ));
                }
                let pixels = buf
                    .pixels()
                    .map(|p| p.0.map(|c| f64::from(c).clamp(0.0, 1.0)))
                    .collect();
                Ok(Self {
                    width,
                    height,
                    pixels,
                    source_bit_depth: BitDepth::F32,
                })
            }
            other => Err(GradeError::format(
                "pixel ingress",
                format!("unsupported channel layout {:?}, expected RGB", other.color()),
            )),
        }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True when the image holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Per-channel mean in `[0, 1]`.
    pub fn mean_rgb(&self) -> Rgb {
        if self.pixels.is_empty() {
            return [0.0; 3];
        }
        let mut sum = [0.0_f64; 3];
        for px in &self.pixels {
            for c in 0..3 {
                sum[c] += px[c];
            }
        }
        let n = self.pixels.len() as f64;
        sum.map(|s| s / n)
    }

    /// Quantize to 8-bit RGB, clamping out-of-range values.
    pub fn to_rgb8(&self) -> RgbImage {
        let raw: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|px| px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect();
        // Length is width * height * 3 by construction.
        RgbImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

fn check_dimensions(width: u32, height: u32, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(GradeError::validation(
            "image size",
            format!("{width}x{height}"),
            "image must contain at least one pixel",
        ));
    }
    if len != width as usize * height as usize {
        return Err(GradeError::format(
            "pixel ingress",
            format!(
                "{width}x{height} image needs {} pixels, got {len}",
                width as usize * height as usize
            ),
        ));
    }
    Ok(())
}

/// Decode an image file.
///
/// Supports common formats via the `image` crate. Files whose channel layout
/// is not RGB are rejected with a format error rather than converted.
pub fn load_image(path: &Path) -> Result<GradingImage> {
    let img = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(e) => GradeError::io("reading image", path, e),
        source => GradeError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let image = GradingImage::from_dynamic(&img)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        depth = %image.source_bit_depth,
        "loaded image"
    );
    Ok(image)
}

/// Encode an image as 8-bit RGB. The format follows the file extension.
///
/// The file is written through a temporary sibling and renamed into place.
pub fn save_image(image: &GradingImage, path: &Path) -> Result<()> {
    let format = image::ImageFormat::from_path(path).map_err(|_| {
        GradeError::validation(
            "output path",
            path.display(),
            "extension does not name a supported image format",
        )
    })?;
    let rgb = image.to_rgb8();
    crate::atomic::write_with(path, "writing image", |w| {
        let mut buf = std::io::Cursor::new(Vec::new());
        rgb.write_to(&mut buf, format)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        w.write_all(buf.get_ref())
    })
}
