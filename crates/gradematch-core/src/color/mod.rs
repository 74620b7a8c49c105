//! Color math: sRGB ↔ CIE LAB conversion, and HSV for hue-band statistics.

pub mod hsv;
pub mod lab;

pub use lab::{LabPixel, clamp_lab, lab_to_rgb, rgb_to_lab};
