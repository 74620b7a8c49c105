//! Editor preset export: profile deltas, tone curves and their XMP rendering.

pub mod curves;
pub mod delta;
pub mod xmp;

pub use curves::{ParametricCurve, ToneCurves};
pub use delta::{HslOffset, PresetDelta, Tint, ToneDelta, extract};
