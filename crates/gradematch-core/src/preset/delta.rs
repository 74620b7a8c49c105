//! Grading deltas between a reference and a target profile.
//!
//! Every value here answers "how should an editor move the target so it
//! looks like the reference": differences are always `reference - target`.
//! A zone or band missing on either side contributes a zero delta, so the
//! result is finite for any pair of images.

use serde::{Deserialize, Serialize};

use super::curves::{self, ToneCurves};
use crate::config::PresetConfig;
use crate::stats::{ColorProfile, HueBand, HueBandStats, LabStats, Zone};

/// Split-toning saturation per unit of a/b distance in shadows and highlights.
const TINT_SATURATION_GAIN: f64 = 1.5;
/// Color-grade saturation per unit of a/b distance in midtones.
const MIDTONE_SATURATION_GAIN: f64 = 1.0;
/// Clarity per unit of global L standard deviation.
const CLARITY_GAIN: f64 = 25.0 / 15.0;
/// Vibrance per unit of global a/b chroma.
const VIBRANCE_GAIN: f64 = 4.0;

/// Global tone slider moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToneDelta {
    /// Exposure in stops, `[-5, 5]`.
    pub exposure: f64,
    /// `[-100, 100]`.
    pub contrast: f64,
    /// `[-100, 100]`.
    pub highlights: f64,
    /// `[-100, 100]`.
    pub shadows: f64,
    /// `[-100, 100]`, follows `highlights`.
    pub whites: f64,
    /// `[-100, 100]`, follows `shadows`.
    pub blacks: f64,
    /// `[-100, 100]`, follows `clarity`.
    pub texture: f64,
    /// Local contrast from the global L spread, `[-100, 100]`.
    pub clarity: f64,
    /// `[-100, 100]`, follows `clarity`.
    pub dehaze: f64,
    /// From the global a/b chroma, `[-100, 100]`.
    pub vibrance: f64,
    /// `[-10, 10]`, follows `vibrance`.
    pub saturation: f64,
}

impl ToneDelta {
    fn values(&self) -> [f64; 11] {
        [
            self.exposure,
            self.contrast,
            self.highlights,
            self.shadows,
            self.whites,
            self.blacks,
            self.texture,
            self.clarity,
            self.dehaze,
            self.vibrance,
            self.saturation,
        ]
    }
}

/// A hue/saturation tint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    /// Degrees in `[0, 360)`.
    pub hue: f64,
    /// `[0, 100]`.
    pub saturation: f64,
}

impl Tint {
    /// No tint.
    pub const NONE: Self = Self {
        hue: 0.0,
        saturation: 0.0,
    };
}

/// Per-band HSL slider moves, already rounded to slider steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HslOffset {
    /// `[-100, 100]`.
    pub hue: i32,
    /// `[-20, 20]`.
    pub saturation: i32,
    /// `[-20, 25]`.
    pub luminance: i32,
}

/// Everything written into an editor preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetDelta {
    /// Tone sliders.
    pub tone: ToneDelta,
    /// Split-toning shadow tint.
    pub shadow_tint: Tint,
    /// Split-toning highlight tint.
    pub highlight_tint: Tint,
    /// Color-grade midtone tint.
    pub midtone_tint: Tint,
    /// HSL offsets in [`HueBand::ALL`] order.
    pub hsl: [HslOffset; 8],
    /// Parametric and point curves.
    pub curves: ToneCurves,
}

impl PresetDelta {
    /// HSL offsets for one band.
    pub fn hsl(&self, band: HueBand) -> &HslOffset {
        &self.hsl[band.index()]
    }

    /// True when every value is a finite number.
    pub fn is_finite(&self) -> bool {
        let tints = [self.shadow_tint, self.highlight_tint, self.midtone_tint];
        self.tone
            .values()
            .into_iter()
            .chain(tints.into_iter().flat_map(|tint| [tint.hue, tint.saturation]))
            .all(f64::is_finite)
    }
}

/// Derive preset deltas that move `target` toward `reference`.
///
/// Both profiles must have been computed with `config.zones`.
pub fn extract(
    reference: &ColorProfile,
    target: &ColorProfile,
    config: &PresetConfig,
) -> PresetDelta {
    let zone = |z: Zone| (reference.zones.get(z), target.zones.get(z));

    let delta = PresetDelta {
        tone: tone_delta(reference, target),
        shadow_tint: tint_delta(zone(Zone::Shadow), TINT_SATURATION_GAIN, config),
        highlight_tint: tint_delta(zone(Zone::Highlight), TINT_SATURATION_GAIN, config),
        midtone_tint: tint_delta(zone(Zone::Midtone), MIDTONE_SATURATION_GAIN, config),
        hsl: HueBand::ALL.map(|band| {
            hsl_offset(
                reference.hue_bands.get(band),
                target.hue_bands.get(band),
                config.min_band_pixels,
            )
        }),
        curves: curves::extract(&reference.zones, &target.zones),
    };
    tracing::debug!(?delta, "extracted preset delta");
    delta
}

fn tone_delta(reference: &ColorProfile, target: &ColorProfile) -> ToneDelta {
    let l_shift = |zone: Zone| {
        let (r, t) = (reference.zones.get(zone), target.zones.get(zone));
        both_present(r, t).then(|| r.mean[0] - t.mean[0])
    };
    let tonal_range = |p: &ColorProfile| {
        let (sh, hi) = (p.zones.get(Zone::Shadow), p.zones.get(Zone::Highlight));
        (!sh.is_empty() && !hi.is_empty()).then(|| hi.mean[0] - sh.mean[0])
    };
    let range_shift = tonal_range(reference)
        .zip(tonal_range(target))
        .map(|(r, t)| r - t);

    let global = both_present(&reference.global, &target.global);
    let spread_shift = global.then(|| reference.global.std[0] - target.global.std[0]);
    let chroma = |s: &LabStats| s.mean[1].hypot(s.mean[2]);
    let chroma_shift = global.then(|| chroma(&reference.global) - chroma(&target.global));

    let highlights = scaled(l_shift(Zone::Highlight), 40.0 / 20.0, -100.0, 100.0);
    let shadows = scaled(l_shift(Zone::Shadow), 40.0 / 15.0, -100.0, 100.0);
    let clarity = scaled(spread_shift, CLARITY_GAIN, -100.0, 100.0);
    let vibrance = scaled(chroma_shift, VIBRANCE_GAIN, -100.0, 100.0);

    ToneDelta {
        exposure: scaled(l_shift(Zone::Midtone), 0.6 / 50.0, -5.0, 5.0),
        contrast: scaled(range_shift, 1.0, -100.0, 100.0),
        highlights,
        shadows,
        whites: scaled(Some(highlights), 0.4, -100.0, 100.0),
        blacks: scaled(Some(shadows), 0.6, -100.0, 100.0),
        texture: scaled(Some(clarity), 0.2, -100.0, 100.0),
        clarity,
        dehaze: scaled(Some(clarity), 0.5, -100.0, 100.0),
        vibrance,
        saturation: scaled(Some(vibrance), 0.05, -10.0, 10.0),
    }
}

fn tint_delta((r, t): (&LabStats, &LabStats), gain: f64, config: &PresetConfig) -> Tint {
    if !both_present(r, t) {
        return Tint::NONE;
    }
    let da = r.mean[1] - t.mean[1];
    let db = r.mean[2] - t.mean[2];
    let saturation = finite_or_zero((da.hypot(db) * gain).clamp(0.0, 100.0));
    if saturation < config.min_tint_saturation {
        return Tint::NONE;
    }
    Tint {
        hue: finite_or_zero(db.atan2(da).to_degrees().rem_euclid(360.0)),
        saturation,
    }
}

fn hsl_offset(r: &HueBandStats, t: &HueBandStats, min_pixels: usize) -> HslOffset {
    if r.count < min_pixels.max(1) || t.count < min_pixels.max(1) {
        return HslOffset::default();
    }
    // Shortest signed arc, in (-180, 180].
    let mut dh = (r.mean_hue - t.mean_hue).rem_euclid(360.0);
    if dh > 180.0 {
        dh -= 360.0;
    }
    HslOffset {
        hue: slider(dh * 100.0 / 30.0, -100.0, 100.0),
        saturation: slider((r.mean_saturation - t.mean_saturation) * 30.0, -20.0, 20.0),
        luminance: slider((r.mean_value - t.mean_value) * 30.0, -20.0, 25.0),
    }
}

fn both_present(r: &LabStats, t: &LabStats) -> bool {
    !r.is_empty() && !t.is_empty()
}

fn scaled(shift: Option<f64>, gain: f64, lo: f64, hi: f64) -> f64 {
    shift.map_or(0.0, |s| finite_or_zero((s * gain).clamp(lo, hi)))
}

pub(super) fn slider(v: f64, lo: f64, hi: f64) -> i32 {
    finite_or_zero(v.clamp(lo, hi)).round() as i32
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
