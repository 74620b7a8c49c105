//! Parametric and point tone curves.
//!
//! Point curves live on the editor's 0..=255 grid. Each curve starts from
//! the identity and only its interior anchors move:
//!
//! ```text
//! master   (0,0) (63,·)  (141,141) (255,255)    · = shadow L shift
//! R, G, B  (0,0) (25,·)  (128,·)   (200,·) (255,255)
//!                shadow  midtone   highlight    a/b shifts per zone
//! ```
//!
//! Channel shifts follow the LAB axes: +a pushes red and pulls green,
//! +b pushes red a little and pulls blue. Every shift is bounded well
//! below the gap to the next anchor, so curves stay monotone.

use serde::{Deserialize, Serialize};

use super::delta::slider;
use crate::stats::{LabStats, Zone, ZoneSet};

/// One `(input, output)` anchor on the 0..=255 grid.
pub type CurvePoint = [i32; 2];

/// Parametric-curve region sliders and their split points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametricCurve {
    /// `[-50, 50]`.
    pub shadows: i32,
    /// `[-50, 50]`.
    pub darks: i32,
    /// `[-50, 50]`.
    pub lights: i32,
    /// `[-50, 50]`.
    pub highlights: i32,
    /// Shadows/darks boundary, percent of the input range.
    pub shadow_split: i32,
    /// Darks/lights boundary.
    pub midtone_split: i32,
    /// Lights/highlights boundary.
    pub highlight_split: i32,
}

impl ParametricCurve {
    /// Flat regions at the editor's default splits.
    pub const NEUTRAL: Self = Self {
        shadows: 0,
        darks: 0,
        lights: 0,
        highlights: 0,
        shadow_split: 25,
        midtone_split: 50,
        highlight_split: 75,
    };
}

impl Default for ParametricCurve {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Every curve written into a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneCurves {
    /// Parametric region sliders.
    pub parametric: ParametricCurve,
    /// Master point curve.
    pub master: [CurvePoint; 4],
    /// Red channel point curve.
    pub red: [CurvePoint; 5],
    /// Green channel point curve.
    pub green: [CurvePoint; 5],
    /// Blue channel point curve.
    pub blue: [CurvePoint; 5],
}

const MASTER_X: [i32; 4] = [0, 63, 141, 255];
const CHANNEL_X: [i32; 5] = [0, 25, 128, 200, 255];

impl ToneCurves {
    /// Curves that leave the image untouched.
    pub const IDENTITY: Self = Self {
        parametric: ParametricCurve::NEUTRAL,
        master: identity_points(MASTER_X),
        red: identity_points(CHANNEL_X),
        green: identity_points(CHANNEL_X),
        blue: identity_points(CHANNEL_X),
    };
}

impl Default for ToneCurves {
    fn default() -> Self {
        Self::IDENTITY
    }
}

const fn identity_points<const N: usize>(xs: [i32; N]) -> [CurvePoint; N] {
    let mut points = [[0; 2]; N];
    let mut i = 0;
    while i < N {
        points[i] = [xs[i], xs[i]];
        i += 1;
    }
    points
}

/// `reference - target` mean shift of one zone; zero if either side is empty.
#[derive(Debug, Clone, Copy, Default)]
struct ZoneShift {
    l: f64,
    a: f64,
    b: f64,
}

impl ZoneShift {
    fn between(reference: &LabStats, target: &LabStats) -> Self {
        if reference.is_empty() || target.is_empty() {
            return Self::default();
        }
        Self {
            l: reference.mean[0] - target.mean[0],
            a: reference.mean[1] - target.mean[1],
            b: reference.mean[2] - target.mean[2],
        }
    }
}

/// Curves that move `target`'s zones toward `reference`'s.
pub fn extract(reference: &ZoneSet, target: &ZoneSet) -> ToneCurves {
    let shift = |zone: Zone| ZoneShift::between(reference.get(zone), target.get(zone));
    let (sh, mid, hi) = (shift(Zone::Shadow), shift(Zone::Midtone), shift(Zone::Highlight));

    let parametric = ParametricCurve {
        shadows: bounded(sh.l * 0.8, 50),
        darks: bounded(sh.l, 50),
        lights: bounded(hi.l * 0.6, 50),
        highlights: bounded(hi.l * 0.4, 50),
        ..ParametricCurve::NEUTRAL
    };

    let mut master = identity_points(MASTER_X);
    master[1][1] += bounded(sh.l * 0.5, 17);

    let red = channel_curve([
        bounded(sh.a * 0.12 + sh.b * 0.05, 12),
        bounded(mid.a * 0.08 + mid.b * 0.03, 8),
        bounded(hi.a * 0.10 + hi.b * 0.04, 10),
    ]);
    let green = channel_curve([
        bounded(-sh.a * 0.10, 10),
        bounded(-mid.a * 0.06, 6),
        bounded(-hi.a * 0.08, 8),
    ]);
    let blue = channel_curve([
        bounded(-sh.b * 0.15 - sh.a * 0.05, 15),
        bounded(-mid.b * 0.08, 8),
        bounded(-hi.b * 0.12 - hi.a * 0.04, 12),
    ]);

    ToneCurves {
        parametric,
        master,
        red,
        green,
        blue,
    }
}

/// Identity channel curve with its shadow, midtone and highlight anchors
/// raised by `shifts`.
fn channel_curve(shifts: [i32; 3]) -> [CurvePoint; 5] {
    let mut points = identity_points(CHANNEL_X);
    for (point, shift) in points[1..4].iter_mut().zip(shifts) {
        point[1] += shift;
    }
    points
}

fn bounded(v: f64, limit: i32) -> i32 {
    slider(v, -f64::from(limit), f64::from(limit))
}
