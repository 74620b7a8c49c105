//! Configuration values passed explicitly into every engine call.
//!
//! Nothing here is global: two concurrent calls with different configs
//! never observe each other's settings. All structs round-trip through
//! JSON so that a caller can persist a reproducible grade.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};

/// Default split between shadows and midtones on the L axis (0..100).
pub const DEFAULT_SHADOW_MAX: f64 = 100.0 / 3.0;
/// Default split between midtones and highlights on the L axis (0..100).
pub const DEFAULT_HIGHLIGHT_MIN: f64 = 200.0 / 3.0;
/// Width (in L units) of the linear ramp straddling each zone boundary.
pub const DEFAULT_TRANSITION_WIDTH: f64 = 8.0;
/// Weight of the histogram-matched result in the `improved` method.
/// The zone-based result gets `1 - weight`.
pub const DEFAULT_IMPROVED_HISTOGRAM_WEIGHT: f64 = 0.5;
/// Order statistics retained per channel for histogram matching.
pub const DEFAULT_HISTOGRAM_QUANTILES: usize = 4096;
/// Display name written into `.cube` headers when none is given.
pub const DEFAULT_LUT_TITLE: &str = "gradematch";

/// The four interchangeable transfer strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMethod {
    /// Whole-image mean/std matching per LAB channel (Reinhard).
    GlobalLab,
    /// Mean/std matching per luminance zone with ramped blending.
    ZoneBased,
    /// Per-channel inverse-CDF matching.
    Histogram,
    /// Weighted mix of `Histogram` and `ZoneBased`.
    Improved,
}

impl TransferMethod {
    /// Identifier used on the invocation surface.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GlobalLab => "global_lab",
            Self::ZoneBased => "zone_based",
            Self::Histogram => "histogram",
            Self::Improved => "improved",
        }
    }

    /// All methods in menu order.
    pub fn all() -> &'static [Self] {
        const ALL: [TransferMethod; 4] = [
            TransferMethod::GlobalLab,
            TransferMethod::ZoneBased,
            TransferMethod::Histogram,
            TransferMethod::Improved,
        ];
        &ALL
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransferMethod {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| {
                GradeError::validation(
                    "method",
                    s,
                    "expected one of global_lab, zone_based, histogram, improved",
                )
            })
    }
}

/// Lattice resolution of a generated 3D LUT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LutSize {
    /// 17³ entries. Small files, coarse.
    N17,
    /// 33³ entries. The usual trade-off.
    #[default]
    N33,
    /// 65³ entries. Finishing quality.
    N65,
}

impl LutSize {
    /// Entries per axis.
    pub const fn edge(self) -> usize {
        match self {
            Self::N17 => 17,
            Self::N33 => 33,
            Self::N65 => 65,
        }
    }

    /// Total lattice points (`edge³`).
    pub const fn entries(self) -> usize {
        let n = self.edge();
        n * n * n
    }
}

impl TryFrom<u32> for LutSize {
    type Error = GradeError;

    fn try_from(n: u32) -> Result<Self> {
        match n {
            17 => Ok(Self::N17),
            33 => Ok(Self::N33),
            65 => Ok(Self::N65),
            other => Err(GradeError::validation(
                "grid size",
                other,
                "expected 17, 33 or 65",
            )),
        }
    }
}

impl From<LutSize> for u32 {
    fn from(size: LutSize) -> Self {
        size.edge() as u32
    }
}

/// Boundaries splitting L (0..100) into shadow, midtone and highlight zones.
///
/// Zones are half-open: `[0, shadow_max)`, `[shadow_max, highlight_min)`,
/// `[highlight_min, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    /// Upper (exclusive) L bound of the shadow zone.
    pub shadow_max: f64,
    /// Lower (inclusive) L bound of the highlight zone.
    pub highlight_min: f64,
}

impl Default for ZoneThresholds {
    /// Equal thirds of the L range.
    fn default() -> Self {
        Self {
            shadow_max: DEFAULT_SHADOW_MAX,
            highlight_min: DEFAULT_HIGHLIGHT_MIN,
        }
    }
}

impl ZoneThresholds {
    /// Check that the boundaries are ordered and inside `[0, 100]`.
    pub fn validate(&self) -> Result<()> {
        let ok = self.shadow_max.is_finite()
            && self.highlight_min.is_finite()
            && 0.0 < self.shadow_max
            && self.shadow_max < self.highlight_min
            && self.highlight_min < 100.0;
        if ok {
            Ok(())
        } else {
            Err(GradeError::validation(
                "zone thresholds",
                format!("{}..{}", self.shadow_max, self.highlight_min),
                "expected 0 < shadow_max < highlight_min < 100",
            ))
        }
    }
}

/// Everything that selects and shapes a transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Strategy used to map target statistics onto the reference.
    pub method: TransferMethod,
    /// Blend factor between the untouched target (0) and full effect (1).
    pub strength: f64,
    /// Keep the target's L channel; transfer chrominance only.
    pub preserve_luminance: bool,
    /// Zone boundaries, used for both reference and target.
    pub zones: ZoneThresholds,
    /// Derive zone boundaries from the reference's L percentiles instead of
    /// `zones`. The derived boundaries are still shared by both images.
    pub adaptive_zones: bool,
    /// Width of the linear ramp across each zone boundary.
    pub transition_width: f64,
    /// Histogram share of the `improved` mix.
    pub improved_histogram_weight: f64,
    /// Cap on order statistics kept per channel by histogram matching.
    pub histogram_quantiles: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            method: TransferMethod::ZoneBased,
            strength: 1.0,
            preserve_luminance: false,
            zones: ZoneThresholds::default(),
            adaptive_zones: false,
            transition_width: DEFAULT_TRANSITION_WIDTH,
            improved_histogram_weight: DEFAULT_IMPROVED_HISTOGRAM_WEIGHT,
            histogram_quantiles: DEFAULT_HISTOGRAM_QUANTILES,
        }
    }
}

impl TransferConfig {
    /// Default config using `method`.
    pub fn with_method(method: TransferMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GradeError::format("transfer config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GradeError::io("reading config", path, e))?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GradeError::format("transfer config", e.to_string()))
    }

    /// Reject parameters outside their documented domains.
    ///
    /// Called by every engine entry point before any pixel is touched.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(GradeError::validation(
                "strength",
                self.strength,
                "must be within [0, 1]",
            ));
        }
        self.zones.validate()?;
        if !self.transition_width.is_finite() || self.transition_width < 0.0 {
            return Err(GradeError::validation(
                "transition width",
                self.transition_width,
                "must be a non-negative number",
            ));
        }
        if !(0.0..=1.0).contains(&self.improved_histogram_weight) {
            return Err(GradeError::validation(
                "improved histogram weight",
                self.improved_histogram_weight,
                "must be within [0, 1]",
            ));
        }
        if self.histogram_quantiles < 2 {
            return Err(GradeError::validation(
                "histogram quantiles",
                self.histogram_quantiles,
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Tunables for preset extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Zone boundaries shared by reference and target.
    pub zones: ZoneThresholds,
    /// Minimum saturated pixels a hue band needs on both sides before an
    /// HSL offset is emitted for it.
    pub min_band_pixels: usize,
    /// Split-toning saturations below this are written as zero.
    pub min_tint_saturation: f64,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            zones: ZoneThresholds::default(),
            min_band_pixels: 100,
            min_tint_saturation: 2.0,
        }
    }
}

impl PresetConfig {
    /// Reject parameters outside their documented domains.
    pub fn validate(&self) -> Result<()> {
        self.zones.validate()?;
        if !self.min_tint_saturation.is_finite() || self.min_tint_saturation < 0.0 {
            return Err(GradeError::validation(
                "minimum tint saturation",
                self.min_tint_saturation,
                "must be a non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_round_trip() {
        for method in TransferMethod::all() {
            let parsed: TransferMethod = method.name().parse().unwrap();
            assert_eq!(parsed, *method);
        }
    }

    #[test]
    fn test_unknown_method_is_validation_error() {
        let err = "reinhard".parse::<TransferMethod>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_lut_size_accepts_only_known_grids() {
        assert_eq!(LutSize::try_from(17).unwrap().entries(), 4913);
        assert_eq!(LutSize::try_from(65).unwrap().entries(), 274_625);
        assert!(LutSize::try_from(32).is_err());
        assert_eq!(LutSize::default(), LutSize::N33);
    }

    #[test]
    fn test_strength_out_of_range_rejected() {
        let config = TransferConfig {
            strength: 1.2,
            ..TransferConfig::default()
        };
        assert!(config.validate().unwrap_err().is_validation());

        let config = TransferConfig {
            strength: f64::NAN,
            ..TransferConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let zones = ZoneThresholds {
            shadow_max: 70.0,
            highlight_min: 30.0,
        };
        assert!(zones.validate().is_err());
        assert!(ZoneThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_json_fills_defaults() {
        let config =
            TransferConfig::from_json_str(r#"{ "method": "histogram", "strength": 0.4 }"#)
                .unwrap();
        assert_eq!(config.method, TransferMethod::Histogram);
        assert!((config.strength - 0.4).abs() < 1e-12);
        assert_eq!(config.zones, ZoneThresholds::default());
        assert!(!config.preserve_luminance);
    }

    #[test]
    fn test_json_rejects_bad_strength() {
        let err = TransferConfig::from_json_str(r#"{ "strength": 2.0 }"#).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_json_round_trip() {
        let config = TransferConfig {
            method: TransferMethod::Improved,
            preserve_luminance: true,
            ..TransferConfig::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"improved\""), "{json}");
        let back = TransferConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grade.json");
        std::fs::write(&path, r#"{ "method": "global_lab", "preserve_luminance": true }"#).unwrap();
        let config = TransferConfig::from_json_file(&path).unwrap();
        assert_eq!(config.method, TransferMethod::GlobalLab);
        assert!(config.preserve_luminance);

        let err = TransferConfig::from_json_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, GradeError::Io { .. }), "{err}");
    }

    #[test]
    fn test_preset_config_defaults() {
        let config = PresetConfig::default();
        assert_eq!(config.min_band_pixels, 100);
        assert!(config.validate().is_ok());
        let bad = PresetConfig {
            min_tint_saturation: -1.0,
            ..PresetConfig::default()
        };
        assert!(bad.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_lut_size_serializes_as_integer() {
        let json = serde_json::to_string(&LutSize::N17).unwrap();
        assert_eq!(json, "17");
        let size: LutSize = serde_json::from_str("65").unwrap();
        assert_eq!(size, LutSize::N65);
        assert!(serde_json::from_str::<LutSize>("64").is_err());
    }
}
