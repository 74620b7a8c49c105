//! The fitted form of each transfer strategy.

use super::global::GlobalLabTransfer;
use super::histogram::HistogramTransfer;
use super::zone::ZoneTransfer;
use crate::color::{LabPixel, clamp_lab};
use crate::config::{TransferConfig, TransferMethod, ZoneThresholds};
use crate::error::{GradeError, Result};
use crate::stats::{ZoneSet, global_stats};

/// A transfer fitted to one (reference, target) pair, ready to evaluate
/// pointwise on any LAB value.
///
/// Fitting reads both distributions once; [`FittedTransfer::apply`] is
/// then a pure function, so images and LUT lattices can be mapped in
/// parallel with the same fitted value.
#[derive(Debug, Clone, PartialEq)]
pub enum FittedTransfer {
    /// Whole-image affine.
    GlobalLab(GlobalLabTransfer),
    /// Per-zone affine with ramped blending.
    ZoneBased(ZoneTransfer),
    /// Per-channel inverse-CDF matching.
    Histogram(HistogramTransfer),
    /// `histogram_weight * histogram + (1 - histogram_weight) * zone`.
    Improved {
        histogram: HistogramTransfer,
        zone: ZoneTransfer,
        histogram_weight: f64,
    },
}

impl FittedTransfer {
    /// Fit `config.method` to move `target` toward `reference`.
    ///
    /// Zone thresholds come from `config.zones`, or from the reference's L
    /// percentiles when `config.adaptive_zones` is set; either way both
    /// sides are partitioned identically.
    pub fn fit(
        reference: &[LabPixel],
        target: &[LabPixel],
        config: &TransferConfig,
    ) -> Result<Self> {
        let thresholds = if config.adaptive_zones {
            let t = ZoneThresholds::adaptive(reference);
            tracing::debug!(
                shadow_max = t.shadow_max,
                highlight_min = t.highlight_min,
                "adaptive zone thresholds"
            );
            t
        } else {
            config.zones
        };

        let fitted = match config.method {
            TransferMethod::GlobalLab => {
                let (r, t) = (global_stats(reference), global_stats(target));
                ensure_finite("global statistics", r.is_finite() && t.is_finite())?;
                Self::GlobalLab(GlobalLabTransfer::fit(&r, &t))
            }
            TransferMethod::ZoneBased => {
                Self::ZoneBased(fit_zones(reference, target, &thresholds, config)?)
            }
            TransferMethod::Histogram => Self::Histogram(HistogramTransfer::fit(
                reference,
                target,
                config.histogram_quantiles,
            )),
            TransferMethod::Improved => Self::Improved {
                histogram: HistogramTransfer::fit(reference, target, config.histogram_quantiles),
                zone: fit_zones(reference, target, &thresholds, config)?,
                histogram_weight: config.improved_histogram_weight,
            },
        };
        Ok(fitted)
    }

    /// Which strategy this is.
    pub fn method(&self) -> TransferMethod {
        match self {
            Self::GlobalLab(_) => TransferMethod::GlobalLab,
            Self::ZoneBased(_) => TransferMethod::ZoneBased,
            Self::Histogram(_) => TransferMethod::Histogram,
            Self::Improved { .. } => TransferMethod::Improved,
        }
    }

    /// Full-strength mapping of one LAB pixel, clamped to the LAB range.
    pub fn apply(&self, px: LabPixel) -> LabPixel {
        let out = match self {
            Self::GlobalLab(t) => t.apply(px),
            Self::ZoneBased(t) => t.apply(px),
            Self::Histogram(t) => t.apply(px),
            Self::Improved {
                histogram,
                zone,
                histogram_weight,
            } => {
                let h = histogram.apply(px);
                let z = zone.apply(px);
                let w = *histogram_weight;
                [
                    w * h[0] + (1.0 - w) * z[0],
                    w * h[1] + (1.0 - w) * z[1],
                    w * h[2] + (1.0 - w) * z[2],
                ]
            }
        };
        clamp_lab(out)
    }
}

fn fit_zones(
    reference: &[LabPixel],
    target: &[LabPixel],
    thresholds: &ZoneThresholds,
    config: &TransferConfig,
) -> Result<ZoneTransfer> {
    let r = ZoneSet::compute(reference, thresholds);
    let t = ZoneSet::compute(target, thresholds);
    let finite = [&r, &t]
        .iter()
        .all(|set| set.shadow.is_finite() && set.midtone.is_finite() && set.highlight.is_finite());
    ensure_finite("zone statistics", finite)?;
    Ok(ZoneTransfer::fit(&r, &t, config.transition_width))
}

fn ensure_finite(stage: &'static str, finite: bool) -> Result<()> {
    if finite {
        Ok(())
    } else {
        Err(GradeError::computation(stage, "non-finite mean or deviation"))
    }
}
