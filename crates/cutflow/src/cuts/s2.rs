//! S2-based cuts: trigger threshold, width against the diffusion model,
//! single-scatter bounds and area-fraction-top envelopes.

use crate::cut::{CompositeCut, Cut, ExpressionCut};
use crate::dataset::{Column, Dataset};
use crate::error::{CutflowError, Result};
use crate::physics::stats::{chi2_logpdf, clip};
use crate::physics::units;

/// The S2 energy at which the trigger is perfectly efficient.
pub fn s2_threshold() -> Result<ExpressionCut> {
    ExpressionCut::new("S2Threshold", 1, "200 < s2")
}

/// Rejects poorly reconstructed S2s and multiple scatters via the pattern
/// likelihood, 98% quantile acceptance line estimated on Rn220.
pub fn s2_pattern_likelihood() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S2PatternLikelihood",
        1,
        "s2_pattern_fit < 0.0390 * s2 + 609 * s2**0.0602 - 666",
    )
}

/// Event is in the tail of a previous S2.
pub fn s2_tails() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S2Tails",
        0,
        "(~(s2_over_tdiff >= 0)) | (s2_over_tdiff < 0.04)",
    )
}

/// Events with a lot of peak area before the main S2.
pub fn pre_s2_junk() -> Result<ExpressionCut> {
    ExpressionCut::new("PreS2Junk", 1, "area_before_main_s2 - s1 < 300")
}

// Diffusion-model parameters shared by the width cuts.
pub const DIFFUSION_CONSTANT: f64 = 25.26 * (units::CM * units::CM) / units::S;
pub const DRIFT_VELOCITY: f64 = 1.440 * units::UM / units::NS;
/// s2_secondary_sc_gain in the event-builder config.
pub const S2_SECONDARY_GAIN: f64 = 23.0;
/// s2_secondary_sc_width median.
pub const S2_SECONDARY_WIDTH: f64 = 258.41;
pub const SIGMA_TO_R50: f64 = 1.349;
pub const DRIFT_TIME_FROM_GATE: f64 = 1.6 * units::US;

/// Expected S2 width from the diffusion model at a given drift time.
pub fn s2_width_model(drift_time: f64) -> f64 {
    (2.0 * DIFFUSION_CONSTANT * (drift_time - DRIFT_TIME_FROM_GATE)
        / (DRIFT_VELOCITY * DRIFT_VELOCITY))
        .sqrt()
}

/// Compares the S2 width to the diffusion-model expectation at the event's
/// depth. The allowed variation is greater at low energy, where the width
/// fluctuates statistically with the electron count.
///
/// Adds temporary `n_electron` and `norm_width` columns during its
/// pipeline and removes them in `post`.
pub struct S2Width;

impl Cut for S2Width {
    fn tag(&self) -> &str {
        "S2Width"
    }

    fn version(&self) -> u32 {
        6
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let drift_time = dataset.numeric("drift_time")?;
        let s2 = dataset.numeric("s2")?;
        let range_50p = dataset.numeric("s2_range_50p_area")?;

        let rows = dataset.row_count();
        let mut n_electron = vec![f64::NAN; rows];
        let mut norm_width = vec![f64::NAN; rows];
        let mut verdicts = vec![true; rows];

        for i in 0..rows {
            // Events at or above the gate have no meaningful drift.
            if !(drift_time[i] > DRIFT_TIME_FROM_GATE) {
                continue;
            }
            n_electron[i] = clip(s2[i], 0.0, 5000.0) / S2_SECONDARY_GAIN;
            norm_width[i] = ((range_50p[i] / SIGMA_TO_R50).powi(2)
                - S2_SECONDARY_WIDTH.powi(2))
                / s2_width_model(drift_time[i]).powi(2);
            verdicts[i] =
                chi2_logpdf(norm_width[i] * (n_electron[i] - 1.0), n_electron[i]) > -14.0;
        }

        dataset.insert("n_electron", Column::Float(n_electron))?;
        dataset.insert("norm_width", Column::Float(norm_width))?;
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }

    fn post(&self, dataset: &mut Dataset) -> Result<()> {
        dataset.remove("n_electron");
        dataset.remove("norm_width");
        Ok(())
    }
}

/// The largest other S2 must be smaller than a bound interpolating between
/// the photo-ionization regime and the real-scatter regime.
pub struct S2SingleScatter;

impl S2SingleScatter {
    /// Maximum allowed largest-other-S2 area for a given main S2 area.
    pub fn other_s2_bound(s2_area: f64) -> f64 {
        let rescaled_low = s2_area * 0.00832 + 72.3;
        let rescaled_high = s2_area * 0.03 - 109.0;

        let weight_low = 1.0 / (((s2_area - 23_300.0) * 5.91e-4).exp() + 1.0);
        let weight_high = 1.0 / (((23_300.0 - s2_area) * 5.91e-4).exp() + 1.0);

        rescaled_low * weight_low + rescaled_high * weight_high
    }
}

impl Cut for S2SingleScatter {
    fn tag(&self) -> &str {
        "S2SingleScatter"
    }

    fn version(&self) -> u32 {
        4
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let largest_other = dataset.numeric("largest_other_s2")?;
        let s2 = dataset.numeric("s2")?;

        let verdicts = largest_other
            .iter()
            .zip(&s2)
            .map(|(&other, &s2)| other.is_nan() || other < Self::other_s2_bound(s2))
            .collect();
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }
}

/// Low-energy limit of [`S2SingleScatter`], applicable below S2 = 20000.
pub fn s2_single_scatter_simple() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S2SingleScatter",
        2,
        "(~(largest_other_s2 > 0)) | (largest_other_s2 < s2 * 0.00832 + 72.3)",
    )
}

/// S2 area-fraction-top envelope, targeting gas events.
///
/// Version 2 is a simple range chosen by eye; version 3 fits the
/// distribution in S2 slices at the 0.5% and 99.5% quantiles. Any other
/// version has no implementation.
pub fn s2_area_fraction_top(version: u32) -> Result<ExpressionCut> {
    match version {
        2 => ExpressionCut::new(
            "S2AreaFractionTop",
            2,
            "(0.5 < s2_area_fraction_top) & (s2_area_fraction_top < 0.72)",
        ),
        3 => ExpressionCut::new(
            "S2AreaFractionTop",
            3,
            "(s2_area_fraction_top < \
              0.6177399420527526 + 3.713166211522462e-8 * s2 + 0.5460484265254656 / log(s2)) & \
             (s2_area_fraction_top > \
              0.6648160611018054 - 2.590402853814859e-7 * s2 - 0.8531029789184852 / log(s2))",
        ),
        _ => Err(CutflowError::UnsupportedVersion {
            cut: "S2AreaFractionTop".to_string(),
            version,
        }),
    }
}

/// Corrected-S2 area-fraction-top bands, 99% acceptance by design, valid
/// for S2 up to 10000. The `cs2_aft` ratio is computed once and shared by
/// both bounds.
pub fn cs2_area_fraction_top() -> Result<CompositeCut> {
    CompositeCut::new(
        "CS2AreaFractionTop",
        0,
        vec![
            Box::new(ExpressionCut::new(
                "CS2AreaFractionTopUpper",
                0,
                "cs2_aft < 0.63756073 + 1.42873942 / sqrt(s2)",
            )?) as Box<dyn Cut>,
            Box::new(ExpressionCut::new(
                "CS2AreaFractionTopLower",
                0,
                "cs2_aft > 0.62752992 - 1.79928264 / sqrt(s2)",
            )?),
        ],
    )?
    .with_derived("cs2_aft", "cs2_top / cs2")
}

/// 96%-acceptance variant that strongly targets gas events at the top of
/// the TPC.
pub fn cs2_area_fraction_top_96p() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "CS2AreaFractionTop96p",
        0,
        "cs2_aft < 0.63594139 + 0.912103 / sqrt(s2) | z < -9",
    )?
    .with_derived("cs2_aft", "cs2_top / cs2")
}
