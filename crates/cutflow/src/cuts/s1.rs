//! S1-based cuts: interaction pairing, energy range, pattern and width
//! checks targeting accidental coincidences of lone S1s and lone S2s.

use crate::cut::{CompositeCut, Cut, ExpressionCut, IntervalCut};
use crate::cuts::s2::{DRIFT_TIME_FROM_GATE, S2_SECONDARY_GAIN, S2_SECONDARY_WIDTH, SIGMA_TO_R50, s2_width_model};
use crate::dataset::{Column, Dataset};
use crate::error::Result;
use crate::physics::stats::{chi2_logpdf, clip};

/// There was a pairing of S1 and S2.
pub fn interaction_exists() -> Result<ExpressionCut> {
    ExpressionCut::new("InteractionExists", 0, "0 < cs1")
}

/// The main interaction's peaks are larger than any other peak.
pub fn interaction_peaks_biggest() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "InteractionPeaksBiggest",
        0,
        "(s1 > largest_other_s1) & (s2 > largest_other_s2)",
    )
}

/// Energy selection isolating the low-energy band.
pub fn s1_low_energy_range() -> IntervalCut {
    IntervalCut::new("S1LowEnergyRange", 0, "cs1", 0.0, 200.0)
}

/// Rejects events mostly seen by one PMT, e.g. afterpulses or light
/// emission. 99% quantile fit on Rn220.
pub fn s1_max_pmt() -> Result<ExpressionCut> {
    ExpressionCut::new("S1MaxPMT", 0, "s1_largest_hit_area < 0.052 * s1 + 4.15")
}

/// Pattern-likelihood acceptance bands for top and bottom PMT arrays,
/// rejecting accidental coincidences of lone S1s and lone S2s.
pub fn s1_pattern_likelihood() -> Result<CompositeCut> {
    let top = ExpressionCut::new(
        "S1TopPatternLikelihood",
        3,
        "s1_pattern_fit - s1_pattern_fit_bottom < \
         13.0 + 2.3*s1t**0.5 + 8.0*s1t - 1.0*s1t**1.5 + 0.04*s1t**2.0",
    )?
    .with_derived("s1t", "s1 * s1_area_fraction_top")?;

    let bottom = ExpressionCut::new(
        "S1BottomPatternLikelihood",
        3,
        "s1_pattern_fit_bottom < \
         -10.5 + 21.9*s1b**0.5 + 1.44*s1b - 0.21*s1b**1.5 + 0.0064*s1b**2.0",
    )?
    .with_derived("s1b", "s1 * (1 - s1_area_fraction_top)")?;

    CompositeCut::new(
        "S1PatternLikelihood",
        3,
        vec![Box::new(top) as Box<dyn Cut>, Box::new(bottom)],
    )
}

/// S1 width envelope removing anomalous (probably accidental-coincidence)
/// leakage candidates.
pub fn s1_width() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S1Width",
        1,
        "s1_range_90p_area < 251.528247 + 11.50 * s1**1.171407 * exp(-0.057395 * s1)",
    )
}

/// Binomial-test p-value on the fraction of S1 photons seen by the top
/// array, given the expected probability at the event's position.
pub fn s1_area_fraction_top() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S1AreaFractionTop",
        4,
        "s1_area_fraction_top_probability > 0.001",
    )
}

/// Rejects accidental coincidences near the upper Rn220 injection point.
pub fn s1_area_upper_injection_fraction() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S1AreaUpperInjectionFraction",
        1,
        "s1_area_upper_injection_fraction < 0.0865 + 1.205 / s1**0.83367",
    )
}

/// Rejects accidental coincidences near the lower Rn220 injection point.
pub fn s1_area_lower_injection_fraction() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "S1AreaLowerInjectionFraction",
        0,
        "s1_area_lower_injection_fraction < 0.0550 + 1.56 / s1**0.87000",
    )
}

/// Requires that no S1 recorded before the largest S2 could have formed a
/// second valid interaction with it.
///
/// If pairing the alternate S1 with the main S2 would pass the S2 width
/// model, the main S1 may have been mis-identified, and the event is cut.
pub struct S1SingleScatter;

impl Cut for S1SingleScatter {
    fn tag(&self) -> &str {
        "S1SingleScatter"
    }

    fn version(&self) -> u32 {
        4
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let alt_drift = dataset.numeric("alt_s1_interaction_drift_time")?;
        let s2 = dataset.numeric("s2")?;
        let s2_range_50p = dataset.numeric("s2_range_50p_area")?;

        let verdicts = alt_drift
            .iter()
            .zip(&s2)
            .zip(&s2_range_50p)
            .map(|((&drift, &s2), &range_50p)| {
                if !(drift > DRIFT_TIME_FROM_GATE) {
                    // No alternate interaction to worry about.
                    return true;
                }
                let n_electron = clip(s2, 0.0, 5000.0) / S2_SECONDARY_GAIN;
                let mut rel_width =
                    (range_50p / SIGMA_TO_R50).powi(2) - S2_SECONDARY_WIDTH.powi(2);
                rel_width /= s2_width_model(drift).powi(2);
                let alt_passes =
                    chi2_logpdf(rel_width * (n_electron - 1.0), n_electron) > -20.0;
                !alt_passes
            })
            .collect();
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }
}
