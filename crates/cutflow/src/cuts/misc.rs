//! Cuts that do not fit the S1/S2/DAQ subsystems: krypton
//! mis-identification, PMT flashes, reconstruction consistency and the
//! classifier-based single-electron S2 veto.

use std::sync::Arc;

use crate::cut::{Cut, ExpressionCut};
use crate::dataset::{Column, Dataset};
use crate::error::Result;
use crate::external::PeakClassifier;

/// Rejects Kr83m events where the 9 keV conversion electron's S1 was
/// mis-identified as the main S1.
pub fn krypton_mis_id_s1() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "KryptonMisIdS1",
        0,
        "largest_other_s2 < 100 \
         | largest_other_s2_delay_main_s1 < -3000 \
         | largest_other_s2_delay_main_s1 > 0",
    )
}

/// Events coincident with, or shortly after, a PMT flash.
///
/// Reads the boolean `inside_flash` column directly, so it cannot be a
/// plain expression cut.
pub struct Flash;

impl Cut for Flash {
    fn tag(&self) -> &str {
        "Flash"
    }

    fn version(&self) -> u32 {
        0
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let inside = dataset.boolean("inside_flash")?.to_vec();
        let nearest = dataset.numeric("nearest_flash")?;
        let width = dataset.numeric("flashing_width")?;

        let verdicts = inside
            .iter()
            .zip(&nearest)
            .zip(&width)
            .map(|((&inside, &nearest), &width)| {
                !inside
                    && (nearest.is_nan()
                        || nearest > 120e9
                        || nearest < -10e9 - width * 1e9)
            })
            .collect();
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }
}

/// Requires agreement between the two position reconstruction algorithms.
/// The allowed distance widens at small S2, where both are noisier.
pub struct PosDiff;

impl Cut for PosDiff {
    fn tag(&self) -> &str {
        "PosDiff"
    }

    fn version(&self) -> u32 {
        4
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let x_nn = dataset.numeric("x_observed_nn")?;
        let y_nn = dataset.numeric("y_observed_nn")?;
        let x_tpf = dataset.numeric("x_observed_tpf")?;
        let y_tpf = dataset.numeric("y_observed_tpf")?;
        let s2 = dataset.numeric("s2")?;

        let rows = dataset.row_count();
        let mut verdicts = Vec::with_capacity(rows);
        for i in 0..rows {
            let dx = x_nn[i] - x_tpf[i];
            let dy = y_nn[i] - y_tpf[i];
            let distance = (dx * dx + dy * dy).sqrt();
            let bound = 2_429.322 * (-s2[i].log10() / 0.362).exp() + 1.587;
            verdicts.push(distance < bound);
        }
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }
}

/// Feature columns fed to the single-electron classifiers.
const SE_FEATURES: [&str; 4] = [
    "s1",
    "s1_area_fraction_top",
    "s1_rise_time",
    "s1_range_90p_area",
];

/// Rejects events whose S1 is actually a mis-classified single-electron
/// S2, a dominant accidental-coincidence background below 70 PE.
///
/// Soft-votes a random forest and a gradient-boosted model over S1 shape
/// features; events above 70 PE always pass.
pub struct SingleElectronS2s {
    forest: Arc<dyn PeakClassifier>,
    gbdt: Arc<dyn PeakClassifier>,
}

impl SingleElectronS2s {
    pub fn new(forest: Arc<dyn PeakClassifier>, gbdt: Arc<dyn PeakClassifier>) -> Self {
        Self { forest, gbdt }
    }
}

impl Cut for SingleElectronS2s {
    fn tag(&self) -> &str {
        "SingleElectronS2s"
    }

    fn version(&self) -> u32 {
        5
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let forest = self.forest.predict_probability(dataset, &SE_FEATURES)?;
        let gbdt = self.gbdt.predict_probability(dataset, &SE_FEATURES)?;
        let s1 = dataset.numeric("s1")?;
        let width = dataset.numeric("s1_range_90p_area")?;

        let rows = dataset.row_count();
        let mut verdicts = Vec::with_capacity(rows);
        for i in 0..rows {
            let probability = 0.5 * forest[i] + 0.5 * gbdt[i];
            verdicts.push((probability <= 0.9 && width[i] < 450.0) || s1[i] > 70.0);
        }
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }
}
