//! The standard analysis selections, each a named composite built by
//! editing the all-energy base list.

use std::sync::Arc;

use crate::cut::{CompositeCut, Cut};
use crate::cuts::{daq, fiducial, misc, s1, s2};
use crate::error::Result;
use crate::external::{PeakClassifier, RunInfoService};
use crate::selection::{SelectionBuilder, TagMatcher};

/// External services the standard selections depend on.
///
/// Cloning is cheap; the services are shared behind `Arc`.
#[derive(Clone)]
pub struct Collaborators {
    pub run_info: Arc<dyn RunInfoService>,
    pub forest: Arc<dyn PeakClassifier>,
    pub gbdt: Arc<dyn PeakClassifier>,
}

fn boxed(cut: impl Cut + 'static) -> Box<dyn Cut> {
    Box::new(cut)
}

/// The energy-independent base selection.
pub fn all_energy(collaborators: &Collaborators) -> Result<CompositeCut> {
    let children: Vec<Box<dyn Cut>> = vec![
        boxed(fiducial::fiducial_z_optimized()?),
        boxed(s1::interaction_exists()?),
        boxed(s2::s2_threshold()?),
        boxed(s1::interaction_peaks_biggest()?),
        boxed(s2::cs2_area_fraction_top()?),
        boxed(s2::S2SingleScatter),
        boxed(s2::S2Width),
        boxed(daq::daq_veto(collaborators.run_info.clone())?),
        boxed(s1::S1SingleScatter),
        boxed(s2::s2_pattern_likelihood()?),
        boxed(misc::krypton_mis_id_s1()?),
        boxed(misc::Flash),
        boxed(misc::PosDiff),
        boxed(misc::SingleElectronS2s::new(
            collaborators.forest.clone(),
            collaborators.gbdt.clone(),
        )),
    ];
    CompositeCut::new("AllEnergy", 0, children)
}

/// Low-energy selection tuned on Rn220 calibration data.
///
/// Restricts the energy range, swaps the S2 single-scatter cut for its
/// low-energy limit and adds the S1 shape cuts plus the Rn220 injection
/// cuts.
pub fn low_energy_rn220(collaborators: &Collaborators) -> Result<CompositeCut> {
    SelectionBuilder::from_selection("LowEnergyRn220", 0, all_energy(collaborators)?)
        .substitute("InteractionExists", boxed(s1::s1_low_energy_range()))
        .substitute("S2SingleScatter", boxed(s2::s2_single_scatter_simple()?))
        .append(vec![
            boxed(s1::s1_pattern_likelihood()?),
            boxed(s1::s1_max_pmt()?),
            boxed(s1::s1_area_fraction_top()?),
            boxed(s1::s1_width()?),
            boxed(s1::s1_area_upper_injection_fraction()?),
            boxed(s1::s1_area_lower_injection_fraction()?),
        ])
        .build()
}

/// Low-energy selection for background (dark-matter search) data, adding
/// cuts that are unsafe to tune on calibration data alone.
pub fn low_energy_background(collaborators: &Collaborators) -> Result<CompositeCut> {
    SelectionBuilder::from_selection(
        "LowEnergyBackground",
        0,
        low_energy_rn220(collaborators)?,
    )
    .append(vec![
        boxed(s2::pre_s2_junk()?),
        boxed(s2::s2_tails()?),
        boxed(daq::muon_veto()?),
    ])
    .build()
}

/// Low-energy selection for AmBe neutron calibration data, where the
/// Rn220 injection cuts do not apply.
pub fn low_energy_ambe(collaborators: &Collaborators) -> Result<CompositeCut> {
    SelectionBuilder::from_selection("LowEnergyAmBe", 0, low_energy_rn220(collaborators)?)
        .remove(TagMatcher::contains("InjectionFraction"))
        .build()
}
