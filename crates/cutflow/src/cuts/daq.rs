//! Data-acquisition cuts: busy and high-energy veto windows, end-of-run
//! truncation and the muon veto.

use std::sync::Arc;

use crate::cut::{CompositeCut, Cut, ExpressionCut};
use crate::dataset::{Column, Dataset};
use crate::error::{CutflowError, Result};
use crate::external::RunInfoService;
use crate::physics::units;

/// Seconds of data at the end of each run that may be truncated mid-event.
const END_OF_RUN_WINDOW: f64 = 21.0 * units::S;

/// Events too close to the end of the run, where the processor may have
/// cut the event short.
///
/// Needs `run_number` and `event_time` columns; run end times come from
/// the injected run-info service.
pub struct EndOfRunCheck {
    run_info: Arc<dyn RunInfoService>,
}

impl EndOfRunCheck {
    pub fn new(run_info: Arc<dyn RunInfoService>) -> Self {
        Self { run_info }
    }
}

impl Cut for EndOfRunCheck {
    fn tag(&self) -> &str {
        "EndOfRunCheck"
    }

    fn version(&self) -> u32 {
        1
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let run_numbers = dataset.numeric("run_number")?;
        let event_times = dataset.numeric("event_time")?;

        let mut runs: Vec<i64> = run_numbers.iter().map(|&r| r as i64).collect();
        runs.sort_unstable();
        runs.dedup();
        let end_times = self.run_info.run_end_times(&runs)?;

        let mut verdicts = Vec::with_capacity(dataset.row_count());
        for (&run, &time) in run_numbers.iter().zip(&event_times) {
            let run = run as i64;
            let end = end_times
                .get(&run)
                .ok_or(CutflowError::RunInfo { run })?;
            let end_ns = end.timestamp_nanos_opt().unwrap_or(i64::MAX) as f64;
            verdicts.push(time < end_ns - END_OF_RUN_WINDOW);
        }
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }
}

/// Events shortly after a long busy-on period, where the off signal was
/// missed and the acquisition state is unknown.
fn busy_type_check() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "BusyTypeCheck",
        1,
        "(~(previous_busy_on < 60e9)) | (previous_busy_off < previous_busy_on)",
    )
}

/// Event window overlaps a busy veto signal.
fn busy_check() -> Result<ExpressionCut> {
    ExpressionCut::new("BusyCheck", 1, "abs(nearest_busy) > event_duration / 2")
}

/// Event window overlaps a high-energy veto signal.
fn hev_check() -> Result<ExpressionCut> {
    ExpressionCut::new("HEVCheck", 1, "abs(nearest_hev) > event_duration / 2")
}

/// Events acquired while the DAQ could not have recorded them completely:
/// near busy or high-energy vetoes, or at the end of the run.
pub fn daq_veto(run_info: Arc<dyn RunInfoService>) -> Result<CompositeCut> {
    CompositeCut::new(
        "DAQVeto",
        1,
        vec![
            Box::new(EndOfRunCheck::new(run_info)) as Box<dyn Cut>,
            Box::new(busy_type_check()?),
            Box::new(busy_check()?),
            Box::new(hev_check()?),
        ],
    )
}

/// Events while the muon veto was off, or coincident with a muon veto
/// trigger.
pub fn muon_veto() -> Result<CompositeCut> {
    let on = ExpressionCut::new(
        "MuonVetoOn",
        3,
        "-2e10 < nearest_muon_veto_trigger < 2e10",
    )?;
    let coincidence = ExpressionCut::new(
        "MuonVetoCoincidence",
        3,
        "nearest_muon_veto_trigger < -2e6 | nearest_muon_veto_trigger > 3e6",
    )?;
    CompositeCut::new(
        "MuonVeto",
        3,
        vec![Box::new(on) as Box<dyn Cut>, Box::new(coincidence)],
    )
}
