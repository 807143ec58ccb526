//! Provenance reporting for evaluated selections.

use serde::{Deserialize, Serialize};

use crate::cut::{CompositeCut, Cut};
use crate::dataset::Dataset;
use crate::error::Result;

/// Pass counts for one cut within a selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutReport {
    pub name: String,
    pub version: u32,
    /// Rows passing this cut alone.
    pub passed: usize,
}

/// Summary of a selection applied to one event table: which exact cut
/// definitions ran, and how many rows survived each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub selection: String,
    pub version: u32,
    pub rows: usize,
    /// Rows passing every cut.
    pub passed: usize,
    pub cuts: Vec<CutReport>,
}

impl SelectionReport {
    /// Assemble a report from an already-evaluated dataset.
    pub fn from_evaluated(selection: &CompositeCut, dataset: &Dataset) -> Result<Self> {
        let cuts = selection
            .child_records()
            .into_iter()
            .map(|record| {
                Ok(CutReport {
                    passed: dataset.count_passing(&record.name)?,
                    name: record.name,
                    version: record.version,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            selection: selection.tag().to_string(),
            version: selection.version(),
            rows: dataset.row_count(),
            passed: dataset.count_passing(selection.tag())?,
            cuts,
        })
    }

    /// Overall acceptance fraction.
    pub fn acceptance(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.passed as f64 / self.rows as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::IntervalCut;
    use crate::dataset::Column;

    #[test]
    fn report_counts_per_cut_and_aggregate() {
        let mut ds = Dataset::with_rows(3);
        ds.insert("z", Column::Float(vec![-50.0, -5.0, -50.0]))
            .unwrap();
        ds.insert("r", Column::Float(vec![20.0, 20.0, 40.0]))
            .unwrap();

        let selection = CompositeCut::new(
            "Fiducial",
            2,
            vec![
                Box::new(IntervalCut::new("ZCut", 0, "z", -92.9, -9.0)) as Box<dyn Cut>,
                Box::new(IntervalCut::new("RCut", 1, "r", 0.0, 36.94)),
            ],
        )
        .unwrap();
        selection.evaluate(&mut ds).unwrap();

        let report = SelectionReport::from_evaluated(&selection, &ds).unwrap();
        assert_eq!(report.selection, "Fiducial");
        assert_eq!(report.rows, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.cuts.len(), 2);
        assert_eq!(report.cuts[0].passed, 2);
        assert_eq!(report.cuts[1].passed, 2);
        assert_eq!(report.cuts[1].version, 1);
        assert!((report.acceptance() - 1.0 / 3.0).abs() < 1e-12);
    }
}
