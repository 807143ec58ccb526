//! Half-open interval cuts on a single column.

use crate::dataset::{Column, Dataset};
use crate::error::Result;

use super::Cut;

/// Accepts rows where one named column lies in `[low, high)`.
///
/// The dominant pattern for single-variable energy and amplitude acceptance
/// windows; two explicit scalars instead of bespoke comparison code. NaN
/// values fail the cut.
#[derive(Debug, Clone)]
pub struct IntervalCut {
    tag: String,
    version: u32,
    column: String,
    low: f64,
    high: f64,
}

impl IntervalCut {
    pub fn new(
        tag: impl Into<String>,
        version: u32,
        column: impl Into<String>,
        low: f64,
        high: f64,
    ) -> Self {
        Self {
            tag: tag.into(),
            version,
            column: column.into(),
            low,
            high,
        }
    }

    /// The tested range as `(low, high)`.
    pub fn allowed_range(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    /// The column this cut reads.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Cut for IntervalCut {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let values = dataset.numeric(&self.column)?;
        let verdicts = values
            .iter()
            .map(|&v| self.low <= v && v < self.high)
            .collect();
        dataset.insert(self.tag.clone(), Column::Bool(verdicts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(values: Vec<f64>) -> Dataset {
        let mut ds = Dataset::with_rows(values.len());
        ds.insert("cs1", Column::Float(values)).unwrap();
        ds
    }

    #[test]
    fn boundaries_are_half_open() {
        let mut ds = dataset(vec![10.0, 20.0, 19.999, 9.999]);
        let cut = IntervalCut::new("S1LowEnergyRange", 0, "cs1", 10.0, 20.0);
        cut.evaluate(&mut ds).unwrap();
        assert_eq!(
            ds.boolean("S1LowEnergyRange").unwrap(),
            &[true, false, true, false]
        );
    }

    #[test]
    fn nan_fails() {
        let mut ds = dataset(vec![f64::NAN, 15.0]);
        let cut = IntervalCut::new("Range", 0, "cs1", 10.0, 20.0);
        cut.evaluate(&mut ds).unwrap();
        assert_eq!(ds.boolean("Range").unwrap(), &[false, true]);
    }

    #[test]
    fn verdict_preserves_row_count() {
        let mut ds = dataset(vec![1.0; 7]);
        let cut = IntervalCut::new("Range", 0, "cs1", 0.0, 2.0);
        cut.evaluate(&mut ds).unwrap();
        assert_eq!(ds.boolean("Range").unwrap().len(), 7);
        assert_eq!(ds.row_count(), 7);
    }
}
