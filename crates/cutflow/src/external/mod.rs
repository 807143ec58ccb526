//! External collaborators consumed at the engine's boundary.
//!
//! These are injected at cut construction rather than discovered through
//! global state, so the engine stays deterministic and testable without
//! live services or model files.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::dataset::Dataset;
use crate::error::{CutflowError, Result};

/// Looks up run metadata for a set of run identifiers.
///
/// Consumed by the end-of-run DAQ check, which needs each run's end time to
/// reject events in the last seconds of a run.
pub trait RunInfoService {
    /// End timestamps for the given runs. A run absent from the result is
    /// reported as [`CutflowError::RunInfo`] by the consuming cut.
    fn run_end_times(&self, runs: &[i64]) -> Result<HashMap<i64, DateTime<Utc>>>;
}

/// A pretrained classifier exposing per-row probabilities.
///
/// Consumed by the single-electron S2 cut, which soft-votes two such
/// models over S1 shape features.
pub trait PeakClassifier {
    /// Probability that each row's peak is a single-electron S2, computed
    /// from the named feature columns.
    fn predict_probability(&self, dataset: &Dataset, features: &[&str]) -> Result<Vec<f64>>;
}

/// A static (angle, radius) reference curve, loaded once and read-only.
///
/// Consumed by the four-leaf-clover fiducial volume, whose maximum radius
/// depends on the azimuthal angle of the reconstructed position.
#[derive(Debug, Clone)]
pub struct RadiusCurve {
    phi: Vec<f64>,
    radius: Vec<f64>,
}

impl RadiusCurve {
    /// Build a curve from parallel angle/radius arrays.
    pub fn from_points(phi: Vec<f64>, radius: Vec<f64>) -> Result<Self> {
        if phi.is_empty() || phi.len() != radius.len() {
            return Err(CutflowError::Configuration(format!(
                "radius curve needs matching non-empty arrays, got {} and {}",
                phi.len(),
                radius.len()
            )));
        }
        Ok(Self { phi, radius })
    }

    /// Load a two-column whitespace-separated text file of (phi, radius)
    /// points.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CutflowError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut phi = Vec::new();
        let mut radius = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(p), Some(r)) = (parts.next(), parts.next()) else {
                return Err(CutflowError::Parse {
                    row: idx,
                    column: "radius curve".to_string(),
                    message: "expected two columns".to_string(),
                });
            };
            let parse = |v: &str| {
                v.parse::<f64>().map_err(|e| CutflowError::Parse {
                    row: idx,
                    column: "radius curve".to_string(),
                    message: e.to_string(),
                })
            };
            phi.push(parse(p)?);
            radius.push(parse(r)?);
        }
        Self::from_points(phi, radius)
    }

    /// Radius at the curve point whose angle is nearest to `phi`.
    pub fn radius_at(&self, phi: f64) -> f64 {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (idx, &p) in self.phi.iter().enumerate() {
            let distance = (p - phi).abs();
            if distance < best_distance {
                best_distance = distance;
                best = idx;
            }
        }
        self.radius[best]
    }

    /// Mean radius over the whole curve.
    pub fn average_radius(&self) -> f64 {
        self.radius.iter().sum::<f64>() / self.radius.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn nearest_phi_lookup() {
        let curve =
            RadiusCurve::from_points(vec![0.0, 1.0, 2.0], vec![40.0, 41.0, 42.0]).unwrap();
        assert_eq!(curve.radius_at(0.1), 40.0);
        assert_eq!(curve.radius_at(1.4), 41.0);
        assert_eq!(curve.radius_at(5.0), 42.0);
        assert!((curve.average_radius() - 41.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let err = RadiusCurve::from_points(vec![0.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CutflowError::Configuration(_)));
        assert!(RadiusCurve::from_points(vec![], vec![]).is_err());
    }

    #[test]
    fn loads_two_column_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.0 40.0\n1.5708 41.5\n\n3.1416 39.8").unwrap();
        file.flush().unwrap();

        let curve = RadiusCurve::from_file(file.path()).unwrap();
        assert_eq!(curve.radius_at(1.6), 41.5);
    }

    #[test]
    fn bad_file_reports_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.0 40.0\noops").unwrap();
        file.flush().unwrap();

        let err = RadiusCurve::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CutflowError::Parse { row: 1, .. }));
    }
}
