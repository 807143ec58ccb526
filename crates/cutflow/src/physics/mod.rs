//! Detector-physics constants and math shared by the concrete cuts.

pub mod stats;
pub mod units;
