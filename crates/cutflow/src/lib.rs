//! Cutflow: composable event selections over columnar detector data.
//!
//! An analysis expresses its acceptance criteria as *cuts*: named,
//! versioned boolean predicates over an in-memory event table. Cuts are
//! combined into composites, and composites are edited into derived
//! selections, so a calibration selection can be expressed as "the base
//! selection, with this cut swapped and those appended".
//!
//! # Core Principles
//!
//! - **Column-stable**: a cut adds exactly one verdict column and never
//!   reorders or drops rows
//! - **Self-cleaning**: temporary derived columns are removed on every
//!   exit path, including failures
//! - **Full provenance**: every verdict column is traceable to a named,
//!   versioned cut definition
//!
//! # Example
//!
//! ```no_run
//! use cutflow::{ExpressionCut, Cut, load_csv};
//!
//! let mut events = load_csv("events.csv").unwrap();
//! let cut = ExpressionCut::new("S2Threshold", 1, "200 < s2").unwrap();
//! cut.evaluate(&mut events).unwrap();
//!
//! println!("passing: {}", events.count_passing("S2Threshold").unwrap());
//! ```

pub mod cut;
pub mod cuts;
pub mod dataset;
pub mod error;
pub mod expr;
pub mod external;
pub mod physics;
pub mod selection;

pub use cut::{CompositeCut, Cut, CutRecord, ExpressionCut, FamilyTemplate, IntervalCut};
pub use cuts::{Collaborators, all_energy, low_energy_ambe, low_energy_background, low_energy_rn220};
pub use dataset::{Column, Dataset, load_csv};
pub use error::{CutflowError, Result};
pub use external::{PeakClassifier, RadiusCurve, RunInfoService};
pub use selection::{CutReport, SelectionBuilder, SelectionReport, TagMatcher};
