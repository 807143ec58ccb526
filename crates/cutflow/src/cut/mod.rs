//! The cut abstraction: named, versioned boolean predicates over an event
//! table.
//!
//! A cut's pipeline is `pre` (optional temporary derived columns), `test`
//! (writes the verdict column) and `post` (removes the temporaries).
//! [`Cut::evaluate`] drives the pipeline and runs `post` on every exit path,
//! so a failing `test` cannot leave stray columns for later cuts.

mod composite;
mod expression;
mod family;
mod interval;

pub use composite::CompositeCut;
pub use expression::ExpressionCut;
pub use family::FamilyTemplate;
pub use interval::IntervalCut;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::Result;

/// A boolean acceptance criterion over an event table.
///
/// Implementations write exactly one boolean column named [`Cut::tag`], with
/// one verdict per input row. Row count and row order never change. A cut
/// may not read another cut's verdict column; cuts are combined only at the
/// composite level, which makes sibling evaluation order irrelevant.
pub trait Cut {
    /// Stable identifier. Doubles as the verdict column name and as the key
    /// used by the selection builder for substitute/remove edits, so it must
    /// be unique within any one selection.
    fn tag(&self) -> &str;

    /// Version of the cut definition, bumped whenever the logic changes.
    /// Opaque provenance metadata; never interpreted by the engine.
    fn version(&self) -> u32;

    /// Add temporary derived columns needed by `test`. Must be idempotent.
    fn pre(&self, _dataset: &mut Dataset) -> Result<()> {
        Ok(())
    }

    /// Compute the verdict column. Mandatory, cut-specific.
    fn test(&self, dataset: &mut Dataset) -> Result<()>;

    /// Remove every temporary column introduced by `pre`, leaving the schema
    /// unchanged except for the verdict column.
    fn post(&self, _dataset: &mut Dataset) -> Result<()> {
        Ok(())
    }

    /// Run the full pipeline. `post` runs even when `test` fails, so
    /// temporary columns never outlive the cut.
    fn evaluate(&self, dataset: &mut Dataset) -> Result<()> {
        self.pre(dataset)?;
        let verdict = self.test(dataset);
        let cleanup = self.post(dataset);
        verdict?;
        cleanup
    }

    /// Provenance record for reporting.
    fn record(&self) -> CutRecord {
        CutRecord {
            name: self.tag().to_string(),
            version: self.version(),
        }
    }
}

/// Identity of a cut as surfaced to callers: which exact definition
/// produced a verdict column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutRecord {
    pub name: String,
    pub version: u32,
}
