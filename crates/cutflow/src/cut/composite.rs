//! AND-combination of child cuts.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::dataset::{Column, Dataset};
use crate::error::{CutflowError, Result};
use crate::expr::{self, Expr};

use super::{Cut, CutRecord};

/// A cut built from an ordered sequence of child cuts, combined with
/// element-wise logical AND.
///
/// Children are owned exclusively and may themselves be composites; a
/// nested composite contributes exactly its one combined verdict to the
/// parent's AND. A composite may carry its own derived columns, computed
/// once before the child sequence and consumed by several siblings.
pub struct CompositeCut {
    tag: String,
    version: u32,
    children: Vec<Box<dyn Cut>>,
    derived: Vec<(String, Expr)>,
}

impl std::fmt::Debug for CompositeCut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeCut")
            .field("tag", &self.tag)
            .field("version", &self.version)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl CompositeCut {
    /// Build a composite. An empty child list is a configuration error, not
    /// a vacuous accept-all; so is a duplicate child tag, since tags double
    /// as verdict column names.
    pub fn new(
        tag: impl Into<String>,
        version: u32,
        children: Vec<Box<dyn Cut>>,
    ) -> Result<Self> {
        let tag = tag.into();
        if children.is_empty() {
            return Err(CutflowError::Configuration(format!(
                "composite '{tag}' has no child cuts"
            )));
        }
        let mut seen = HashSet::new();
        for child in &children {
            if !seen.insert(child.tag().to_string()) {
                return Err(CutflowError::Configuration(format!(
                    "composite '{tag}' has duplicate child tag '{}'",
                    child.tag()
                )));
            }
        }
        Ok(Self {
            tag,
            version,
            children,
            derived: Vec::new(),
        })
    }

    /// Attach a derived column shared by the children, computed before the
    /// child sequence runs and removed afterwards.
    pub fn with_derived(mut self, name: impl Into<String>, source: &str) -> Result<Self> {
        let expr = expr::parse_numeric(source)?;
        self.derived.push((name.into(), expr));
        Ok(self)
    }

    /// Tags of the direct children, in evaluation order.
    pub fn child_tags(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.tag()).collect()
    }

    /// Provenance records for the direct children.
    pub fn child_records(&self) -> Vec<CutRecord> {
        self.children.iter().map(|c| c.record()).collect()
    }

    /// Consume the composite, yielding its child list. Used by the
    /// selection builder to snapshot a base selection.
    pub fn into_children(self) -> Vec<Box<dyn Cut>> {
        self.children
    }

    fn run_children(&self, dataset: &mut Dataset) -> Result<()> {
        for child in &self.children {
            child.evaluate(dataset)?;
        }

        let mut combined = vec![true; dataset.row_count()];
        for child in &self.children {
            let verdicts = dataset.boolean(child.tag())?;
            for (acc, &v) in combined.iter_mut().zip(verdicts) {
                *acc = *acc && v;
            }
        }
        dataset.insert(self.tag.clone(), Column::Bool(combined))
    }
}

impl Cut for CompositeCut {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn pre(&self, dataset: &mut Dataset) -> Result<()> {
        let params = HashMap::new();
        for (name, expr) in &self.derived {
            let values = expr::evaluate_numeric(expr, dataset, &params)?;
            dataset.insert(name.clone(), Column::Float(values))?;
        }
        Ok(())
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        self.run_children(dataset)
    }

    fn post(&self, dataset: &mut Dataset) -> Result<()> {
        for (name, _) in &self.derived {
            dataset.remove(name);
        }
        Ok(())
    }
}
