//! Cuts defined by a symbolic boolean expression.

use std::collections::HashMap;

use crate::dataset::{Column, Dataset};
use crate::error::{CutflowError, Result};
use crate::expr::{self, Expr};

/// A derived column computed in `pre` and removed in `post`.
#[derive(Debug, Clone)]
struct DerivedColumn {
    name: String,
    expr: Expr,
}

/// A cut whose predicate is a whitelisted boolean expression over column
/// names and optional `@` parameters.
///
/// The expression is parsed and type-checked at construction, so a
/// malformed cut fails before any dataset is touched. Derived columns let a
/// cut compute an intermediate quantity (a radius, an area fraction) that
/// the predicate then references; they exist only for the duration of the
/// cut's pipeline.
#[derive(Debug, Clone)]
pub struct ExpressionCut {
    tag: String,
    version: u32,
    source: String,
    expr: Expr,
    params: HashMap<String, f64>,
    derived: Vec<DerivedColumn>,
}

impl ExpressionCut {
    /// Build a cut from an expression with no parameter placeholders.
    pub fn new(tag: impl Into<String>, version: u32, source: &str) -> Result<Self> {
        let expr = expr::parse_predicate(source)?;
        let declared = expr.params();
        if !declared.is_empty() {
            return Err(CutflowError::Configuration(format!(
                "expression declares parameters {declared:?}; use with_parameters"
            )));
        }
        Ok(Self {
            tag: tag.into(),
            version,
            source: source.to_string(),
            expr,
            params: HashMap::new(),
            derived: Vec::new(),
        })
    }

    /// Build a cut from an expression template, binding its `@` parameters.
    ///
    /// The supplied names must match the placeholders exactly; a surplus or
    /// missing binding is a configuration error.
    pub fn with_parameters(
        tag: impl Into<String>,
        version: u32,
        source: &str,
        parameters: &[(&str, f64)],
    ) -> Result<Self> {
        let expr = expr::parse_predicate(source)?;
        let declared = expr.params();
        let supplied: std::collections::BTreeSet<String> =
            parameters.iter().map(|(n, _)| n.to_string()).collect();
        if supplied.len() != parameters.len() {
            return Err(CutflowError::Configuration(
                "duplicate parameter binding".to_string(),
            ));
        }
        if declared != supplied {
            return Err(CutflowError::Configuration(format!(
                "expression declares parameters {declared:?} but {supplied:?} were supplied"
            )));
        }
        Ok(Self {
            tag: tag.into(),
            version,
            source: source.to_string(),
            expr,
            params: parameters
                .iter()
                .map(|(n, v)| (n.to_string(), *v))
                .collect(),
            derived: Vec::new(),
        })
    }

    /// Attach a derived column recipe, a numeric expression computed in
    /// `pre` and dropped in `post`. Recipes may reference already-bound
    /// parameters.
    pub fn with_derived(mut self, name: impl Into<String>, source: &str) -> Result<Self> {
        let expr = expr::parse_numeric(source)?;
        for param in expr.params() {
            if !self.params.contains_key(&param) {
                return Err(CutflowError::Configuration(format!(
                    "derived column references unbound parameter '@{param}'"
                )));
            }
        }
        self.derived.push(DerivedColumn {
            name: name.into(),
            expr,
        });
        Ok(self)
    }

    /// The expression source string, for provenance display.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl super::Cut for ExpressionCut {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn pre(&self, dataset: &mut Dataset) -> Result<()> {
        // Inserting overwrites, so re-running pre on the same dataset is
        // harmless.
        for derived in &self.derived {
            let values = expr::evaluate_numeric(&derived.expr, dataset, &self.params)?;
            dataset.insert(derived.name.clone(), Column::Float(values))?;
        }
        Ok(())
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let verdicts = expr::evaluate_predicate(&self.expr, dataset, &self.params)?;
        dataset.insert(self.tag.clone(), Column::Bool(verdicts))
    }

    fn post(&self, dataset: &mut Dataset) -> Result<()> {
        for derived in &self.derived {
            dataset.remove(&derived.name);
        }
        Ok(())
    }
}
