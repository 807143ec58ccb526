//! Table-driven generation of parametrized cut families.

use crate::error::{CutflowError, Result};
use crate::expr;

use super::ExpressionCut;

/// One expression template instantiated across a table of parameter tuples.
///
/// Replaces per-variant subclassing: given a template with `@` placeholders
/// and a declared symbol order, each `(identifier, values)` row yields one
/// [`ExpressionCut`] tagged `base_tag + identifier`, bound to that row's
/// values. Pure function of its inputs; building a family twice from the
/// same table produces identical cuts.
#[derive(Debug, Clone)]
pub struct FamilyTemplate {
    base_tag: String,
    version: u32,
    source: String,
    symbols: Vec<String>,
    derived: Vec<(String, String)>,
}

impl FamilyTemplate {
    /// Parse and validate the template once. The declared symbols must
    /// match the template's `@` placeholders exactly.
    pub fn new(
        base_tag: impl Into<String>,
        version: u32,
        source: &str,
        symbols: &[&str],
    ) -> Result<Self> {
        let expr = expr::parse_predicate(source)?;
        let declared = expr.params();
        let listed: std::collections::BTreeSet<String> =
            symbols.iter().map(|s| s.to_string()).collect();
        if listed.len() != symbols.len() {
            return Err(CutflowError::Configuration(
                "duplicate symbol in family template".to_string(),
            ));
        }
        if declared != listed {
            return Err(CutflowError::Configuration(format!(
                "template declares parameters {declared:?} but symbols {listed:?} were listed"
            )));
        }
        Ok(Self {
            base_tag: base_tag.into(),
            version,
            source: source.to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            derived: Vec::new(),
        })
    }

    /// Attach a derived column recipe shared by every member of the family.
    pub fn with_derived(mut self, name: impl Into<String>, source: &str) -> Result<Self> {
        expr::parse_numeric(source)?;
        self.derived.push((name.into(), source.to_string()));
        Ok(self)
    }

    /// Instantiate one member, bound to one parameter tuple. The tuple
    /// arity must match the declared symbol count.
    pub fn instantiate(&self, identifier: &str, values: &[f64]) -> Result<ExpressionCut> {
        if values.len() != self.symbols.len() {
            return Err(CutflowError::Configuration(format!(
                "family '{}' expects {} parameters, row '{identifier}' has {}",
                self.base_tag,
                self.symbols.len(),
                values.len()
            )));
        }
        let bindings: Vec<(&str, f64)> = self
            .symbols
            .iter()
            .map(|s| s.as_str())
            .zip(values.iter().copied())
            .collect();
        let mut cut = ExpressionCut::with_parameters(
            format!("{}{identifier}", self.base_tag),
            self.version,
            &self.source,
            &bindings,
        )?;
        for (name, source) in &self.derived {
            cut = cut.with_derived(name.clone(), source)?;
        }
        Ok(cut)
    }

    /// Instantiate the whole family from a parameter table, preserving row
    /// order.
    pub fn build_family(&self, entries: &[(String, Vec<f64>)]) -> Result<Vec<ExpressionCut>> {
        entries
            .iter()
            .map(|(id, values)| self.instantiate(id, values))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::Cut;
    use crate::dataset::{Column, Dataset};

    fn template() -> FamilyTemplate {
        FamilyTemplate::new(
            "Window",
            1,
            "@lo < cs1 < @hi",
            &["lo", "hi"],
        )
        .unwrap()
    }

    #[test]
    fn members_are_named_by_identifier() {
        let cut = template().instantiate("1000", &[0.0, 200.0]).unwrap();
        assert_eq!(cut.tag(), "Window1000");
        assert_eq!(cut.version(), 1);
    }

    #[test]
    fn arity_mismatch_is_a_configuration_error() {
        let err = template().instantiate("1000", &[0.0]).unwrap_err();
        assert!(matches!(err, CutflowError::Configuration(_)));
    }

    #[test]
    fn symbol_mismatch_is_a_configuration_error() {
        let err = FamilyTemplate::new("Window", 1, "@lo < cs1", &["lo", "hi"]).unwrap_err();
        assert!(matches!(err, CutflowError::Configuration(_)));
    }

    #[test]
    fn family_is_deterministic() {
        let table = vec![
            ("A".to_string(), vec![0.0, 10.0]),
            ("B".to_string(), vec![10.0, 20.0]),
        ];
        let first = template().build_family(&table).unwrap();
        let second = template().build_family(&table).unwrap();

        let mut ds = Dataset::with_rows(3);
        ds.insert("cs1", Column::Float(vec![5.0, 15.0, 25.0]))
            .unwrap();

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.tag(), b.tag());
            let mut ds_a = ds.clone();
            let mut ds_b = ds.clone();
            a.evaluate(&mut ds_a).unwrap();
            b.evaluate(&mut ds_b).unwrap();
            assert_eq!(
                ds_a.boolean(a.tag()).unwrap(),
                ds_b.boolean(b.tag()).unwrap()
            );
        }
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn members_bind_their_own_row() {
        let table = vec![
            ("A".to_string(), vec![0.0, 10.0]),
            ("B".to_string(), vec![10.0, 20.0]),
        ];
        let family = template().build_family(&table).unwrap();

        let mut ds = Dataset::with_rows(1);
        ds.insert("cs1", Column::Float(vec![15.0])).unwrap();
        for cut in &family {
            cut.evaluate(&mut ds).unwrap();
        }
        assert_eq!(ds.boolean("WindowA").unwrap(), &[false]);
        assert_eq!(ds.boolean("WindowB").unwrap(), &[true]);
    }
}
