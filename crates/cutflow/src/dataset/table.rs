//! The in-memory event table that cuts evaluate against.

use indexmap::IndexMap;

use crate::error::{CutflowError, Result};

use super::column::Column;

/// An ordered table of named, typed columns.
///
/// The caller owns the dataset; cuts mutate it in place by adding and
/// removing columns but never reorder or drop rows. Row count is fixed at
/// construction and every insert is validated against it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: IndexMap<String, Column>,
    rows: usize,
}

impl Dataset {
    /// Create an empty dataset with a fixed row count.
    pub fn with_rows(rows: usize) -> Self {
        Self {
            columns: IndexMap::new(),
            rows,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Insert or overwrite a column. The length must match the row count.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if column.len() != self.rows {
            return Err(CutflowError::LengthMismatch {
                column: name,
                expected: self.rows,
                actual: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Remove a column if present. Removing an absent column is a no-op so
    /// that `post` hooks stay idempotent.
    pub fn remove(&mut self, name: &str) {
        self.columns.shift_remove(name);
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| CutflowError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Get a column as f64 values, casting Int/Timestamp.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.column(name)?;
        column
            .as_numeric()
            .ok_or_else(|| CutflowError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            })
    }

    /// Get a boolean column, e.g. a cut's verdict column.
    pub fn boolean(&self, name: &str) -> Result<&[bool]> {
        match self.column(name)? {
            Column::Bool(v) => Ok(v),
            _ => Err(CutflowError::ColumnType {
                column: name.to_string(),
                expected: "bool",
            }),
        }
    }

    /// Count how many rows pass in a boolean column.
    pub fn count_passing(&self, name: &str) -> Result<usize> {
        Ok(self.boolean(name)?.iter().filter(|&&b| b).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::with_rows(3);
        ds.insert("x", Column::Float(vec![1.0, 2.0, 3.0])).unwrap();
        ds.insert("run_number", Column::Int(vec![7, 7, 8])).unwrap();
        ds
    }

    #[test]
    fn insert_preserves_order() {
        let ds = sample();
        assert_eq!(ds.column_names(), vec!["x", "run_number"]);
    }

    #[test]
    fn insert_rejects_wrong_length() {
        let mut ds = sample();
        let err = ds.insert("bad", Column::Float(vec![1.0])).unwrap_err();
        assert!(matches!(
            err,
            CutflowError::LengthMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn missing_column_is_an_error() {
        let ds = sample();
        let err = ds.numeric("nope").unwrap_err();
        assert!(matches!(err, CutflowError::MissingColumn { .. }));
    }

    #[test]
    fn numeric_rejects_bool() {
        let mut ds = sample();
        ds.insert("flag", Column::Bool(vec![true, true, false]))
            .unwrap();
        let err = ds.numeric("flag").unwrap_err();
        assert!(matches!(err, CutflowError::ColumnType { .. }));
        assert_eq!(ds.count_passing("flag").unwrap(), 2);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut ds = sample();
        ds.remove("x");
        ds.remove("x");
        assert!(!ds.has_column("x"));
    }
}
