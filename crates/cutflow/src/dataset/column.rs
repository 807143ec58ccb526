//! Typed columns of an event table.

/// A single named column's data.
///
/// Timestamps are nanoseconds since the Unix epoch, the convention used by
/// the event builder for `event_time` and the run database for run ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Timestamp(Vec<i64>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Timestamp(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Int(_) => "int",
            Column::Bool(_) => "bool",
            Column::Timestamp(_) => "timestamp",
        }
    }

    /// View the column as f64 values, casting integer types.
    ///
    /// Boolean columns have no numeric view; predicates on them are written
    /// directly in Rust rather than through the expression language.
    pub fn as_numeric(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float(v) => Some(v.clone()),
            Column::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::Timestamp(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::Bool(_) => None,
        }
    }
}
