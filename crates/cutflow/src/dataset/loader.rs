//! CSV loading for event tables.

use std::path::Path;

use crate::error::{CutflowError, Result};

use super::column::Column;
use super::table::Dataset;

/// Load an event table from a CSV file with a header row.
///
/// Column types are inferred from the cells: a column where every cell
/// parses as an integer becomes `Int`, a column of `true`/`false` becomes
/// `Bool`, and anything else must parse as f64 (empty cells become NaN).
pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|e| match e.kind() {
        csv::ErrorKind::Io(_) => CutflowError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        },
        _ => CutflowError::Csv(e),
    })?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, cell) in record.iter().enumerate() {
            if idx < cells.len() {
                cells[idx].push(cell.trim().to_string());
            }
        }
    }

    let rows = cells.first().map(|c| c.len()).unwrap_or(0);
    let mut dataset = Dataset::with_rows(rows);
    for (header, values) in headers.iter().zip(cells.iter()) {
        let column = infer_column(header, values)?;
        dataset.insert(header.clone(), column)?;
    }
    Ok(dataset)
}

fn infer_column(name: &str, values: &[String]) -> Result<Column> {
    if !values.is_empty() {
        let ints: Option<Vec<i64>> = values.iter().map(|v| v.parse::<i64>().ok()).collect();
        if let Some(ints) = ints {
            return Ok(Column::Int(ints));
        }
    }

    if !values.is_empty() && values.iter().all(|v| is_bool_word(v)) {
        return Ok(Column::Bool(
            values.iter().map(|v| parse_bool_word(v)).collect(),
        ));
    }

    let mut floats = Vec::with_capacity(values.len());
    for (row, value) in values.iter().enumerate() {
        if value.is_empty() || value.eq_ignore_ascii_case("nan") {
            floats.push(f64::NAN);
        } else {
            let parsed = value.parse::<f64>().map_err(|e| CutflowError::Parse {
                row,
                column: name.to_string(),
                message: e.to_string(),
            })?;
            floats.push(parsed);
        }
    }
    Ok(Column::Float(floats))
}

fn is_bool_word(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

fn parse_bool_word(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn infers_types_per_column() {
        let file = write_csv("run_number,cs1,inside_flash\n7,10.5,true\n8,,false\n");
        let ds = load_csv(file.path()).unwrap();

        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.numeric("run_number").unwrap(), vec![7.0, 8.0]);
        let cs1 = ds.numeric("cs1").unwrap();
        assert_eq!(cs1[0], 10.5);
        assert!(cs1[1].is_nan());
        assert_eq!(ds.boolean("inside_flash").unwrap(), &[true, false]);
    }

    #[test]
    fn bad_cell_reports_position() {
        let file = write_csv("cs1\n1.0\nbogus\n");
        let err = load_csv(file.path()).unwrap_err();
        assert!(matches!(err, CutflowError::Parse { row: 1, .. }));
    }
}
