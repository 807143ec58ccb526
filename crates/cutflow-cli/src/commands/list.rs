//! List command - show the cuts making up each selection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::Colorize;
use cutflow::{Collaborators, Cut, Dataset, PeakClassifier, RunInfoService};

use crate::cli::SelectionChoice;
use crate::commands::apply::build_selection;

struct NoRuns;

impl RunInfoService for NoRuns {
    fn run_end_times(
        &self,
        _runs: &[i64],
    ) -> cutflow::Result<HashMap<i64, DateTime<Utc>>> {
        Ok(HashMap::new())
    }
}

struct NeutralClassifier;

impl PeakClassifier for NeutralClassifier {
    fn predict_probability(
        &self,
        dataset: &Dataset,
        _features: &[&str],
    ) -> cutflow::Result<Vec<f64>> {
        Ok(vec![0.0; dataset.row_count()])
    }
}

pub fn run(selection: Option<SelectionChoice>) -> Result<(), Box<dyn std::error::Error>> {
    let collaborators = Collaborators {
        run_info: Arc::new(NoRuns),
        forest: Arc::new(NeutralClassifier),
        gbdt: Arc::new(NeutralClassifier),
    };

    let choices: Vec<SelectionChoice> = match selection {
        Some(choice) => vec![choice],
        None => SelectionChoice::all().to_vec(),
    };

    for choice in choices {
        let selection = build_selection(choice, &collaborators)?;
        println!(
            "{} {} (v{}, {} cuts)",
            "Selection".cyan().bold(),
            selection.tag().white().bold(),
            selection.version(),
            selection.child_tags().len()
        );
        for record in selection.child_records() {
            println!("  {:<36} v{}", record.name, record.version);
        }
        println!();
    }
    Ok(())
}
