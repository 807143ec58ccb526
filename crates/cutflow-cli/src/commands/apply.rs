//! Apply command - run a selection over an event file and report
//! acceptance.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::Colorize;
use cutflow::{
    Collaborators, CompositeCut, Cut, Dataset, PeakClassifier, RunInfoService,
    SelectionReport, load_csv,
};

use crate::cli::SelectionChoice;

/// Run end times loaded from a two-column CSV (run_number, end_time as
/// RFC 3339). Stands in for the live run database.
struct FileRunInfo {
    end_times: HashMap<i64, DateTime<Utc>>,
}

impl FileRunInfo {
    fn load(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut end_times = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let run: i64 = record
                .get(0)
                .ok_or("run info row missing run_number")?
                .trim()
                .parse()?;
            let end = record
                .get(1)
                .ok_or("run info row missing end_time")?
                .trim();
            let end = DateTime::parse_from_rfc3339(end)?.with_timezone(&Utc);
            end_times.insert(run, end);
        }
        Ok(Self { end_times })
    }

    fn empty() -> Self {
        Self {
            end_times: HashMap::new(),
        }
    }
}

impl RunInfoService for FileRunInfo {
    fn run_end_times(
        &self,
        runs: &[i64],
    ) -> cutflow::Result<HashMap<i64, DateTime<Utc>>> {
        Ok(runs
            .iter()
            .filter_map(|r| self.end_times.get(r).map(|t| (*r, *t)))
            .collect())
    }
}

/// Placeholder for the trained S1 classifiers: scores every peak as
/// signal-like, so the single-electron cut only enforces its width and
/// energy bounds.
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

pub fn build_selection(
    choice: SelectionChoice,
    collaborators: &Collaborators,
) -> cutflow::Result<CompositeCut> {
    match choice {
        SelectionChoice::AllEnergy => cutflow::all_energy(collaborators),
        SelectionChoice::LowEnergyRn220 => cutflow::low_energy_rn220(collaborators),
        SelectionChoice::LowEnergyBackground => {
            cutflow::low_energy_background(collaborators)
        }
        SelectionChoice::LowEnergyAmBe => cutflow::low_energy_ambe(collaborators),
    }
}

pub fn run(
    file: PathBuf,
    selection: SelectionChoice,
    run_info: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Event file not found: {}", file.display()).into());
    }

    let run_info: Arc<dyn RunInfoService> = match &run_info {
        Some(path) => Arc::new(FileRunInfo::load(path)?),
        None => Arc::new(FileRunInfo::empty()),
    };
    let collaborators = Collaborators {
        run_info,
        forest: Arc::new(NeutralClassifier),
        gbdt: Arc::new(NeutralClassifier),
    };

    let mut events = load_csv(&file)?;
    if verbose {
        println!(
            "Loaded {} rows, {} columns from {}",
            events.row_count(),
            events.column_count(),
            file.display()
        );
    }

    let selection = build_selection(selection, &collaborators)?;
    selection.evaluate(&mut events)?;
    let report = SelectionReport::from_evaluated(&selection, &events)?;

    if let Some(path) = &output {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        if verbose {
            println!("Report written to {}", path.display());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &SelectionReport) {
    println!(
        "{} {} (v{})",
        "Selection".cyan().bold(),
        report.selection.white().bold(),
        report.version
    );
    println!();
    println!("{:<36} {:>8} {:>10}", "cut".bold(), "version".bold(), "passed".bold());
    for cut in &report.cuts {
        let fraction = if report.rows == 0 {
            0.0
        } else {
            cut.passed as f64 / report.rows as f64
        };
        println!(
            "{:<36} {:>8} {:>10}",
            cut.name,
            cut.version,
            format!("{} ({:.1}%)", cut.passed, 100.0 * fraction)
        );
    }
    println!();
    println!(
        "{} {} of {} events ({:.1}%)",
        "Passing:".green().bold(),
        report.passed.to_string().white().bold(),
        report.rows,
        100.0 * report.acceptance()
    );
}
