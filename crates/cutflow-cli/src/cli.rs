//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cutflow: composable event selections over columnar detector data
#[derive(Parser)]
#[command(name = "cutflow")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a selection to an event file and report acceptance
    Apply {
        /// Path to the event file (CSV with a header row)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Selection to apply
        #[arg(short, long, default_value = "low-energy-background")]
        selection: SelectionChoice,

        /// Run metadata file (CSV with run_number,end_time columns),
        /// needed by the DAQ end-of-run check
        #[arg(long)]
        run_info: Option<PathBuf>,

        /// Write the report as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the cuts making up each selection
    List {
        /// Restrict to one selection
        #[arg(short, long)]
        selection: Option<SelectionChoice>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectionChoice {
    AllEnergy,
    LowEnergyRn220,
    LowEnergyBackground,
    LowEnergyAmBe,
}

impl SelectionChoice {
    pub fn all() -> [SelectionChoice; 4] {
        [
            SelectionChoice::AllEnergy,
            SelectionChoice::LowEnergyRn220,
            SelectionChoice::LowEnergyBackground,
            SelectionChoice::LowEnergyAmBe,
        ]
    }
}
