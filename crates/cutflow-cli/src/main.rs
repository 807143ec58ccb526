//! Cutflow CLI - apply event selections to columnar data files.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Apply {
            file,
            selection,
            run_info,
            output,
            json,
        } => commands::apply::run(file, selection, run_info, output, json, cli.verbose),

        Commands::List { selection } => commands::list::run(selection),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
