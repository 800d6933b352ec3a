//! unitypkg - extract .unitypackage archives

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::Level;
use unitypkg_archive::{ExtractOptions, Progress, extract, output_root};

mod cli;
mod tracker;

use cli::Cli;
use tracker::ProgressTracker;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{}", style(format!("ERROR: {e:#}")).red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = output_root(&cli.input, &cli.output_dir)?;

    print!("Extracting '{}' to '{}'... ", cli.input.display(), root.display());
    io::stdout().flush()?;

    let tracker = ProgressTracker::new(cli.quiet);
    let sink = tracker.clone();
    let options = ExtractOptions::default().on_progress(Arc::new(move |p: Progress| sink.update(p)));

    let result = extract(&cli.input, &cli.output_dir, &options);
    tracker.finish();
    let report =
        result.with_context(|| format!("failed to extract '{}'", cli.input.display()))?;

    println!("done.");

    let unresolved = report.unresolved().count();
    if unresolved > 0 {
        println!(
            "{} asset(s) had no pathname and were left under their GUID in '{}'.",
            unresolved,
            report.output_root.display()
        );
    }

    Ok(())
}
