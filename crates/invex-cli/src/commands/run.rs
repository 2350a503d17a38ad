//! Run command - process the input directory and persist the results.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use invex_core::{BatchProcessor, DatabaseSink, ExtractionRecord, InvexConfig, SpreadsheetSink};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory containing the PDF files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory for the spreadsheet
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Skip writing the spreadsheet
    #[arg(long)]
    no_spreadsheet: bool,

    /// Skip inserting into the database
    #[arg(long)]
    no_database: bool,
}

/// Run the whole pipeline.
///
/// Configuration errors are reported here and the command still exits
/// normally.
pub fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    println!("--- Starting processing ---");

    match execute(args, config_path) {
        Ok(true) => println!("--- Processing completed successfully! ---"),
        Ok(false) => println!("--- Processing completed with errors ---"),
        Err(e) => {
            error!("Run aborted: {:#}", e);
            println!("{} Critical error: {:#}", style("✗").red(), e);
        }
    }

    debug!("Total run time: {:?}", start.elapsed());
    Ok(())
}

/// Returns whether every enabled sink succeeded.
fn execute(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<bool> {
    let mut config = super::config::load(config_path)?;
    apply_overrides(&mut config, &args);

    let patterns = config.field_patterns()?;
    let processor = BatchProcessor::new(config.input.clone(), patterns);

    let files = processor.discover()?;
    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let records = processor.process_with(|record| {
        pb.set_message(record.file_name().to_string());
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    print_summary(&records);

    let schema = processor.schema();
    let mut all_ok = true;

    if config.spreadsheet.enabled {
        match SpreadsheetSink::new(config.spreadsheet.clone()).write(schema, &records) {
            Ok(path) => println!(
                "{} Excel file saved as {}",
                style("✓").green(),
                path.display()
            ),
            Err(e) => {
                all_ok = false;
                println!("{} Error saving the spreadsheet: {}", style("✗").red(), e);
            }
        }
    }

    if config.database.enabled {
        match DatabaseSink::new(config.database.clone()).write(schema, &records) {
            Ok(_) => println!(
                "{} Data successfully inserted into the database.",
                style("✓").green()
            ),
            Err(e) => {
                all_ok = false;
                println!(
                    "{} Error connecting to the database: {}",
                    style("✗").red(),
                    e
                );
            }
        }
    }

    Ok(all_ok)
}

fn apply_overrides(config: &mut InvexConfig, args: &RunArgs) {
    if let Some(dir) = &args.input_dir {
        config.input.directory = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.spreadsheet.output_dir = dir.clone();
    }
    if let Some(path) = &args.database {
        config.database.path = path.clone();
    }
    if args.no_spreadsheet {
        config.spreadsheet.enabled = false;
    }
    if args.no_database {
        config.database.enabled = false;
    }
}

fn print_summary(records: &[ExtractionRecord]) {
    let failed: Vec<_> = records
        .iter()
        .filter(|r| !r.status().is_completed())
        .collect();

    println!(
        "{} Processed {} files: {} completed, {} failed",
        style("✓").green(),
        records.len(),
        style(records.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!("{}", style("Failed files:").red());
        for record in failed {
            println!("  - {}: {}", record.file_name(), record.status());
        }
    }
}
