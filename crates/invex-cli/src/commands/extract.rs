//! Extract command - process the input directory and print the records.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use invex_core::{BatchProcessor, ExtractionRecord, Schema};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Directory containing the PDF files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::config::load(config_path)?;
    if let Some(dir) = args.input_dir {
        config.input.directory = dir;
    }

    let processor = BatchProcessor::new(config.input.clone(), config.field_patterns()?);
    let records = processor.process()?;
    debug!("Extracted {} records", records.len());

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&records)?,
        OutputFormat::Csv => format_csv(processor.schema(), &records)?,
        OutputFormat::Text => format_text(&records),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_csv(schema: &Schema, records: &[ExtractionRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(schema.columns())?;
    for record in records {
        wtr.write_record(record.values())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[ExtractionRecord]) -> String {
    let mut output = String::new();

    for record in records {
        output.push_str(&format!("{}\n", record.file_name()));
        for field in record.fields() {
            output.push_str(&format!("  {}: {}\n", field.name, field.value));
        }
        output.push_str(&format!("  Status: {}\n\n", record.status()));
    }

    output
}
