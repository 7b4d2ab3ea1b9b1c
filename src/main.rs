use anyhow::{Context, Result};
use branch_sales::config::{AnalyzerConfig, ConfigOverrides};
use branch_sales::report::{self, output_path_for};
use branch_sales::SalesAnalyzer;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "branch-sales")]
#[command(about = "Quantity sold per branch and product code from a sales export")]
struct Args {
    /// Sales export in CSV format (first row is a header)
    csv_file: PathBuf,

    /// Comma separated branch names to include (or set SALES_BRANCHES)
    #[arg(short, long)]
    branches: Option<String>,

    /// Summary row matching: sensitive or insensitive (or set SALES_SUMMARY_MATCH)
    #[arg(long)]
    summary_match: Option<String>,

    /// CSV section order: branches-first or products-first (or set SALES_CSV_LAYOUT)
    #[arg(long)]
    layout: Option<String>,

    /// Output CSV path (default: <input>_by_product.csv next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report as JSON instead of the console table
    #[arg(long)]
    json: bool,

    /// Only write the CSV file
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = AnalyzerConfig::from_env(ConfigOverrides {
        branches: args.branches,
        summary_match: args.summary_match,
        layout: args.layout,
    })?;
    let layout = config.layout;

    let analyzer = SalesAnalyzer::new(config);
    let report = analyzer.analyze_path(&args.csv_file)?;

    if !args.quiet {
        if args.json {
            println!("{}", report::render_json(&report)?);
        } else {
            print!("{}", report::render_console(&report));
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| output_path_for(&args.csv_file));
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    report::write_csv(&report, BufWriter::new(file), layout)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Results written to: {}", output.display());
    Ok(())
}
