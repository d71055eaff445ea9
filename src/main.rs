// src/main.rs
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hoops_extract::utils::{self, AppError};
use hoops_extract::{AnalysisBundle, DataExtractor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Excel,
    All,
}

impl OutputFormat {
    fn includes(self, other: OutputFormat) -> bool {
        self == OutputFormat::All || self == other
    }
}

/// Command Line Interface for exporting basketball tracking data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Analysis bundle (JSON) written by the tracking pipeline
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for extracted data
    #[arg(short, long, env = "HOOPS_OUTPUT_DIR", default_value = "extracted_data")]
    output_dir: PathBuf,

    /// Which files to write
    #[arg(short, long, value_enum, default_value_t = OutputFormat::All)]
    format: OutputFormat,

    /// File stem for the outputs (default: basketball_analysis_<timestamp>)
    #[arg(short, long)]
    name: Option<String>,

    /// Print the summary report as JSON to stdout
    #[arg(short, long)]
    summary: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    if matches!(args.name.as_deref(), Some("")) {
        return Err(AppError::Config("Output name must not be empty".to_string()));
    }

    // 3. Load the tracking output
    let bundle = AnalysisBundle::from_path(&args.input)?;

    // 4. Extract records
    let mut extractor = DataExtractor::new(&args.output_dir)?;
    extractor.extract_all(&bundle);

    let data = extractor.data();
    tracing::info!(
        "Extracted {} player, {} ball, {} pass, {} interception, {} speed, {} possession records",
        data.player_data.len(),
        data.ball_data.len(),
        data.pass_data.len(),
        data.interception_data.len(),
        data.speed_data.len(),
        data.team_possession_data.len()
    );

    // 5. Persist requested formats
    let name = args.name.as_deref();
    if args.format.includes(OutputFormat::Json) {
        let filename = name.map(|n| format!("{}.json", n));
        let path = extractor.save_to_json(filename.as_deref())?;
        tracing::info!("Saved structured file to: {}", path.display());
    }

    if args.format.includes(OutputFormat::Csv) {
        let paths = extractor.save_to_csv(name)?;
        tracing::info!("Saved {} CSV files", paths.len());
    }

    if args.format.includes(OutputFormat::Excel) {
        if extractor.is_empty() {
            tracing::warn!("No records extracted, skipping workbook");
        } else {
            let filename = name.map(|n| format!("{}.xlsx", n));
            let path = extractor.save_to_excel(filename.as_deref())?;
            tracing::info!("Saved workbook to: {}", path.display());
        }
    }

    // 6. Report
    let summary = extractor.summary();
    tracing::info!(
        "Summary: {} frames, {} players, {} passes, {} interceptions, {:.2}s",
        summary.total_frames_analyzed,
        summary.total_players_detected,
        summary.total_passes,
        summary.total_interceptions,
        summary.analysis_duration_seconds
    );

    if args.summary {
        let report = serde_json::to_string_pretty(&summary)?;
        println!("{}", report);
    }

    Ok(())
}
