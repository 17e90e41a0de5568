//! CLI entry point for the catalog normalization pipeline.

use anyhow::{Context, Result, anyhow};
use catalog_processing::frame::{load_catalog_csv, records_from_frame};
use catalog_processing::utils::truncate_str;
use catalog_processing::{
    CatalogInsights, CatalogReport, CleaningConfig, Pipeline, RawRecord, ReportGenerator, TextField,
};
use clap::Parser;
use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Environment variable consulted when `--config` is not given.
const CONFIG_ENV_VAR: &str = "CATALOG_CONFIG";

/// Rows shown by `--dry-run`.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Catalog Normalization Pipeline",
    long_about = "Cleans movie/TV catalog exports: defaults for missing values, whitespace \
                  normalization, alias canonicalization, title casing and typed date/duration \
                  fields.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  CATALOG_CONFIG    Path to a JSON cleaning config (used when --config is absent)\n  \
                  RUST_LOG          Overrides --log-level\n\n\
                  EXAMPLES:\n  \
                  # Clean with default aliases and date formats\n  \
                  catalog-processing -i netflix_titles.csv\n\n  \
                  # Custom aliases, report and insights\n  \
                  catalog-processing -i netflix_titles.csv --config catalog.json -r --insights\n\n  \
                  # Preview without writing anything\n  \
                  catalog-processing -i netflix_titles.csv --dry-run"
)]
struct Args {
    /// Path to the catalog CSV file
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// JSON cleaning configuration (aliases, date formats, defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Custom output file name (without extension)
    ///
    /// If not specified, uses the input file name
    #[arg(long)]
    output_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <output_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Compute catalog insights (top countries, genres, titles per year, ...)
    #[arg(long)]
    insights: bool,

    /// Number of entries in each ranked insight list
    #[arg(long, default_value = "10")]
    top: usize,

    /// Clean records on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Number of worker threads for parallel cleaning
    #[arg(long, conflicts_with = "sequential")]
    threads: Option<usize>,

    /// Preview cleaning on the first rows without writing files
    #[arg(long)]
    dry_run: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = load_config(&args)?;

    info!("Loading catalog from: {}", args.input);
    let df = load_catalog_csv(&args.input)?;
    let records = records_from_frame(&df)?;
    info!("Catalog loaded: {} records", records.len());

    let pipeline = build_pipeline(&args, config)?;

    if args.dry_run {
        return run_dry_run(&args, &pipeline, &records);
    }

    run_pipeline(&pipeline, &args, &records)
}

/// Resolve the configuration file, then apply CLI overrides.
fn load_config(args: &Args) -> Result<CleaningConfig> {
    let path = args.config.clone().or_else(|| env::var(CONFIG_ENV_VAR).ok());

    let mut config = match path {
        Some(path) => {
            info!("Loading cleaning config from: {}", path);
            CleaningConfig::from_json_file(&path)
                .with_context(|| format!("Failed to load config {}", path))?
        }
        None => CleaningConfig::default(),
    };

    if args.sequential {
        config.parallel = false;
    }
    if let Some(threads) = args.threads {
        config.worker_threads = Some(threads);
    }

    Ok(config)
}

fn build_pipeline(args: &Args, config: CleaningConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Run the pipeline, write outputs and print results.
fn run_pipeline(pipeline: &Pipeline, args: &Args, records: &[RawRecord]) -> Result<()> {
    let outcome = pipeline.process(records).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    let input_stem = extract_file_stem(&args.input);
    let generator = ReportGenerator::new(PathBuf::from(&args.output), args.output_name.clone());

    let csv_path = generator.write_clean_csv(&outcome.records, &input_stem)?;

    let insights = args
        .insights
        .then(|| CatalogInsights::from_records(&outcome.records, args.top));

    let csv_display = csv_path.to_string_lossy();
    let report = ReportGenerator::build_report(
        &args.input,
        Some(csv_display.as_ref()),
        &outcome,
        insights,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = generator.write_report_to_file(&report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report);
    Ok(())
}

/// Dry-run mode: clean the first rows and show them before and after.
///
/// Uses `println!` intentionally: this output is the purpose of `--dry-run`
/// and must be visible regardless of log level.
fn run_dry_run(args: &Args, pipeline: &Pipeline, records: &[RawRecord]) -> Result<()> {
    let preview = &records[..records.len().min(PREVIEW_ROWS)];
    let outcome = pipeline.process(preview)?;

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of cleaning");
    println!("{}\n", "=".repeat(80));

    println!("  File: {}", args.input);
    println!("  Records: {}", records.len());
    println!("  Previewing: {}", preview.len());
    println!();

    let fields = [
        TextField::Title,
        TextField::Country,
        TextField::DateAdded,
        TextField::Rating,
        TextField::Duration,
    ];

    let mut cleaned = outcome.records.iter();
    for (index, raw) in preview.iter().enumerate() {
        if let Some(rejection) = outcome.rejections.iter().find(|r| r.index == index) {
            println!("#{index} REJECTED: {}", rejection.message);
            println!();
            continue;
        }
        let Some(clean) = cleaned.next() else {
            break;
        };

        println!("#{index} {}", clean.id);
        println!("  {:<12} {:<32} {:<32}", "Field", "Before", "After");
        println!("  {}", "-".repeat(76));
        for field in fields {
            let before = raw.get(field).unwrap_or("<absent>");
            let after = clean.text(field).unwrap_or_else(|| "<absent>".to_string());
            println!(
                "  {:<12} {:<32} {:<32}",
                field.as_str(),
                truncate_str(before, 31),
                truncate_str(&after, 31)
            );
        }
        println!();
    }

    println!("No files written (dry run)");
    println!("{}", "=".repeat(80));
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("catalog")
        .to_string()
}

/// Print a human-readable summary of the run.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(report: &CatalogReport) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("NORMALIZATION COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Input:  {} ({} records)", report.input_file, summary.records_in);
    if let Some(ref output_file) = report.output_file {
        println!("Output: {} ({} records)", output_file, summary.records_cleaned);
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Records: {} cleaned, {} rejected ({:.1}%)",
        summary.records_cleaned,
        summary.records_rejected,
        summary.rejection_percentage()
    );
    println!("  Defaults substituted: {}", summary.total_defaults());
    for (field, count) in &summary.defaults_substituted {
        println!("    {:<12} {}", field.as_str(), count);
    }
    println!("  Aliases rewritten: {}", summary.aliases_rewritten);
    println!(
        "  Dates: {} parsed, {} unparsed, {} missing",
        summary.dates_parsed, summary.dates_unparsed, summary.dates_missing
    );
    println!(
        "  Durations: {} parsed, {} kept as text",
        summary.durations_parsed, summary.durations_unparsed
    );
    println!();

    if let Some(ref insights) = report.insights {
        println!("Insights:");
        for (kind, count) in &insights.count_by_kind {
            println!("  {:<12} {}", kind, count);
        }
        let top_countries: Vec<String> = insights
            .top_countries
            .iter()
            .take(5)
            .map(|c| format!("{} ({})", c.value, c.count))
            .collect();
        if !top_countries.is_empty() {
            println!("  Top countries: {}", top_countries.join(", "));
        }
        if let Some(ref movie) = insights.longest_movie {
            println!("  Longest movie: {} ({} min)", movie.title, movie.minutes);
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save detailed JSON report");
    println!("{}", "=".repeat(80));
}
