//! CLI entry point for the blood-cancer dataset cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use hema_processing::config::{DEFAULT_FALLBACK_LABEL, DEFAULT_FALLBACK_PATH, DEFAULT_PRIMARY_PATH};
use hema_processing::{
    CategoricalImputation, CleaningConfig, CleaningOutcome, CleaningPipeline,
    DataQualityAnalyzer, DatasetSource, ExportFormat, Exporter, NumericImputation,
    SourceConfig,
};
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible numeric imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNumericImputation {
    /// Use the median of non-null values
    Median,
    /// Use the mean of non-null values
    Mean,
}

impl From<CliNumericImputation> for NumericImputation {
    fn from(cli: CliNumericImputation) -> Self {
        match cli {
            CliNumericImputation::Median => NumericImputation::Median,
            CliNumericImputation::Mean => NumericImputation::Mean,
        }
    }
}

/// CLI-compatible categorical imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCategoricalImputation {
    /// Use the most frequent value (mode)
    Mode,
    /// Use the sentinel label
    Constant,
}

impl From<CliCategoricalImputation> for CategoricalImputation {
    fn from(cli: CliCategoricalImputation) -> Self {
        match cli {
            CliCategoricalImputation::Mode => CategoricalImputation::Mode,
            CliCategoricalImputation::Constant => CategoricalImputation::Constant,
        }
    }
}

/// CLI-compatible export format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliExportFormat {
    /// Clean table as CSV
    Csv,
    /// Clean table as a JSON array of rows
    Json,
    /// Clean table as an Excel workbook
    Xlsx,
    /// Plain-text analysis report
    Summary,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(cli: CliExportFormat) -> Self {
        match cli {
            CliExportFormat::Csv => ExportFormat::Csv,
            CliExportFormat::Json => ExportFormat::Json,
            CliExportFormat::Xlsx => ExportFormat::Xlsx,
            CliExportFormat::Summary => ExportFormat::Summary,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Blood cancer dataset cleaning pipeline",
    long_about = "Cleans the blood-cancer patient dataset and reports what changed.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  HEMA_DATASET            Path to the dataset CSV\n  \
                  HEMA_DATASET_FALLBACK   Path tried when HEMA_DATASET does not exist\n\n\
                  EXAMPLES:\n  \
                  # Clean the default dataset and write CSV + summary\n  \
                  hema-processing\n\n  \
                  # Inspect the raw table without cleaning\n  \
                  hema-processing -i patients.csv --dry-run\n\n  \
                  # Machine-readable report\n  \
                  hema-processing -i patients.csv --json | jq .duplicates_removed"
)]
struct Args {
    /// Path to the dataset CSV
    #[arg(short, long, env = "HEMA_DATASET", default_value = DEFAULT_PRIMARY_PATH)]
    input: PathBuf,

    /// Path tried when the input does not exist
    #[arg(long, env = "HEMA_DATASET_FALLBACK", default_value = DEFAULT_FALLBACK_PATH)]
    fallback: PathBuf,

    /// Columns converted to numbers after reading (comma separated)
    #[arg(long, value_delimiter = ',')]
    numeric_columns: Option<Vec<String>>,

    /// Strategy for imputing missing numeric values
    #[arg(long, value_enum, default_value = "median")]
    numeric_imputation: CliNumericImputation,

    /// Strategy for imputing missing categorical values
    #[arg(long, value_enum, default_value = "mode")]
    categorical_imputation: CliCategoricalImputation,

    /// Label for categorical cells with nothing to impute from
    #[arg(long, default_value = DEFAULT_FALLBACK_LABEL)]
    sentinel: String,

    /// Keep duplicate rows
    #[arg(long)]
    no_dedup: bool,

    /// Leave missing cells empty
    #[arg(long)]
    no_impute: bool,

    /// Leave categorical text as read
    #[arg(long)]
    no_normalize: bool,

    /// Skip outlier counting
    #[arg(long)]
    no_outliers: bool,

    /// Output directory for exported files
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Files to export (comma separated)
    #[arg(long, value_enum, value_delimiter = ',', default_values = ["csv", "summary"])]
    export: Vec<CliExportFormat>,

    /// Output the quality report as JSON to stdout
    ///
    /// Disables all logging; nothing is exported.
    #[arg(long)]
    json: bool,

    /// Show missing values and numeric statistics of the raw table, then exit
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout holds only the
/// JSON report.
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
    // .env must be read before clap resolves env-backed arguments
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let mut source_builder = SourceConfig::builder()
        .primary(args.input.clone())
        .fallback(args.fallback.clone());
    if let Some(columns) = &args.numeric_columns {
        source_builder = source_builder.numeric_columns(columns.iter().map(|c| c.trim()));
    }
    let source = DatasetSource::new(source_builder.build()?);

    let dataset = source.load().context("Failed to load dataset")?;
    info!(
        "Dataset loaded: {} rows x {} columns",
        dataset.table.height(),
        dataset.table.width()
    );

    if args.dry_run {
        return run_dry_run(&dataset);
    }

    let config = CleaningConfig::builder()
        .remove_duplicates(!args.no_dedup)
        .impute_missing(!args.no_impute)
        .normalize_text(!args.no_normalize)
        .flag_outliers(!args.no_outliers)
        .numeric_imputation(args.numeric_imputation.into())
        .categorical_imputation(args.categorical_imputation.into())
        .fallback_label(args.sentinel.as_str())
        .build()?;

    let mut builder = CleaningPipeline::builder().config(config);
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
    let pipeline = builder.build()?;

    let outcome = pipeline.run_loaded(&dataset).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    let formats: Vec<ExportFormat> = args.export.iter().map(|f| (*f).into()).collect();
    let exporter = Exporter::new(&args.output, None);
    let written = exporter.export(&outcome.clean, Some(&outcome.report), &formats)?;

    print_summary(&dataset.path, &outcome, &written);
    Ok(())
}

/// Print the raw table's missing values and numeric statistics.
///
/// Uses `println!` so the preview is visible regardless of log level.
fn run_dry_run(dataset: &hema_processing::LoadedDataset) -> Result<()> {
    let overview = DataQualityAnalyzer::overview(&dataset.table)?;

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Raw dataset preview");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", dataset.path.display());
    println!("  Rows: {}", overview.rows);
    println!("  Columns: {}", overview.columns);
    println!("  Duplicate rows: {}", overview.duplicates);
    if let Some(diagnoses) = overview.diagnoses {
        println!("  Diagnoses: {}", diagnoses);
    }
    println!();

    println!("MISSING VALUES");
    println!("{}", "-".repeat(40));
    let missing: Vec<_> = overview
        .missing
        .iter()
        .filter(|entry| entry.missing_count > 0)
        .collect();
    if missing.is_empty() {
        println!("  No missing values");
    } else {
        println!("{:<20} {:>10} {:>10}", "Column", "Missing", "Percent");
        for entry in missing {
            println!(
                "{:<20} {:>10} {:>9.1}%",
                truncate_str(&entry.column, 19),
                entry.missing_count,
                entry.missing_percentage
            );
        }
    }
    println!();

    println!("NUMERIC STATISTICS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<14} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}",
        "Column", "Count", "Mean", "Std", "Min", "Median", "Max", "Skew", "Kurt"
    );
    for summary in &overview.numeric {
        println!(
            "{:<14} {:>6} {:>10.2} {:>10} {:>10.2} {:>10.2} {:>10.2} {:>8} {:>8}",
            truncate_str(&summary.column, 13),
            summary.count,
            summary.mean,
            fmt_optional(summary.std),
            summary.min,
            summary.median,
            summary.max,
            fmt_optional(summary.skewness),
            fmt_optional(summary.kurtosis)
        );
    }
    if dataset.cells_invalidated > 0 {
        println!(
            "\n  {} cells in numeric columns could not be parsed",
            dataset.cells_invalidated
        );
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To clean the dataset, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a human-readable summary of the cleaning run.
fn print_summary(input: &std::path::Path, outcome: &CleaningOutcome, written: &[PathBuf]) {
    let report = &outcome.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        input.display(),
        report.rows_before,
        report.columns_before
    );
    println!(
        "Output: {} rows x {} columns",
        report.rows_after, report.columns_after
    );
    println!();

    println!("Cleaning Summary:");
    println!("  Duration: {}ms", report.duration_ms);
    println!(
        "  Duplicates removed: {} ({:.1}%)",
        report.duplicates_removed,
        report.duplicate_percentage()
    );
    println!("  Missing cells before: {}", report.total_missing_before());
    println!(
        "  Cells imputed: {}",
        report
            .imputations
            .iter()
            .map(|r| r.cells_filled)
            .sum::<usize>()
    );
    println!("  Text columns normalized: {}", report.normalized_columns.len());
    println!("  Outliers flagged: {}", report.outliers_detected);
    println!();

    if !report.outliers_by_column.is_empty() {
        println!("Outliers by Column:");
        for column in &report.outliers_by_column {
            println!(
                "  - {}: {} outside [{:.2}, {:.2}]",
                column.column, column.count, column.lower_bound, column.upper_bound
            );
        }
        println!();
    }

    if !report.skipped.is_empty() {
        println!("Skipped:");
        for skipped in &report.skipped {
            println!(
                "  ! {} during {}: {:?}",
                skipped.column, skipped.stage, skipped.reason
            );
        }
        println!();
    }

    if !written.is_empty() {
        println!("Files Written:");
        for path in written {
            println!("  - {}", path.display());
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
