//! Batch command - extract many documents and route them to the ledger or review.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use intake_core::extract::{ExtractionResult, FieldParser, HeuristicFieldParser};
use intake_core::ledger::{classify, Disposition, LedgerEntry, ReviewItem};
use intake_core::models::IntakeConfig;
use intake_core::paths::safe_filename;

use super::config::load_config;
use super::extract::{format_fields, read_document_text, MessageArgs, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern (PDF and text files)
    #[arg(required = true)]
    input: String,

    /// Directory for per-file extraction output
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    message: MessageArgs,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Extract and report without writing ledger or review files
    #[arg(long)]
    dry_run: bool,
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    result: Result<ExtractionResult, String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = Arc::new(load_config(config_path)?);
    let dry_run = args.dry_run || config.intake.dry_run;

    if !config.intake.accepts_sender(args.message.sender.as_deref()) {
        println!(
            "{} Skipped batch: sender not allowlisted",
            style("⚠").yellow()
        );
        return Ok(());
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt" | "text")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(HeuristicFieldParser::from_config(&config.extraction));
    let hint: Option<Arc<str>> = args.message.sender.as_deref().map(Arc::from);

    let mut outcomes = stream::iter(files)
        .map(|path| {
            let config = Arc::clone(&config);
            let parser = Arc::clone(&parser);
            let hint = hint.clone();
            tokio::task::spawn_blocking(move || process_file(path, &config, &parser, hint.as_deref()))
        })
        .buffered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(joined) = outcomes.next().await {
        let outcome = joined?;

        if let Err(e) = &outcome.result {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", outcome.path.display(), e);
            } else {
                error!("Failed to process {}: {}", outcome.path.display(), e);
                pb.abandon();
                anyhow::bail!("Processing failed: {}", e);
            }
        }

        pb.inc(1);
        results.push(outcome);
    }

    pb.finish_with_message("Complete");

    let mut ledger_rows = Vec::new();
    let mut review_rows = Vec::new();
    let mut used_names = HashSet::new();

    for outcome in &results {
        let Ok(result) = &outcome.result else {
            continue;
        };

        if let Some(output_dir) = &args.output_dir {
            let name = output_name(&outcome.path, args.format, &mut used_names);
            write_file_output(&output_dir.join(name), result, args.format)?;
        }

        let context = args.message.context(&outcome.path);
        match classify(&result.fields, &context) {
            Disposition::Ledger(entry) => ledger_rows.push(entry),
            Disposition::Review(item) => review_rows.push(item),
        }
    }

    if dry_run {
        info!("Dry run, not writing ledger or review files");
    } else {
        append_ledger(&config.ledger.ledger_file, &ledger_rows)?;
        append_reviews(&config.ledger.todos_file, &review_rows)?;
    }

    let failed: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} ledger-ready, {} need review, {} failed",
        style(ledger_rows.len()).green(),
        style(review_rows.len()).yellow(),
        style(failed.len()).red()
    );

    if !dry_run {
        if !ledger_rows.is_empty() {
            println!(
                "{} Ledger rows appended to {}",
                style("✓").green(),
                config.ledger.ledger_file.display()
            );
        }
        if !review_rows.is_empty() {
            println!(
                "{} Review items appended to {}",
                style("✓").green(),
                config.ledger.todos_file.display()
            );
        }
    }

    if !review_rows.is_empty() {
        println!();
        println!("{}", style("Needs review:").yellow());
        for item in &review_rows {
            println!("  - {}: {}", item.context.source, item.summary);
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            if let Err(e) = &outcome.result {
                println!("  - {}: {}", outcome.path.display(), e);
            }
        }
    }

    Ok(())
}

fn process_file(
    path: PathBuf,
    config: &IntakeConfig,
    parser: &HeuristicFieldParser,
    hint: Option<&str>,
) -> FileOutcome {
    let result = read_document_text(&path, config)
        .map(|text| parser.parse(&text, hint))
        .map_err(|e| e.to_string());

    if let Ok(extracted) = &result {
        debug!(
            "{}: {} warnings in {}ms",
            path.display(),
            extracted.warnings.len(),
            extracted.processing_time_ms
        );
    }

    FileOutcome { path, result }
}

/// Output file name for `source`, unique among the names already in `used`.
///
/// The source extension is kept. A name already taken gets a `-2`, `-3`, ... suffix.
fn output_name(source: &Path, format: OutputFormat, used: &mut HashSet<String>) -> String {
    let base = source
        .file_name()
        .and_then(|s| s.to_str())
        .map(safe_filename)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());

    let mut name = format!("{}.{}", base, format.extension());
    let mut n = 2;
    while !used.insert(name.clone()) {
        name = format!("{}-{}.{}", base, n, format.extension());
        n += 1;
    }
    name
}

fn write_file_output(
    output_path: &Path,
    result: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    fs::write(output_path, format_fields(&result.fields, format)?)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(())
}

fn append_ledger(path: &Path, entries: &[LedgerEntry]) -> anyhow::Result<()> {
    append_rows(
        path,
        &LedgerEntry::HEADERS,
        entries.iter().map(LedgerEntry::to_record),
    )
}

fn append_reviews(path: &Path, items: &[ReviewItem]) -> anyhow::Result<()> {
    append_rows(
        path,
        &ReviewItem::HEADERS,
        items.iter().map(ReviewItem::to_record),
    )
}

/// Append rows to a CSV file, writing the header when the file is new.
fn append_rows<I>(path: &Path, headers: &[&str], rows: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    if is_new {
        wtr.write_record(headers)?;
    }
    for row in rows {
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
