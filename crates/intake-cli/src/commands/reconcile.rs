//! Reconcile command - parse a bank statement export into a JSON report.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use intake_core::bank::{parse_statement, BankTransaction, ColumnMap};

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// Bank statement CSV export
    #[arg(required = true)]
    input: PathBuf,

    /// Report output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Field delimiter of the export
    #[arg(short, long, default_value = ",")]
    delimiter: char,
}

#[derive(Serialize)]
struct StatementReport {
    generated_at: DateTime<Utc>,
    source: String,
    columns: ColumnMap,
    count: usize,
    transactions: Vec<BankTransaction>,
}

pub async fn run(args: ReconcileArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !args.delimiter.is_ascii() {
        anyhow::bail!("Delimiter must be a single ASCII character");
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(args.delimiter as u8)
        .flexible(true)
        .from_path(&args.input)?;

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(String::from).collect());
    }

    let statement = parse_statement(&headers, rows)?;
    info!(
        "Parsed {} transactions from {}",
        statement.transactions.len(),
        args.input.display()
    );

    let report = StatementReport {
        generated_at: Utc::now(),
        source: args.input.display().to_string(),
        columns: statement.columns,
        count: statement.transactions.len(),
        transactions: statement.transactions,
    };
    let output = serde_json::to_string_pretty(&report)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Report with {} transactions written to {}",
            style("✓").green(),
            report.count,
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
