//! Extract command - pull ledger fields out of a single document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use intake_core::extract::{FieldParser, HeuristicFieldParser};
use intake_core::ledger::{classify, Disposition, DocumentContext};
use intake_core::models::{ExtractedFields, IntakeConfig};
use intake_core::pdf::{PdfExtractor, PdfType};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF or plain text, e.g. OCR output)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    message: MessageArgs,

    /// Vendor name hint (takes precedence over the sender)
    #[arg(long)]
    vendor_hint: Option<String>,

    /// Show extraction warnings and the ledger gate outcome
    #[arg(long)]
    show_warnings: bool,
}

/// Where a document came from, recorded on ledger and review rows.
#[derive(Args, Clone, Debug, Default)]
pub struct MessageArgs {
    /// Sender address; checked against the allowlist and used as vendor hint
    #[arg(long)]
    pub sender: Option<String>,

    /// Id of the message the document arrived with
    #[arg(long)]
    pub message_id: Option<String>,

    /// Subject of the message the document arrived with
    #[arg(long)]
    pub subject: Option<String>,
}

impl MessageArgs {
    /// Document context for `source` carrying the message details.
    pub fn context(&self, source: &Path) -> DocumentContext {
        let mut context = DocumentContext::new(source.display().to_string());
        if let Some(sender) = &self.sender {
            context = context.with_sender(sender.clone());
        }
        if let Some(message_id) = &self.message_id {
            context = context.with_message_id(message_id.clone());
        }
        if let Some(subject) = &self.subject {
            context = context.with_subject(subject.clone());
        }
        context
    }
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

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if !config.intake.accepts_sender(args.message.sender.as_deref()) {
        println!(
            "{} Skipped {}: sender not allowlisted",
            style("⚠").yellow(),
            args.input.display()
        );
        return Ok(());
    }

    info!("Processing file: {}", args.input.display());

    let text = read_document_text(&args.input, &config)?;
    let hint = args
        .vendor_hint
        .as_deref()
        .or(args.message.sender.as_deref());

    let parser = HeuristicFieldParser::from_config(&config.extraction);
    let result = parser.parse(&text, hint);

    let output = format_fields(&result.fields, args.format)?;

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

    if args.show_warnings {
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }

        let context = args.message.context(&args.input);
        match classify(&result.fields, &context) {
            Disposition::Ledger(_) => eprintln!("{} Ledger-ready", style("✓").green()),
            Disposition::Review(item) => {
                eprintln!("{} {}", style("✗").red(), item.summary);
                eprintln!("{}", item.details);
            }
        }
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read the text of a PDF or plain-text document.
pub fn read_document_text(path: &Path, config: &IntakeConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::from_config(&config.pdf);
            let content = extractor.load_content(&data)?;

            if content.pdf_type != PdfType::Text {
                warn!(
                    "{} has little extractable text ({:?}); pass OCR text output for better results",
                    path.display(),
                    content.pdf_type
                );
            }
            Ok(content.text)
        }
        "txt" | "text" => Ok(fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Format extracted fields for output.
pub fn format_fields(fields: &ExtractedFields, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_csv(fields: &ExtractedFields) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_date",
        "vendor",
        "total",
        "vat_amount",
        "vat_numbers",
        "company_numbers",
    ])?;

    wtr.write_record([
        fields.invoice_date.map(|d| d.to_string()).unwrap_or_default(),
        fields.vendor.clone().unwrap_or_default(),
        fields.total.map(|t| t.to_string()).unwrap_or_default(),
        fields.vat_amount.map(|v| v.to_string()).unwrap_or_default(),
        join_identifiers(fields.vat_numbers.as_ref()),
        join_identifiers(fields.company_numbers.as_ref()),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(fields: &ExtractedFields) -> String {
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let mut output = String::new();
    output.push_str(&format!(
        "Date:    {}\n",
        show(fields.invoice_date.map(|d| d.to_string()))
    ));
    output.push_str(&format!("Vendor:  {}\n", show(fields.vendor.clone())));
    output.push_str(&format!(
        "Total:   {}\n",
        show(fields.total.map(|t| t.to_string()))
    ));
    output.push_str(&format!(
        "VAT:     {}\n",
        show(fields.vat_amount.map(|v| v.to_string()))
    ));

    if let Some(numbers) = &fields.vat_numbers {
        output.push_str("\nVAT numbers:\n");
        for number in numbers {
            output.push_str(&format!("  {}\n", number));
        }
    }
    if let Some(numbers) = &fields.company_numbers {
        output.push_str("\nCompany numbers:\n");
        for number in numbers {
            output.push_str(&format!("  {}\n", number));
        }
    }

    output
}

fn join_identifiers(set: Option<&std::collections::BTreeSet<String>>) -> String {
    set.map(|s| s.iter().cloned().collect::<Vec<_>>().join("; "))
        .unwrap_or_default()
}
