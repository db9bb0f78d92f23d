// src/main.rs

use clap::{Parser, Subcommand};
use order_picklist::config::{self, Config};
use order_picklist::{ResultTable, SheetOptions, extract_from_pdf, write_sheet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "order-picklist",
    version,
    about = "Extract order items from a sales-order PDF into a CSV and a large-font picking sheet"
)]
struct Cli {
    /// TOML config file (missing file = defaults)
    #[arg(short, long, global = true, default_value = "picklist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract items and write the CSV and the picking sheet PDF
    Extract {
        /// Input sales-order PDF
        input: PathBuf,

        /// CSV output path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Picking sheet output path
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Font size for the item columns
        #[arg(long, value_parser = clap::value_parser!(u32).range(config::MIN_FONT_SIZE as i64..=config::MAX_FONT_SIZE as i64))]
        font_size: Option<u32>,
    },
    /// Extract items and print them as JSON
    Preview {
        /// Input sales-order PDF
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    // RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Extract {
            input,
            csv,
            pdf,
            font_size,
        } => {
            let Some(table) = load_table(&input)? else {
                return Ok(());
            };

            let csv_path = csv.unwrap_or(cfg.output.csv_path);
            table.write_csv(&csv_path)?;
            info!(path = %csv_path.display(), rows = table.len(), "CSV written");

            let options = SheetOptions::new(font_size.unwrap_or(cfg.sheet.item_font_size))?;
            let pdf_path = pdf.unwrap_or(cfg.output.pdf_path);
            write_sheet(&table, &options, &pdf_path)?;
            info!(path = %pdf_path.display(), "Picking sheet written");

            println!(
                "{} items -> {} , {}",
                table.len(),
                csv_path.display(),
                pdf_path.display()
            );
        }
        Command::Preview { input } => {
            if let Some(table) = load_table(&input)? {
                println!("{}", table.to_json_pretty()?);
            }
        }
    }

    Ok(())
}

/// Run the pipeline on `input`. `None` means the document had no recognizable items.
fn load_table(input: &Path) -> Result<Option<ResultTable>, Box<dyn std::error::Error>> {
    let span = tracing::info_span!("pdf", file = %input.display());
    let _guard = span.enter();

    let bytes = fs::read(input)?;
    let table = extract_from_pdf(&bytes)?;
    if table.is_empty() {
        eprintln!(
            "No items found in {}. If the order layout changed, the item rules need adjusting.",
            input.display()
        );
        return Ok(None);
    }
    println!("Sensitive data (tax IDs, phones, e-mails) was masked automatically.");
    Ok(Some(table))
}
