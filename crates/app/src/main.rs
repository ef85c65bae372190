//! extracto CLI
//!
//! Turns a scanned dot-matrix transaction report into FECHA / DESCRIPCION /
//! MONTO / DOCUMENTO rows.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod export;

#[derive(Parser)]
#[command(name = "extracto")]
#[command(about = "Extract transaction rows from scanned dot-matrix reports", long_about = None)]
struct Cli {
    /// Pipeline config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess an image, run OCR, and extract rows
    Extract {
        /// Scanned page (PNG, JPEG or BMP)
        image: PathBuf,

        /// Write the binarized image handed to the OCR engine
        #[arg(long)]
        save_prepared: Option<PathBuf>,

        /// Tesseract data directory
        #[arg(long)]
        tessdata: Option<String>,

        #[command(flatten)]
        tuning: TuningArgs,

        #[command(flatten)]
        parse: ParseArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract rows from OCR text saved to a file
    Parse {
        /// Plain-text OCR output
        text: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThresholdMode {
    Adaptive,
    Fixed,
}

#[derive(Debug, Default, Args)]
pub struct TuningArgs {
    /// Binarization strategy
    #[arg(long, value_enum)]
    pub threshold: Option<ThresholdMode>,

    /// Cutoff for the fixed threshold (0-255)
    #[arg(long)]
    pub cutoff: Option<u8>,

    /// Upscale factor before binarization
    #[arg(long)]
    pub upscale: Option<u32>,
}

#[derive(Debug, Default, Args)]
pub struct ParseArgs {
    /// Minimum trimmed length of a candidate line
    #[arg(long)]
    pub min_line_length: Option<usize>,

    /// Drop rows that have no document number after the amount
    #[arg(long)]
    pub require_document: bool,
}

#[derive(Debug, Default, Args)]
pub struct OutputArgs {
    /// Write the rows to this file: Excel for `.xlsx`, CSV otherwise
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the rows as JSON instead of a text table
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            image,
            save_prepared,
            tessdata,
            tuning,
            parse,
            output,
        } => {
            let config = commands::apply_overrides(config, &parse, Some(&tuning))?;
            commands::extract(&image, config, save_prepared.as_deref(), tessdata, &output).await
        }
        Commands::Parse {
            text,
            parse,
            output,
        } => {
            let config = commands::apply_overrides(config, &parse, None)?;
            commands::parse(&text, &config, &output)
        }
    }
}
