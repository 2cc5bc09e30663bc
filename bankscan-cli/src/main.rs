use anyhow::{bail, Context, Result};
use bankscan_finance::StatementSummary;
use bankscan_ingest::{default_registry, process_ocr_output, process_statement, EntityRecognizer};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod ocr_client;
mod state;

use ocr_client::HttpOcr;

#[derive(Parser, Debug)]
#[command(
    name = "bankscan",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BANKSCAN_BUILD_SHA"), ")"),
    about = "Normalize OCR'd bank statement tables into transaction records"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered statement layouts
    Layouts,

    /// Parse one statement into transaction records (JSON)
    Parse(ParseArgs),

    /// Print income / expense totals of a processed statement
    Summary {
        /// Output of `bankscan parse`
        processed: PathBuf,
    },

    /// Manage ~/.bankscan/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Layout id (see `bankscan layouts`); defaults to [parse].default_layout
    #[arg(long)]
    layout: Option<String>,

    /// Saved table-recognition response; runs offline
    #[arg(long, conflicts_with = "image")]
    ocr_json: Option<PathBuf>,

    /// Statement image, sent to the configured OCR endpoint
    #[arg(long)]
    image: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Storage reference recorded with the output
    #[arg(long)]
    source_ref: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("install tracing subscriber")?;

    let cli = Cli::parse();

    match cli.command {
        Command::Layouts => {
            for layout in default_registry().layouts() {
                println!("{layout}");
            }
        }

        Command::Parse(args) => parse(args)?,

        Command::Summary { processed } => summary(&processed)?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let Some(layout) = args.layout.or(cfg.parse.default_layout) else {
        bail!("no layout given: pass --layout <id> or set [parse].default_layout (see: bankscan layouts)");
    };
    let source_ref = args.source_ref.as_deref();
    let registry = default_registry();

    let processed = match (args.ocr_json, args.image) {
        (Some(path), _) => {
            let response = state::read_json(&path)?;
            process_ocr_output(registry, &layout, &response, None, source_ref)
                .with_context(|| format!("processing {}", path.display()))?
        }
        (None, Some(path)) => {
            let image = state::read_bytes(&path)?;
            let ocr = HttpOcr::from_config(&cfg.ocr)?;
            let entities = ocr
                .has_entity_endpoint()
                .then_some(&ocr as &dyn EntityRecognizer);
            let source_ref = source_ref.or_else(|| path.to_str());
            process_statement(registry, &layout, &ocr, entities, &image, source_ref)
                .with_context(|| format!("processing {}", path.display()))?
        }
        (None, None) => bail!("pass --ocr-json <file> or --image <file>"),
    };

    state::write_json(&processed, args.out.as_deref())?;
    if let Some(out) = &args.out {
        eprintln!(
            "Wrote {} transactions ({}) to {}",
            processed.transactions.len(),
            processed.layout,
            out.display()
        );
    }
    Ok(())
}

fn summary(path: &Path) -> Result<()> {
    let processed = state::read_processed(path)?;
    let s = StatementSummary::from_transactions(&processed.transactions);

    println!("Layout:       {}", processed.layout);
    println!(
        "Account:      {}",
        processed.account_number.as_deref().unwrap_or("(not recovered)")
    );
    println!("Transactions: {}", s.transaction_count);
    println!("Income:       {:.2}", s.total_income);
    println!("Expense:      {:.2}", s.total_expense);
    println!("Net:          {:.2}", s.net_amount);

    let mut by_type: Vec<_> = s.by_type.iter().collect();
    by_type.sort_by_key(|(kind, _)| kind.label());
    for (kind, count) in by_type {
        println!("  {kind}: {count}");
    }
    Ok(())
}
