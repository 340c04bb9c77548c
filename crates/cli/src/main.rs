//! tablestitch - Reconstruct ruled tables from a page dump
//!
//! Reads a JSON document of pages (rulings and positioned text), rebuilds
//! the tables on every page, joins tables continued across page breaks and
//! writes them as JSON.

use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tablestitch_core::error::{Result, TableError};
use tablestitch_core::high_level::extract_document;
use tablestitch_core::page::DocumentInput;
use tablestitch_core::params::Config;
use tablestitch_core::table::tables_to_json;
use tracing_subscriber::EnvFilter;

/// Reconstruct ruled tables from a JSON page dump.
#[derive(Parser, Debug)]
#[command(name = "tablestitch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the page dump, or "-" for stdin
    input: String,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// JSON file overriding reconstruction and combination parameters
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Keep tables on their own pages instead of joining continuations
    #[arg(long = "no-cross-page", action = ArgAction::SetTrue)]
    no_cross_page: bool,

    /// Pretty-print the JSON output
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Use debug logging level
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tablestitch=debug,tablestitch_core=debug" } else { "tablestitch=warn,tablestitch_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if args.no_cross_page {
        config.combine.enabled = false;
    }
    Ok(config)
}

fn read_input(input: &str) -> Result<DocumentInput> {
    let document = if input == "-" {
        serde_json::from_reader(BufReader::new(io::stdin()))?
    } else {
        let file = File::open(input)
            .map_err(|e| TableError::InvalidInput(format!("cannot open {input}: {e}")))?;
        serde_json::from_reader(BufReader::new(file))?
    };
    Ok(document)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let document = read_input(&args.input)?;
    tracing::debug!(pages = document.pages.len(), "document loaded");

    let tables = extract_document(&document.pages, &config, None)?;
    let json = tables_to_json(&tables, args.pretty)?;

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(&args.outfile)?))
    };
    writeln!(output, "{json}")?;
    output.flush()?;
    Ok(())
}
