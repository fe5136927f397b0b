use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use quillq::config::Config;
use quillq::document::tree::DocumentStore;
use quillq::engine::Engine;
use quillq::file::loader::{load_documents, load_documents_from_stdin};
use quillq::file::printer::{Printer, PrinterOptions};

/// quillq - A structural YAML query engine with anchor-aware document merging
#[derive(Parser)]
#[command(name = "quillq")]
#[command(version)]
#[command(about = "Query and merge YAML documents", long_about = None)]
struct Cli {
    /// Expression to evaluate, e.g. '.a * .b'
    expression: String,

    /// YAML files to read (omit to read from stdin when piped)
    files: Vec<PathBuf>,

    /// Evaluate against a single null document instead of reading input
    #[arg(short, long)]
    null_input: bool,

    /// Print results in the D<doc>, P[<path>], (<tag>)::<yaml> form
    #[arg(long)]
    trace: bool,

    /// Spaces per indentation level (overrides the config file)
    #[arg(short = 'I', long)]
    indent: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(config: &Config, verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn load_input(cli: &Cli) -> Result<DocumentStore> {
    if cli.null_input {
        return Ok(DocumentStore::null_input());
    }
    if !cli.files.is_empty() {
        return load_documents(&cli.files);
    }
    if !io::stdin().is_terminal() {
        return load_documents_from_stdin();
    }
    Ok(DocumentStore::null_input())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut config, config_error) = match Config::try_load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    if let Some(indent) = cli.indent {
        config.indent_size = indent;
    }
    init_tracing(&config, cli.verbose);
    if let Some(err) = config_error {
        let message = format!("{:#}", err);
        tracing::warn!(error = %message, "ignoring config file, using defaults");
    }

    let expr = quillq::query::Parser::parse(&cli.expression)
        .with_context(|| format!("Failed to parse expression '{}'", cli.expression))?;
    let store = load_input(&cli)?;
    tracing::debug!(documents = store.len(), "input loaded");

    let results = Engine::new(&store)
        .evaluate_documents(&expr)
        .context("Failed to evaluate expression")?;

    let printer = Printer::new(PrinterOptions::from_config(&config));
    let output = if cli.trace {
        results.iter().map(|value| printer.trace(value)).collect()
    } else {
        printer.render_context(&results, config.document_separators)
    };

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;
    Ok(())
}
