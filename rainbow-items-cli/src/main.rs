//! rainbow-items - query a directory of serialized items.
//!
//! Commands:
//! - `rainbow-items id <ID>`: Look up an item by id
//! - `rainbow-items path <PATH>`: Look up an item by path
//! - `rainbow-items field <NAME_OR_ID>`: Check that a reference is a template field
//! - `rainbow-items permits <FIELD> <TEMPLATE>`: Check a field against a template
//! - `rainbow-items templates <FIELD_ID>`: List the templates a field may be used on
//! - `rainbow-items stats`: Summarize the loaded documents
//!
//! Exit codes:
//! - 0: Every check passed
//! - 1: Error
//! - 2: A check reported a finding

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use rainbow_items::ItemValidator;
use rainbow_items_cli::{load_documents, run, Cli, CliConfig};
use tracing_subscriber::EnvFilter;

/// Exit code returned when a check reports a finding.
const FINDING_EXIT_CODE: i32 = 2;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("rainbow_items=debug,rainbow_items_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run_cli(&cli) {
        Ok(true) => 0,
        Ok(false) => FINDING_EXIT_CODE,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(exit_code);
}

/// Load documents, run the command and print its report.
///
/// Returns whether the check passed.
fn run_cli(cli: &Cli) -> Result<bool> {
    let config = CliConfig::load(&cli.root, cli.max_depth)?;
    let docs = load_documents(&cli.root, &config)?;
    let validator = ItemValidator::with_config(config.resolver_config());

    let outcome = run(&cli.command, &validator, &docs)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &outcome.report)
        .context("writing report")?;
    writeln!(stdout).context("writing report")?;
    Ok(outcome.passed)
}
