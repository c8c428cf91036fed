mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use pingparse::output::{csv_summary, json_summary, text_summary};
use pingparse::PingParser;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let inputs = read_inputs(&cli.inputs)?;

    // Parse every input; a broken statistics block is reported but does not
    // stop the others from printing.
    let mut reports: Vec<(&str, PingParser)> = Vec::new();
    let mut failed = false;
    for (label, text) in &inputs {
        let mut parser = PingParser::new();
        match parser.parse(text) {
            Ok(()) => reports.push((label.as_str(), parser)),
            Err(e) => {
                eprintln!("{}", format!("Error parsing {}: {}", label, e).red());
                failed = true;
            }
        }
    }

    match cli.format.as_str() {
        "json" => {
            for (_, parser) in &reports {
                println!("{}", json_summary(parser, cli.replies)?);
            }
        }
        "csv" => {
            let csv = csv_summary(reports.iter().map(|(label, parser)| (*label, parser)))?;
            print!("{}", csv);
        }
        _ => {
            for (label, parser) in &reports {
                println!("{}\n", text_summary(label, parser, cli.replies));
            }
        }
    }

    if failed {
        process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Windows consoles may hand us non UTF-8 bytes; decode lossily.
fn read_inputs(paths: &[PathBuf]) -> Result<Vec<(String, String)>> {
    if paths.is_empty() {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read ping output from stdin")?;
        return Ok(vec![("-".to_string(), String::from_utf8_lossy(&bytes).into_owned())]);
    }

    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read ping output from {}", path.display()))?;
            Ok((path.display().to_string(), String::from_utf8_lossy(&bytes).into_owned()))
        })
        .collect()
}
