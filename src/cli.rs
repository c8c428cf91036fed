use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Parse captured ping output into packet loss and round trip statistics", long_about = None)]
pub struct Cli {
    /// Files holding captured ping output (reads stdin when omitted)
    #[arg(required = false)]
    pub inputs: Vec<PathBuf>,

    /// Output format (text, json, csv)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json", "csv"])]
    pub format: String,

    /// Also show the per-packet replies found before the statistics
    #[arg(short, long)]
    pub replies: bool,

    /// Log at debug level when RUST_LOG is not set
    #[arg(short, long)]
    pub verbose: bool,
}
