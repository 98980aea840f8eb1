use std::{
    fs::File,
    io::{
        self,
        BufRead,
        BufReader,
    },
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use dns_stats::{
    knobs::STATS_TOP_DEFAULT,
    TopStats,
};
use serde_json::Value as JsonValue;

/// Rank the hosts, clients and block reasons in a query log.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Query log with one JSON entry per line. Reads stdin when omitted.
    #[arg(long)]
    log: Option<PathBuf>,

    /// How many entries each ranking keeps. Defaults to `STATS_TOP_DEFAULT`.
    #[arg(long)]
    top: Option<usize>,
}

fn read_entries(reader: impl BufRead) -> anyhow::Result<Vec<JsonValue>> {
    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read query log")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("Skipping malformed query log line {}: {e}", i + 1),
        }
    }
    Ok(entries)
}

fn main() -> anyhow::Result<()> {
    let _guard = cmd_util::env::config_tool();
    let args = Args::parse();

    let entries = match &args.log {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Couldn't open {}", path.display()))?;
            read_entries(BufReader::new(file))?
        },
        None => read_entries(io::stdin().lock())?,
    };
    tracing::info!("Read {} query log entries", entries.len());

    let top = args.top.unwrap_or(*STATS_TOP_DEFAULT);
    let stats = TopStats::compute(&entries, top);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
