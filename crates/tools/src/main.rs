use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use grove_core::journal_file::load_journal_from_file;
use grove_core::{BalanceConfig, InputJournal, ReplayResult, replay_to_end};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Replays a recorded run headless and prints its final hash")]
struct Args {
    /// Journal to replay: a `.jsonl` hash-chained file or a pretty JSON journal
    #[arg(short, long)]
    journal: PathBuf,
    /// Balance overrides in TOML; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Fail unless the final snapshot hash equals this value
    #[arg(long)]
    expect_hash: Option<u64>,
    /// Print the result as one JSON object
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn load_journal(path: &Path) -> Result<InputJournal> {
    if path.extension().is_some_and(|ext| ext == "jsonl") {
        let loaded = load_journal_from_file(path)
            .with_context(|| format!("failed to load journal file {}", path.display()))?;
        return Ok(loaded.journal);
    }
    InputJournal::load(path).with_context(|| format!("failed to load journal {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BalanceConfig::load(path)
            .with_context(|| format!("failed to load balance config {}", path.display()))?,
        None => BalanceConfig::default(),
    };
    let journal = load_journal(&args.journal)?;
    info!(seed = journal.seed, inputs = journal.inputs.len(), "replaying");

    let result: ReplayResult =
        replay_to_end(&journal, &config).context("replay failed during execution")?;

    if args.json {
        let summary = serde_json::json!({
            "seed": journal.seed,
            "final_round": result.final_round,
            "outcome": result.outcome,
            "final_snapshot_hash": result.final_snapshot_hash,
            "applied_inputs": result.applied_inputs,
        });
        println!("{summary}");
    } else {
        println!("Replay complete.");
        println!("Seed: {}", journal.seed);
        println!("Inputs applied: {}", result.applied_inputs);
        println!("Final round: {}", result.final_round);
        println!("Outcome: {:?}", result.outcome);
        println!("Snapshot hash: {}", result.final_snapshot_hash);
    }

    if let Some(expected) = args.expect_hash
        && expected != result.final_snapshot_hash
    {
        bail!(
            "snapshot hash mismatch: expected {expected}, replay produced {}",
            result.final_snapshot_hash
        );
    }
    Ok(())
}
