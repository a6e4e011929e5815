use anyhow::Result;
use clap::{Parser, Subcommand};
use reelcore::persist::{load_meta, load_reels_from_path, save_meta, MetaFile, SledReelStore, StorePaths};
use reelcore::query::SearchEngine;
use reelcore::store::ReelStore;
use reelcore::{Reel, ReelStatus};
use tracing_subscriber::{EnvFilter, fmt};

use std::collections::HashMap;
use std::path::Path;

#[derive(Parser)]
#[command(name = "reel-indexer")]
#[command(about = "Load reel records into the search store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest reels from JSON/JSONL files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Store directory
        #[arg(long, default_value = "./store")]
        output: String,
    },
    /// Print reel counts and trending tags for a store
    Stats {
        /// Store directory
        #[arg(long, default_value = "./store")]
        store: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_store(&input, &output),
        Commands::Stats { store } => print_stats(&store),
    }
}

fn build_store(input: &str, output: &str) -> Result<()> {
    let paths = StorePaths::new(output);
    let store = SledReelStore::open(&paths)?;
    let reels = load_reels_from_path(Path::new(input))?;

    let mut skipped = 0usize;
    let read = reels.len();
    for reel in reels {
        if reel.id.trim().is_empty() {
            tracing::warn!(title = %reel.title, "skipping reel without id");
            skipped += 1;
            continue;
        }
        store.insert(reel)?;
    }
    store.flush()?;

    let num_reels = store.len()? as u64;
    tracing::info!(read, skipped, num_reels, "ingested reels");

    let meta = MetaFile {
        num_reels,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output, "store build complete");
    Ok(())
}

fn print_stats(dir: &str) -> Result<()> {
    let paths = StorePaths::new(dir);
    let store = SledReelStore::open(&paths)?;
    let all = store.find(&|_: &Reel| true, None, usize::MAX)?;

    let mut by_status: HashMap<ReelStatus, usize> = HashMap::new();
    for reel in &all {
        *by_status.entry(reel.status).or_insert(0) += 1;
    }
    let trending = SearchEngine::default().trending(&store)?;
    let built_at = load_meta(&paths).map(|m| m.created_at).ok();

    let summary = serde_json::json!({
        "reels": all.len(),
        "active": by_status.get(&ReelStatus::Active).copied().unwrap_or(0),
        "pending": by_status.get(&ReelStatus::Pending).copied().unwrap_or(0),
        "rejected": by_status.get(&ReelStatus::Rejected).copied().unwrap_or(0),
        "trending_tags": trending,
        "built_at": built_at,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
