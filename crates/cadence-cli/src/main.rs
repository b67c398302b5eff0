//! `cadence` CLI — expand, materialize, and manage recurring-event series
//! from the command line, against a JSON-file-backed store.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a recurrence request to its occurrence dates (stdin → stdout)
//! cadence expand < request.json
//!
//! # Materialize a series into a store file
//! cadence materialize -i request.json --store events.json --owner coach-1
//!
//! # Warn about overlaps with existing records before writing
//! cadence materialize -i request.json --store events.json --check-overlaps
//!
//! # List every member of the series containing a record
//! cadence members --store events.json --id evt-3
//!
//! # Cascade-delete a whole series via any member id
//! cadence delete-series --store events.json --id evt-3
//!
//! # Delete one occurrence only
//! cadence delete-one --store events.json --id evt-3
//! ```

use anyhow::{Context, Result};
use cadence_engine::{EventRecord, MemoryStore, RecurrenceRequest};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "cadence",
    version,
    about = "Recurring-event materialization engine CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a recurrence request to its occurrence dates (no writes)
    Expand {
        /// Request JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Expand a request and persist the series into the store file
    Materialize {
        /// Request JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Store file (created if missing)
        #[arg(long)]
        store: PathBuf,
        /// Owner whose collection the series is written into
        #[arg(long, default_value = "local")]
        owner: String,
        /// Warn on stderr about overlaps with existing records
        #[arg(long)]
        check_overlaps: bool,
    },
    /// List every member of the series containing the given record
    Members {
        #[arg(long)]
        store: PathBuf,
        /// Any record id in the series
        #[arg(long)]
        id: String,
    },
    /// Delete the whole series containing the given record
    DeleteSeries {
        #[arg(long)]
        store: PathBuf,
        /// Any record id in the series
        #[arg(long)]
        id: String,
    },
    /// Delete exactly one occurrence, leaving the rest of the series
    DeleteOne {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        id: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Expand { input } => {
            let request = read_request(input.as_deref())?;
            let zone = cadence_engine::clock::resolve_zone(&request.time_zone)?;
            let expansion = cadence_engine::expand(
                request.anchor_date,
                &request.days_of_week,
                request.recurrence_start,
                request.recurrence_end,
                zone,
            )?;
            let out = serde_json::json!({
                "aligned_anchor": expansion.aligned_anchor,
                "dates": expansion.dates,
                "rule": expansion.rule,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Materialize {
            input,
            store,
            owner,
            check_overlaps,
        } => {
            let request = read_request(input.as_deref())?;
            let mem = load_store(&store)?;

            if check_overlaps {
                let candidates = cadence_engine::dry_run(&owner, &request)?;
                let existing: Vec<EventRecord> = mem
                    .dump()
                    .into_iter()
                    .filter(|r| r.owner_id == owner)
                    .collect();
                for overlap in cadence_engine::find_overlaps(&candidates, &existing) {
                    eprintln!(
                        "warning: overlaps existing record {} by {} minutes",
                        overlap.existing_id, overlap.overlap_minutes
                    );
                }
            }

            // Dispatch by kind: the two entry points validate their own
            // payload fields, the core is shared.
            let outcome = if request.payload.is_booking() {
                cadence_engine::create_booking(&mem, &owner, &request)?
            } else {
                cadence_engine::create_availability(&mem, &owner, &request)?
            };
            save_store(&store, &mem)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Members { store, id } => {
            let mem = load_store(&store)?;
            let members = cadence_engine::members_of(&mem, &id)?;
            println!("{}", serde_json::to_string_pretty(&members)?);
        }
        Commands::DeleteSeries { store, id } => {
            let mem = load_store(&store)?;
            let removed = cadence_engine::delete_series(&mem, &id)?;
            save_store(&store, &mem)?;
            println!("{}", serde_json::json!({ "deleted": removed }));
        }
        Commands::DeleteOne { store, id } => {
            let mem = load_store(&store)?;
            cadence_engine::delete_single(&mem, &id)?;
            save_store(&store, &mem)?;
            println!("{}", serde_json::json!({ "deleted": 1 }));
        }
    }

    Ok(())
}

/// Parse a RecurrenceRequest from a file, or stdin when no path is given.
fn read_request(path: Option<&Path>) -> Result<RecurrenceRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("request is not valid RecurrenceRequest JSON")
}

/// Load the store file into a MemoryStore. A missing file is an empty
/// store; a present-but-unreadable file is an error, never silently
/// clobbered.
fn load_store(path: &Path) -> Result<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store file: {}", path.display()))?;
    let records: Vec<EventRecord> =
        serde_json::from_str(&raw).context("store file is not a valid record array")?;
    Ok(MemoryStore::from_records(records))
}

fn save_store(path: &Path, store: &MemoryStore) -> Result<()> {
    let records = store.dump();
    let raw = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write store file: {}", path.display()))?;
    Ok(())
}
