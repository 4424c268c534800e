//! Shared pieces of the `eventgen` command line.
//!
//! The binary is a thin orchestrator over [`token_generator::EventGenerator`]:
//! it loads a sample file, splits the requested event count across workers
//! and prints the rendered events.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use token_core::{Sample, SampleSet};
use token_generator::RenderedEvent;

/// Arguments for `eventgen render`.
#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
    /// Path to sample YAML file
    #[arg(long, short = 'f', env = "EVENTGEN_SAMPLE_FILE")]
    pub sample_file: PathBuf,

    /// Sample to render (default: first enabled sample in the file)
    #[arg(long)]
    pub sample: Option<String>,

    /// Number of events to render
    #[arg(long, short = 'n', default_value = "10")]
    pub count: u64,

    /// Random seed for deterministic generation (same seed = same events)
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of concurrent render workers
    #[arg(long, default_value = "1")]
    pub workers: u64,
}

/// One worker's share of the event index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerShare {
    pub worker: u64,
    pub start_index: u64,
    pub count: u64,
}

/// Split `count` events across `workers` contiguous index ranges.
///
/// Earlier workers take the remainder. Workers with nothing to do are
/// omitted, and zero workers is treated as one.
pub fn split_work(count: u64, workers: u64) -> Vec<WorkerShare> {
    let workers = workers.max(1);
    let base = count / workers;
    let extra = count % workers;

    let mut shares = Vec::new();
    let mut start_index = 0;
    for worker in 0..workers {
        let share = base + u64::from(worker < extra);
        if share == 0 {
            break;
        }
        shares.push(WorkerShare {
            worker,
            start_index,
            count: share,
        });
        start_index += share;
    }
    shares
}

/// Pick the named sample, or the first enabled one.
pub fn select_sample(set: &SampleSet, name: Option<&str>) -> anyhow::Result<Sample> {
    let sample = match name {
        Some(name) => set.require_sample(name)?,
        None => set.enabled().next().with_context(|| {
            format!(
                "No enabled sample found (available: {})",
                set.sample_names().join(", ")
            )
        })?,
    };
    Ok(sample.clone())
}

/// Render an event as one output line.
///
/// An event holding only `_raw` prints as plain text; anything else prints
/// as a JSON object of its fields.
pub fn format_event(event: &RenderedEvent) -> anyhow::Result<String> {
    if event.fields.len() == 1 {
        if let Some(raw) = event.raw() {
            return Ok(raw.to_string());
        }
    }
    serde_json::to_string(&event.fields).context("Failed to serialize event fields")
}
