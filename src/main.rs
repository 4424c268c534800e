//! Command-line interface for eventgen
//!
//! # Usage Examples
//!
//! ```bash
//! # Render 10 events from the first enabled sample
//! eventgen render --sample-file samples.yaml
//!
//! # Render 1000 events of one sample across 4 workers
//! eventgen render --sample-file samples.yaml --sample web \
//!   --count 1000 --workers 4 --seed 7
//! ```
//!
//! Rendered events go to stdout; logs go to stderr (`RUST_LOG=debug`).

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use eventgen::{format_event, select_sample, split_work, RenderArgs};
use token_core::SampleSet;
use token_generator::EventGenerator;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "eventgen")]
#[command(about = "Render synthetic events from token-substituted samples")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render events from a sample file to stdout
    Render(RenderArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => render(args).await,
    }
}

async fn render(args: RenderArgs) -> anyhow::Result<()> {
    let set = SampleSet::from_file(&args.sample_file)
        .with_context(|| format!("Failed to load samples from {:?}", args.sample_file))?;
    let sample = select_sample(&set, args.sample.as_deref())?;
    let window = sample
        .window(Utc::now())
        .with_context(|| format!("Invalid time window for sample '{}'", sample.name))?;

    info!(
        "Rendering {} events from sample '{}' with {} worker(s), seed {}",
        args.count, sample.name, args.workers, args.seed
    );

    let mut handles = Vec::new();
    for share in split_work(args.count, args.workers) {
        let sample = sample.clone();
        let seed = args.seed;
        handles.push(tokio::task::spawn_blocking(move || {
            debug!(
                "Worker {} rendering {} events from index {}",
                share.worker, share.count, share.start_index
            );
            let mut generator =
                EventGenerator::new(sample, seed).with_start_index(share.start_index);
            generator
                .events(window, share.count)
                .map(|event| {
                    let event = event.with_context(|| {
                        format!("Worker {} failed to render event", share.worker)
                    })?;
                    format_event(&event)
                })
                .collect::<anyhow::Result<Vec<String>>>()
        }));
    }

    let mut rendered = 0u64;
    for handle in handles {
        let lines = handle.await.context("Render worker panicked")??;
        for line in &lines {
            println!("{line}");
        }
        rendered += lines.len() as u64;
    }

    info!("Rendered {rendered} events");
    Ok(())
}
