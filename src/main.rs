//! # Video Rapporteur
//!
//! A two-job content pipeline that turns a YouTube channel's recent panel
//! videos into long-form analytical articles.
//!
//! ## Jobs
//!
//! - **Discover**: scrapes the channel's videos page, keeps English-titled
//!   uploads from the trailing 7 days, and writes them to a candidate CSV
//! - **Enrich**: for every CSV row without an `Article` value, asks the Gemini
//!   API to "watch" the video (bounded to its first ~66 minutes at one frame
//!   per 20 seconds) and write a structured article, saving the file after
//!   every single row so an interrupted run resumes where it stopped
//!
//! The CSV file is the only interface between the jobs and the only
//! persistent store. Both jobs are strictly sequential; the blocking points
//! are the listing fetch, each generation call, and the per-row saves.
//!
//! ## Usage
//!
//! ```sh
//! video_rapporteur discover
//! video_rapporteur enrich --limit 0
//! ```

use clap::Parser;
use std::error::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod discovery;
mod enrichment;
mod filter;
mod models;
mod scrapers;
mod store;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();

    let result = match args.command {
        Command::Discover => {
            info!(
                channel = discovery::CHANNEL,
                cap = discovery::LISTING_CAP,
                "Discovery starting"
            );
            discovery::run().await
        }
        Command::Enrich { csv_file, limit } => {
            info!(csv_file = %csv_file, limit, "Enrichment starting");
            enrichment::run(&csv_file, limit).await
        }
        Command::Probe { video_url } => probe(&video_url).await,
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Execution failed"),
    }
    result
}

/// Throwaway smoke test for the video-understanding call. Sends one video
/// with a short summary prompt and prints whatever comes back.
async fn probe(video_url: &str) -> Result<(), Box<dyn Error>> {
    let api_key = api::resolve_api_key(|name| std::env::var(name).ok())
        .ok_or("missing API credential")?;
    let client = api::GeminiClient::new(api_key)?;

    let article = client
        .generate_with_prompt(
            "Please provide a summarized readout of this panel discussion.",
            video_url,
        )
        .await?;

    println!("\n--- Video Readout ---");
    println!("{}", article.text);
    println!("---------------------\n");
    if let Some(usage) = article.usage {
        println!(
            "Token Usage: Input={}, Output={}, Total={}",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        );
    }
    Ok(())
}
