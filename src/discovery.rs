//! Discovery job: list a channel's recent uploads and persist the candidates.
//!
//! Fetches up to [`LISTING_CAP`] entries from the channel's videos page,
//! keeps the English-titled uploads published within the trailing 7-day
//! window, prints them as a human-readable block, and overwrites the
//! candidate CSV in a single write at the end. Per-entry extraction or
//! parsing failures drop that one entry and nothing else; only a failed
//! listing fetch aborts the job.

use crate::filter;
use crate::models::{Classification, VideoCandidate};
use crate::scrapers;
use crate::store;
use chrono::Utc;
use std::error::Error;
use tracing::{info, instrument};

/// The channel whose uploads are scraped. Fixed at compile time; the
/// discovery job takes no CLI arguments.
pub const CHANNEL: &str = "ParisPeaceForum";

/// Hard cap on listing entries considered per run.
pub const LISTING_CAP: usize = 200;

/// Default path of the shared tabular file.
pub const DEFAULT_CSV_FILE: &str = "english_recent_videos.csv";

/// Run the discovery job end to end.
#[instrument(level = "info", skip_all)]
pub async fn run() -> Result<(), Box<dyn Error>> {
    let entries = scrapers::youtube::fetch_channel_listing(CHANNEL, LISTING_CAP).await?;
    let now = Utc::now();

    let candidates: Vec<VideoCandidate> = entries
        .iter()
        .filter_map(|entry| match filter::classify(entry, now) {
            Classification::Accepted(candidate) => Some(candidate),
            Classification::Rejected(_) => None,
        })
        .collect();

    for candidate in &candidates {
        print_candidate(candidate);
    }

    store::write_candidates(DEFAULT_CSV_FILE, &candidates)?;
    info!(
        listed = entries.len(),
        kept = candidates.len(),
        path = DEFAULT_CSV_FILE,
        "Discovery complete"
    );
    Ok(())
}

/// Console output is part of the job's contract, so plain `println!` rather
/// than tracing.
fn print_candidate(candidate: &VideoCandidate) {
    println!("Title: {}", candidate.title);
    println!("Link: {}", candidate.link);
    println!("Published: {}", candidate.published);
    println!("Views: {}", candidate.views);
    println!("{}", "-".repeat(60));
}
