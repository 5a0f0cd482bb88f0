//! Command-line interface definitions for Video Rapporteur.
//!
//! This module defines the CLI subcommands and options using the `clap` crate.
//! The two jobs are independent batch runs sharing only the CSV file, so each
//! gets its own subcommand.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Video Rapporteur application.
///
/// # Examples
///
/// ```sh
/// # Scrape the channel's recent uploads into the candidate CSV
/// video_rapporteur discover
///
/// # Generate one article (the default limit)
/// video_rapporteur enrich
///
/// # Work through every remaining row of a specific file
/// video_rapporteur enrich --csv-file videos.csv --limit 0
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the channel's recent uploads into the candidate CSV.
    ///
    /// Channel, listing cap, and output path are compile-time constants;
    /// this subcommand takes no further options.
    Discover,

    /// Generate articles for rows of the CSV that don't have one yet.
    Enrich {
        /// Path to the input/output CSV file
        #[arg(long, default_value = "english_recent_videos.csv")]
        csv_file: String,

        /// Maximum number of rows to process; 0 processes all missing rows
        #[arg(long, default_value_t = 1)]
        limit: usize,
    },

    /// One-off smoke test: send a single video to the API and print the readout.
    #[command(hide = true)]
    Probe {
        /// Watch URL of a public video
        video_url: String,
    },
}
