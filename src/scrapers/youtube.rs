//! YouTube channel listing scraper.
//!
//! Fetches a channel's `/videos` page and extracts the `ytInitialData` JSON
//! blob that YouTube embeds in the page HTML. The recent-uploads grid lives
//! under the "Videos" tab as `richGridRenderer` items, each wrapping a
//! `videoRenderer` object with the fields the discovery filters need
//! (`title.runs[0].text`, `publishedTimeText.simpleText`, `videoId`,
//! `viewCountText.simpleText`).
//!
//! The listing is roughly chronological and one page carries the most recent
//! uploads, which is ample for a 7-day window; the cap is a hard limit, not a
//! correctness parameter. Entries are returned as raw `serde_json::Value`s so
//! the caller can extract fields defensively.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Matches the embedded data blob up to its closing `;</script>`.
static YT_INITIAL_DATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var ytInitialData = (\{.+?\});</script>").unwrap());

/// Browsers get the full markup; default reqwest UA gets a consent stub.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Fetch up to `cap` recent listing entries for `channel`.
///
/// A fetch or extraction failure here is fatal to the discovery job: without
/// a listing there is nothing to filter.
#[instrument(level = "info", skip_all, fields(%channel, cap))]
pub async fn fetch_channel_listing(
    channel: &str,
    cap: usize,
) -> Result<Vec<Value>, Box<dyn Error>> {
    let page_url = format!("https://www.youtube.com/@{channel}/videos");
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let html = client
        .get(&page_url)
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let data = extract_initial_data(&html)?;
    let entries = listing_entries(&data, cap);
    info!(count = entries.len(), source = %page_url, "Indexed channel listing");
    Ok(entries)
}

/// Pull the `ytInitialData` JSON out of the page HTML.
fn extract_initial_data(html: &str) -> Result<Value, Box<dyn Error>> {
    let captures = YT_INITIAL_DATA
        .captures(html)
        .ok_or("ytInitialData not found in channel page")?;
    let data: Value = serde_json::from_str(&captures[1])?;
    Ok(data)
}

/// Walk the browse tree down to the video grid and collect `videoRenderer`s.
///
/// The tab list usually carries Home/Videos/Shorts/...; only the tab that
/// actually holds a `richGridRenderer` is the one we want. Grid items other
/// than `richItemRenderer` (continuations, shelf ads) are skipped.
fn listing_entries(data: &Value, cap: usize) -> Vec<Value> {
    let mut entries = Vec::new();

    let tabs = data["contents"]["twoColumnBrowseResultsRenderer"]["tabs"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default();

    for tab in tabs {
        let contents = &tab["tabRenderer"]["content"]["richGridRenderer"]["contents"];
        let Some(items) = contents.as_array() else {
            continue;
        };
        for item in items {
            if entries.len() >= cap {
                break;
            }
            let renderer = &item["richItemRenderer"]["content"]["videoRenderer"];
            if renderer.is_object() {
                entries.push(renderer.clone());
            }
        }
    }

    debug!(count = entries.len(), "Collected videoRenderer entries");
    entries
}
