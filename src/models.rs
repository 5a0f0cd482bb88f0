//! Data models for candidate videos and their persisted rows.
//!
//! This module defines the core data structures used throughout the application:
//! - [`VideoCandidate`]: A channel upload that survived the discovery filters
//! - [`ArticleRow`]: One persisted CSV record, a superset of [`VideoCandidate`]
//!   with the generated `Article` field
//! - [`Classification`] / [`RejectReason`]: The outcome of classifying one raw
//!   listing entry, so tests can assert on rejection reasons even though the
//!   discovery job discards rejects silently
//!
//! The serde renames match the CSV header row (`Title,Link,Published,Views,Article`),
//! which is the only interface between the two jobs.

use serde::{Deserialize, Serialize};

/// A video that passed the discovery filters.
///
/// # Fields
///
/// * `title` - Raw display title from the channel listing
/// * `link` - Canonical watch URL built from the video id
/// * `published` - The source's relative-time text, kept verbatim ("3 days ago")
/// * `views` - Human-readable view count, or `"N/A"` when the listing omits it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoCandidate {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Published")]
    pub published: String,
    #[serde(rename = "Views")]
    pub views: String,
}

/// One persisted record of the shared CSV file.
///
/// Rows are created once by the discovery job and never deleted; the enrichment
/// job only ever fills the `article` field. `None` means the row still needs
/// processing; that predicate alone drives work selection, so an `Error: ...`
/// string also counts as processed and is never retried automatically.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Published")]
    pub published: String,
    #[serde(rename = "Views")]
    pub views: String,
    /// Generated article text, an `Error: <message>` string, or `None` when the
    /// row has not been processed yet. An empty CSV cell reads back as `None`.
    #[serde(rename = "Article", default, deserialize_with = "empty_as_none")]
    pub article: Option<String>,
}

impl ArticleRow {
    /// Whether the enrichment job still has to process this row.
    pub fn needs_article(&self) -> bool {
        self.article.is_none()
    }
}

impl From<VideoCandidate> for ArticleRow {
    fn from(candidate: VideoCandidate) -> Self {
        ArticleRow {
            title: candidate.title,
            link: candidate.link,
            published: candidate.published,
            views: candidate.views,
            article: None,
        }
    }
}

/// Treat an empty CSV cell the same as a missing column.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Outcome of classifying one raw listing entry.
///
/// Production code only acts on `Accepted`; `Rejected` carries the reason so
/// the filter logic stays observable in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Accepted(VideoCandidate),
    Rejected(RejectReason),
}

/// Why a listing entry was dropped during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A required field was absent or had an unexpected shape.
    MissingField,
    /// The title's detected language was not English.
    NonEnglishTitle,
    /// The published caption lacks the literal "ago" marker
    /// (scheduled/upcoming items, absolute dates).
    NotRelative,
    /// The caption's unit is neither hours nor days, or no amount was found.
    UnrecognizedAge,
    /// The derived instant predates the trailing 7-day window.
    OutOfWindow,
}
