//! Filtering of raw channel-listing entries into [`VideoCandidate`]s.
//!
//! A listing entry survives only if all of the following hold:
//!
//! 1. Every required field can be extracted from the loosely-structured JSON
//! 2. The title's detected language is English (title only, never description)
//! 3. The published caption contains the literal "ago" marker
//! 4. The caption's unit is hours or days (weeks/months/years are out of window
//!    by construction, so they are rejected outright)
//! 5. The derived instant falls within the trailing 7-day window
//!
//! Rejections carry a [`RejectReason`] so tests can assert on them; the
//! discovery job itself drops rejects without logging.

use crate::models::{Classification, RejectReason, VideoCandidate};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use whatlang::Lang;

/// How far back an upload may be and still count as recent.
pub const RECENCY_WINDOW_DAYS: i64 = 7;

/// Detect the language of a short text.
///
/// `whatlang` is fully deterministic, so repeated runs classify identically.
/// Returns `None` when the detector cannot reach a verdict (e.g. an empty or
/// symbol-only title), which callers treat as "not English".
pub fn detect_language(text: &str) -> Option<Lang> {
    whatlang::detect(text).map(|info| info.lang())
}

/// Derive an absolute instant from a relative-time caption.
///
/// Recognizes exactly two units, "hour" and "day", and requires the literal
/// "ago" marker; anything else ("2 weeks ago", "Scheduled for Nov 12",
/// absolute dates) yields `None`. The amount is the first integer token in the
/// caption, so "Streamed 2 days ago" parses the same as "2 days ago". Whether
/// stream age should count as upload age is a known quirk of the source data
/// and is kept as-is.
pub fn parse_relative_age(caption: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if !caption.contains("ago") {
        return None;
    }

    let amount: i64 = caption
        .split_whitespace()
        .find_map(|token| token.parse().ok())?;

    if caption.contains("hour") {
        Some(now - Duration::hours(amount))
    } else if caption.contains("day") {
        Some(now - Duration::days(amount))
    } else {
        None
    }
}

/// Classify one raw listing entry against the discovery filters.
///
/// Extraction is defensive throughout: a missing or misshapen field rejects
/// that single entry and never aborts the batch. The view count is the only
/// optional field; it falls back to the `"N/A"` sentinel.
pub fn classify(entry: &Value, now: DateTime<Utc>) -> Classification {
    let Some(title) = entry["title"]["runs"][0]["text"].as_str() else {
        return Classification::Rejected(RejectReason::MissingField);
    };

    if detect_language(title) != Some(Lang::Eng) {
        return Classification::Rejected(RejectReason::NonEnglishTitle);
    }

    let Some(published) = entry["publishedTimeText"]["simpleText"].as_str() else {
        return Classification::Rejected(RejectReason::MissingField);
    };

    if !published.contains("ago") {
        return Classification::Rejected(RejectReason::NotRelative);
    }

    let Some(instant) = parse_relative_age(published, now) else {
        return Classification::Rejected(RejectReason::UnrecognizedAge);
    };

    if instant < now - Duration::days(RECENCY_WINDOW_DAYS) {
        return Classification::Rejected(RejectReason::OutOfWindow);
    }

    let Some(video_id) = entry["videoId"].as_str() else {
        return Classification::Rejected(RejectReason::MissingField);
    };

    let views = entry["viewCountText"]["simpleText"]
        .as_str()
        .unwrap_or("N/A")
        .to_string();

    Classification::Accepted(VideoCandidate {
        title: title.to_string(),
        link: format!("https://www.youtube.com/watch?v={video_id}"),
        published: published.to_string(),
        views,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(title: &str, published: &str) -> Value {
        json!({
            "videoId": "abc123xyz00",
            "title": { "runs": [{ "text": title }] },
            "publishedTimeText": { "simpleText": published },
            "viewCountText": { "simpleText": "1,204 views" }
        })
    }

    #[test]
    fn test_parse_hours_ago() {
        let now = Utc::now();
        let instant = parse_relative_age("5 hours ago", now).unwrap();
        assert_eq!(instant, now - Duration::hours(5));
    }

    #[test]
    fn test_parse_days_ago() {
        let now = Utc::now();
        let instant = parse_relative_age("3 days ago", now).unwrap();
        assert_eq!(instant, now - Duration::days(3));
    }

    #[test]
    fn test_parse_streamed_days_ago_tolerates_prefix() {
        // Known quirk: stream age counts as upload age.
        let now = Utc::now();
        let instant = parse_relative_age("Streamed 2 days ago", now).unwrap();
        assert_eq!(instant, now - Duration::days(2));
    }

    #[test]
    fn test_parse_rejects_other_units() {
        let now = Utc::now();
        assert_eq!(parse_relative_age("2 weeks ago", now), None);
        assert_eq!(parse_relative_age("3 months ago", now), None);
        assert_eq!(parse_relative_age("Streamed 2 years ago", now), None);
    }

    #[test]
    fn test_parse_rejects_non_relative_captions() {
        let now = Utc::now();
        assert_eq!(parse_relative_age("Scheduled for Nov 12", now), None);
        assert_eq!(parse_relative_age("Nov 12, 2024", now), None);
        assert_eq!(parse_relative_age("", now), None);
    }

    #[test]
    fn test_classify_accepts_recent_english_video() {
        let now = Utc::now();
        let result = classify(
            &entry("Panel on Trade and Global Governance", "2 days ago"),
            now,
        );

        let Classification::Accepted(candidate) = result else {
            panic!("expected acceptance, got {result:?}");
        };
        assert_eq!(candidate.link, "https://www.youtube.com/watch?v=abc123xyz00");
        assert_eq!(candidate.published, "2 days ago");
        assert_eq!(candidate.views, "1,204 views");
    }

    #[test]
    fn test_classify_rejects_non_english_title() {
        let now = Utc::now();
        let result = classify(
            &entry("Table ronde sur la gouvernance mondiale et le commerce", "2 days ago"),
            now,
        );
        assert_eq!(
            result,
            Classification::Rejected(RejectReason::NonEnglishTitle)
        );
    }

    #[test]
    fn test_classify_rejects_old_stream() {
        let now = Utc::now();
        let result = classify(
            &entry("Panel on Trade and Global Governance", "Streamed 2 years ago"),
            now,
        );
        assert_eq!(
            result,
            Classification::Rejected(RejectReason::UnrecognizedAge)
        );
    }

    #[test]
    fn test_classify_rejects_outside_window() {
        let now = Utc::now();
        let result = classify(
            &entry("Panel on Trade and Global Governance", "8 days ago"),
            now,
        );
        assert_eq!(result, Classification::Rejected(RejectReason::OutOfWindow));
        // The 7-day boundary itself is still inside the window.
        let result = classify(
            &entry("Panel on Trade and Global Governance", "7 days ago"),
            now,
        );
        assert!(matches!(result, Classification::Accepted(_)));
    }

    #[test]
    fn test_classify_rejects_scheduled_item() {
        let now = Utc::now();
        let result = classify(
            &entry("Panel on Trade and Global Governance", "Scheduled for Nov 12"),
            now,
        );
        assert_eq!(result, Classification::Rejected(RejectReason::NotRelative));
    }

    #[test]
    fn test_classify_rejects_missing_title() {
        let now = Utc::now();
        let malformed = json!({
            "videoId": "abc123xyz00",
            "publishedTimeText": { "simpleText": "2 days ago" }
        });
        assert_eq!(
            classify(&malformed, now),
            Classification::Rejected(RejectReason::MissingField)
        );
    }

    #[test]
    fn test_classify_rejects_missing_video_id() {
        let now = Utc::now();
        let mut e = entry("Panel on Trade and Global Governance", "2 days ago");
        e.as_object_mut().unwrap().remove("videoId");
        assert_eq!(
            classify(&e, now),
            Classification::Rejected(RejectReason::MissingField)
        );
    }

    #[test]
    fn test_classify_defaults_missing_views() {
        let now = Utc::now();
        let mut e = entry("Panel on Trade and Global Governance", "2 days ago");
        e.as_object_mut().unwrap().remove("viewCountText");
        let Classification::Accepted(candidate) = classify(&e, now) else {
            panic!("expected acceptance");
        };
        assert_eq!(candidate.views, "N/A");
    }
}
