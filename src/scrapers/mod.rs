//! Channel-listing scrapers.
//!
//! One source today: the YouTube channel videos page. The scraper returns the
//! raw, loosely-structured listing entries; all filtering and field extraction
//! happens downstream in [`crate::filter`], so a malformed entry can be
//! rejected without aborting the batch.

pub mod youtube;
