//! CSV persistence for the shared tabular file.
//!
//! The CSV file is the only interface between the discovery and enrichment
//! jobs, and the only persistent store. Discovery writes a fresh
//! `Title,Link,Published,Views` file in one full overwrite; enrichment reads
//! it back (tolerating the absent `Article` column), then rewrites the whole
//! table after every processed row.
//!
//! # Save outcomes
//!
//! Each checkpoint save is classified into a [`SaveOutcome`]:
//! - `Saved` - the table is on disk
//! - `Locked` - a permission-style error, which on common platforms means the
//!   file is open in another program; the enrichment batch must stop
//! - `Failed` - any other persistence error; the batch continues and the
//!   current row's article exists only in memory until a later save succeeds

use crate::models::{ArticleRow, VideoCandidate};
use std::error::Error;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{error, info, instrument};

/// Result of one checkpoint save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Locked,
    Failed,
}

/// Write discovery candidates to `path`, replacing any previous content.
///
/// Emits the 4-column header; the `Article` column only appears once the
/// enrichment job has saved the file.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_candidates<P: AsRef<Path>>(
    path: P,
    candidates: &[VideoCandidate],
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for candidate in candidates {
        writer.serialize(candidate)?;
    }
    writer.flush()?;
    info!(count = candidates.len(), "Wrote candidate CSV");
    Ok(())
}

/// Load the tabular file into typed rows.
///
/// Returns the rows plus whether the input already carried an `Article`
/// column. A missing column is not an error: every row simply starts with
/// `article = None`, and the column materializes on the first save.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<(Vec<ArticleRow>, bool), Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let has_article_column = reader
        .headers()?
        .iter()
        .any(|header| header == "Article");

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: ArticleRow = record?;
        rows.push(row);
    }

    info!(count = rows.len(), has_article_column, "Loaded CSV rows");
    Ok((rows, has_article_column))
}

/// Rewrite the whole table to `path` with the 5-column header.
pub fn save_rows<P: AsRef<Path>>(path: P, rows: &[ArticleRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Persist the table after a row mutation and classify the result.
///
/// This is the checkpoint invoked by the enrichment loop after every row.
/// Lock conflicts surface as permission errors on the save attempt; nothing
/// probes for them proactively.
pub fn checkpoint<P: AsRef<Path>>(path: P, rows: &[ArticleRow]) -> SaveOutcome {
    match save_rows(path.as_ref(), rows) {
        Ok(()) => SaveOutcome::Saved,
        Err(e) if is_lock_error(&e) => {
            error!(
                path = %path.as_ref().display(),
                error = %e,
                "Could not write CSV; is it open in another program?"
            );
            SaveOutcome::Locked
        }
        Err(e) => {
            error!(path = %path.as_ref().display(), error = %e, "Failed to save CSV");
            SaveOutcome::Failed
        }
    }
}

fn is_lock_error(e: &csv::Error) -> bool {
    match e.kind() {
        csv::ErrorKind::Io(io_err) => io_err.kind() == ErrorKind::PermissionDenied,
        _ => false,
    }
}
