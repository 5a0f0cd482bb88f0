//! Enrichment job: fill the `Article` column of the shared CSV.
//!
//! Rows are processed strictly one at a time, in file order, restricted to
//! rows whose `Article` field is still missing. After every row the whole
//! table is rewritten to the same path, so a crash or a stopped batch loses at
//! most the row in flight. Because "needs processing" is solely "article is
//! missing", re-running the job resumes exactly where the previous run left
//! off; a stored `Error: ...` string counts as processed and is never retried
//! unless a human clears the cell.
//!
//! # Startup failures
//!
//! Missing credential, unconstructible client, and missing input file are all
//! fatal: logged and propagated, so the process exits non-zero.

use crate::api::{self, GenerateArticle, GeminiClient};
use crate::models::ArticleRow;
use crate::store::{self, SaveOutcome};
use std::env;
use std::error::Error;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Run the enrichment job against `csv_file`, processing at most `limit`
/// missing rows (0 means all of them).
#[instrument(level = "info", skip_all, fields(csv_file = %csv_file, limit))]
pub async fn run(csv_file: &str, limit: usize) -> Result<(), Box<dyn Error>> {
    let Some(api_key) = api::resolve_api_key(|name| env::var(name).ok()) else {
        error!(
            vars = ?api::API_KEY_VARS,
            "No API credential found in the environment"
        );
        return Err("missing API credential".into());
    };

    let client = match GeminiClient::new(api_key) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to construct Gemini client");
            return Err(e);
        }
    };

    if !Path::new(csv_file).exists() {
        error!(path = csv_file, "Input CSV file not found");
        return Err(format!("no such file: {csv_file}").into());
    }
    let (mut rows, had_article_column) = store::load_rows(csv_file)?;
    if !had_article_column {
        info!("Article column not present yet; it will be written on first save");
    }

    let missing = rows.iter().filter(|row| row.needs_article()).count();
    if missing == 0 {
        info!("All articles are already generated; nothing to do");
        return Ok(());
    }
    let planned = if limit == 0 { missing } else { missing.min(limit) };
    info!(missing, planned, "Processing rows without an article");

    let processed = fill_missing_articles(&mut rows, limit, &client, |table| {
        store::checkpoint(csv_file, table)
    })
    .await;

    info!(processed, path = csv_file, "Enrichment complete");
    Ok(())
}

/// Fill missing articles sequentially, checkpointing after every row.
///
/// Decoupled from real I/O: the generator is any [`GenerateArticle`] and the
/// checkpoint is a callback over the full table, invoked once per mutated row.
/// A [`SaveOutcome::Locked`] checkpoint stops the remaining batch (prior saves
/// are already on disk); a [`SaveOutcome::Failed`] one is logged by the
/// checkpoint itself and the loop continues, leaving that row's article only
/// in memory. A generation error becomes the row's content as
/// `Error: <message>`, which still counts as processed.
///
/// Returns the number of rows processed.
pub async fn fill_missing_articles<G, C>(
    rows: &mut [ArticleRow],
    limit: usize,
    generator: &G,
    mut checkpoint: C,
) -> usize
where
    G: GenerateArticle,
    C: FnMut(&[ArticleRow]) -> SaveOutcome,
{
    let mut processed = 0;

    for i in 0..rows.len() {
        if limit != 0 && processed >= limit {
            break;
        }
        if !rows[i].needs_article() {
            continue;
        }

        let link = rows[i].link.clone();
        info!(row = i, %link, "Generating article");
        let article = match generator.generate(&link).await {
            Ok(generated) => generated.text,
            Err(e) => {
                warn!(row = i, %link, error = %e, "Generation failed; storing error string");
                format!("Error: {e}")
            }
        };

        rows[i].article = Some(article);
        processed += 1;

        match checkpoint(rows) {
            SaveOutcome::Saved => {}
            SaveOutcome::Locked => {
                warn!(row = i, "File appears locked; stopping the batch");
                break;
            }
            SaveOutcome::Failed => {
                warn!(row = i, "Row result not yet persisted; continuing");
            }
        }
    }

    processed
}
