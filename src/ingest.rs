//! The ingestion run: bootstrap the feed list, then fetch and persist each
//! feed in file order.
//!
//! Only the bootstrap phase can fail the run. Everything after it is scoped
//! to a line, a feed or an item, gets logged, and the loop moves on.

use std::path::Path;

use crate::feed::{ensure_exists, fetch_and_parse, load, FeedListEntry, FeedListError, FeedListSeed};
use crate::storage::FeedSink;

/// Tally of one run. Not shown on the console; returned for callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Lines with fewer than two tab-separated fields
    pub invalid_lines: usize,
    /// Feeds that could not be fetched or parsed
    pub failed_feeds: usize,
    /// Feeds whose database could not be opened or prepared
    pub failed_saves: usize,
    /// Feeds handed to the sink successfully
    pub ingested_feeds: usize,
    /// Rows appended across all feeds
    pub rows_inserted: usize,
    /// Individual inserts that failed
    pub failed_inserts: usize,
}

/// Runs the whole pipeline once.
///
/// # Errors
///
/// Returns [`FeedListError`] when the feed list can neither be seeded nor
/// opened. Nothing has been fetched at that point.
pub async fn run<S: FeedSink>(
    feeds_file: &Path,
    seed: &FeedListSeed,
    client: &reqwest::Client,
    sink: &S,
) -> Result<IngestReport, FeedListError> {
    ensure_exists(feeds_file, seed).await?;
    let mut lines = load(feeds_file).await?;

    let mut report = IngestReport::default();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            // I/O failure: the rest of the file is unreachable
            Err(e) => {
                tracing::error!(error = %e, "Error reading file");
                break;
            }
        };

        let entry = match FeedListEntry::parse_line(&line) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(line = %e.0, "Invalid line format");
                report.invalid_lines += 1;
                continue;
            }
        };

        let feed = match fetch_and_parse(client, &entry.url).await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::error!(name = %entry.name, url = %entry.url, error = %e, "Error parsing feed");
                report.failed_feeds += 1;
                continue;
            }
        };

        println!("{}", feed.title);

        match sink.save(&feed).await {
            Ok(saved) => {
                tracing::debug!(
                    url = %entry.url,
                    inserted = saved.inserted,
                    failed = saved.failed,
                    "Feed saved"
                );
                report.ingested_feeds += 1;
                report.rows_inserted += saved.inserted;
                report.failed_inserts += saved.failed;
            }
            Err(e) => {
                tracing::error!(url = %entry.url, error = %e, "Error saving feed");
                report.failed_saves += 1;
            }
        }
    }

    Ok(report)
}
