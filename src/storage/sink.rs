use std::path::{Path, PathBuf};

use super::schema::Database;
use super::types::{InsertReport, StorageError};
use crate::feed::ParsedFeed;

/// Destination for parsed feeds.
///
/// The driver only sees `save`; whether a connection is held for the whole
/// run or reopened per feed is up to the implementation.
#[allow(async_fn_in_trait)]
pub trait FeedSink {
    /// Persist every item of `feed`.
    ///
    /// `Err` means nothing was written (open or schema failure). Per-item
    /// insert failures are reported through [`InsertReport::failed`].
    async fn save(&self, feed: &ParsedFeed) -> Result<InsertReport, StorageError>;
}

/// Sink that opens the database file for each feed and closes it afterwards.
#[derive(Debug, Clone)]
pub struct ReopeningSink {
    path: PathBuf,
}

impl ReopeningSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSink for ReopeningSink {
    async fn save(&self, feed: &ParsedFeed) -> Result<InsertReport, StorageError> {
        let db = Database::open(&self.path).await?;

        // Close on every exit path, including a failed schema check.
        let result = match db.ensure_schema().await {
            Ok(()) => Ok(db.insert_items(&feed.items).await),
            Err(e) => Err(e),
        };
        db.close().await;

        result
    }
}
