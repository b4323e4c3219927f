use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by the persistence layer, one variant per stage.
///
/// Each stage is fatal only for its own scope: `Open` and `Schema` abort the
/// current feed's save, `Insert` only the item being written.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database file could not be opened or created
    #[error("Error connecting to database: {0}")]
    Open(#[source] sqlx::Error),

    /// `CREATE TABLE IF NOT EXISTS rss_feeds` failed
    #[error("Error creating table: {0}")]
    Schema(#[source] sqlx::Error),

    /// A single row insert failed
    #[error("Error inserting data: {0}")]
    Insert(#[source] sqlx::Error),

    /// Reading rows back failed
    #[error("Error reading data: {0}")]
    Query(#[source] sqlx::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// One item of a parsed feed, and one row of `rss_feeds`.
///
/// `published` is kept verbatim as the feed wrote it.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct ParsedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: String,
}

/// Outcome of inserting a batch of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Rows written
    pub inserted: usize,
    /// Items whose insert failed (each logged where it happened)
    pub failed: usize,
}
