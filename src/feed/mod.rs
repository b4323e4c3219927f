//! Feed list handling and RSS/Atom fetching.
//!
//! - `list` - the tab-separated feed list: bootstrap, loading, line parsing
//! - `parser` - feed body parsing using the `feed-rs` crate
//! - `fetcher` - single-shot HTTP retrieval feeding the parser
//!
//! # Example
//!
//! ```ignore
//! use primus::feed::{ensure_exists, fetch_and_parse, load, FeedListEntry, FeedListSeed};
//!
//! ensure_exists(path, &FeedListSeed::default()).await?;
//! let mut lines = load(path).await?;
//! while let Some(line) = lines.next_line().await? {
//!     let entry = FeedListEntry::parse_line(&line)?;
//!     let feed = fetch_and_parse(&client, &entry.url).await?;
//! }
//! ```

mod fetcher;
mod list;
mod parser;

pub use fetcher::{fetch_and_parse, FetchError};
pub use list::{
    ensure_exists, load, Bootstrap, FeedListEntry, FeedListError, FeedListLines, FeedListSeed,
    InvalidLine,
};
pub use parser::{parse_feed, ParsedFeed};
