mod items;
mod schema;
mod sink;
mod types;

pub use schema::Database;
pub use sink::{FeedSink, ReopeningSink};
pub use types::{InsertReport, ParsedItem, StorageError};
