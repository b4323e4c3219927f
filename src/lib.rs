//! Primus - a journal of titles.
//!
//! Reads a tab-separated list of RSS/Atom feeds, fetches each one in order
//! and appends every item to a single-file database.

pub mod config;
pub mod feed;
pub mod ingest;
pub mod storage;
