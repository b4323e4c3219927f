use feed_rs::model::Link;
use feed_rs::parser::{self, ParseFeedError};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::storage::ParsedItem;

/// A feed reduced to what gets journaled: its title and its items in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: String,
    pub items: Vec<ParsedItem>,
}

/// Parses an RSS, Atom or JSON feed body.
///
/// The format is detected by `feed-rs`. Missing fields become empty strings;
/// `link` is the item's first alternate link (see [`article_link`]) and
/// `description` its summary text.
///
/// `feed-rs` normalizes dates into UTC timestamps, which would lose the text
/// the publisher wrote. The raw date strings are therefore recovered with a
/// separate `quick-xml` pass (see [`raw_dates`]) and matched to entries by
/// position. If that pass cannot be lined up with the parsed entries, the
/// parsed date is rendered as RFC 2822 instead.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, ParseFeedError> {
    let feed = parser::parse(bytes)?;

    let mut raw = match raw_dates(bytes) {
        Some(dates) if dates.len() == feed.entries.len() => Some(dates.into_iter()),
        Some(dates) => {
            tracing::debug!(
                raw = dates.len(),
                parsed = feed.entries.len(),
                "Raw date count does not match entries, formatting parsed dates"
            );
            None
        }
        None => None,
    };

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let published = match raw.as_mut().and_then(Iterator::next) {
                Some(date) => date,
                None => entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.to_rfc2822())
                    .unwrap_or_default(),
            };

            ParsedItem {
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                link: article_link(entry.links),
                description: entry.summary.map(|s| s.content).unwrap_or_default(),
                published,
            }
        })
        .collect();

    Ok(ParsedFeed {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        items,
    })
}

/// Picks the link to the item itself.
///
/// Atom entries often list `replies`, `edit` or `self` links before the
/// article; the first link with no `rel` or `rel="alternate"` wins, then the
/// first link of any kind.
fn article_link(links: Vec<Link>) -> String {
    let alternate = links
        .iter()
        .position(|l| matches!(l.rel.as_deref(), None | Some("") | Some("alternate")));
    let index = alternate.unwrap_or(0);
    links
        .into_iter()
        .nth(index)
        .map(|l| l.href)
        .unwrap_or_default()
}

/// Which date element a direct child of an item/entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateSlot {
    /// RSS `<pubDate>`, Atom `<published>`
    Primary,
    /// RSS `<dc:date>`, Atom `<updated>`
    Fallback,
}

impl DateSlot {
    /// Matches on the local name so prefixed documents (`<atom:published>`)
    /// behave like default-namespace ones. `date` only counts as `dc:date`.
    fn for_element(qname: &[u8], local_name: &[u8]) -> Option<Self> {
        match local_name {
            b"pubDate" | b"published" => Some(DateSlot::Primary),
            b"updated" => Some(DateSlot::Fallback),
            b"date" if qname == b"dc:date" => Some(DateSlot::Fallback),
            _ => None,
        }
    }
}

/// Date text collected for the item/entry currently open.
#[derive(Debug, Default)]
struct OpenEntry {
    depth: usize,
    capturing: Option<DateSlot>,
    primary: String,
    fallback: String,
}

impl OpenEntry {
    fn push(&mut self, text: &str) {
        match self.capturing {
            Some(DateSlot::Primary) => self.primary.push_str(text),
            Some(DateSlot::Fallback) => self.fallback.push_str(text),
            None => {}
        }
    }

    fn finish(self) -> String {
        let primary = self.primary.trim();
        if primary.is_empty() {
            self.fallback.trim().to_string()
        } else {
            primary.to_string()
        }
    }
}

fn is_entry(local_name: &[u8]) -> bool {
    local_name == b"item" || local_name == b"entry"
}

/// Collects the verbatim date text of every `<item>`/`<entry>`, in document
/// order, one string per entry (empty when it has no date).
///
/// Only direct children of an entry are considered, so nested elements such
/// as an Atom `<source><updated>` do not leak into the entry's date.
/// Returns `None` when the body is not well-formed XML.
fn raw_dates(bytes: &[u8]) -> Option<Vec<String>> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut dates = Vec::new();
    let mut depth: usize = 0;
    let mut open: Option<OpenEntry> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                if open.is_none() {
                    if is_entry(e.local_name().as_ref()) {
                        open = Some(OpenEntry {
                            depth,
                            ..OpenEntry::default()
                        });
                    }
                } else if let Some(entry) = open.as_mut() {
                    if depth == entry.depth + 1 {
                        entry.capturing =
                            DateSlot::for_element(e.name().as_ref(), e.local_name().as_ref());
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if open.is_none() && is_entry(e.local_name().as_ref()) {
                    dates.push(String::new());
                }
            }
            Ok(Event::End(_)) => {
                let closes_entry = open.as_ref().is_some_and(|entry| entry.depth == depth);
                if closes_entry {
                    if let Some(entry) = open.take() {
                        dates.push(entry.finish());
                    }
                } else if let Some(entry) = open.as_mut() {
                    if depth == entry.depth + 1 {
                        entry.capturing = None;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(t)) => {
                if let Some(entry) = open.as_mut() {
                    match t.unescape() {
                        Ok(text) => entry.push(&text),
                        Err(_) => entry.push(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(entry) = open.as_mut() {
                    entry.push(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Raw date scan failed");
                return None;
            }
            _ => {}
        }
        buf.clear();
    }

    Some(dates)
}
