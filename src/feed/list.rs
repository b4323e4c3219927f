use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Split};

/// Errors that stop the run before any feed is processed.
#[derive(Debug, Error)]
pub enum FeedListError {
    #[error("Error creating file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing to file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error opening file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A feed-list line with fewer than two tab-separated fields.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid line format: {0}")]
pub struct InvalidLine(pub String);

/// One line of the feed list: `name<TAB>url<TAB>description`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedListEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl FeedListEntry {
    /// Splits a raw line on tabs.
    ///
    /// Field 1 is the URL; a missing description becomes empty and fields
    /// past the third are ignored.
    pub fn parse_line(line: &str) -> Result<Self, InvalidLine> {
        let mut fields = line.split('\t');
        match (fields.next(), fields.next()) {
            (Some(name), Some(url)) => Ok(Self {
                name: name.to_string(),
                url: url.to_string(),
                description: fields.next().unwrap_or_default().to_string(),
            }),
            _ => Err(InvalidLine(line.to_string())),
        }
    }

    /// Renders the entry back as a newline-terminated feed-list line.
    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}\n", self.name, self.url, self.description)
    }
}

/// Content written to a missing feed list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FeedListSeed(pub Vec<FeedListEntry>);

impl FeedListSeed {
    pub fn render(&self) -> String {
        self.0.iter().map(FeedListEntry::to_line).collect()
    }
}

impl Default for FeedListSeed {
    fn default() -> Self {
        let entry = |name: &str, url: &str, description: &str| FeedListEntry {
            name: name.to_string(),
            url: url.to_string(),
            description: description.to_string(),
        };

        Self(vec![
            entry(
                "Habr.Com",
                "https://habr.com/ru/rss/all/all/",
                "Русскоязычный веб-сайт в формате системы тематических коллективных блогов (именуемых хабами) с элементами новостного сайта, созданный для публикации новостей, аналитических статей, мыслей, связанных с информационными технологиями, бизнесом и интернетом.",
            ),
            entry(
                "OverClockers.Ru",
                "https://overclockers.ru/rss/all.rss",
                "Один из крупнейших информационных сайтов в России, посвященный компьютерам, мобильным устройствам, компьютерным играм, электромобилям и информационным технологиям в целом.",
            ),
            entry(
                "3DNews.Ru",
                "https://3dnews.ru/news/rss/",
                "Первое независимое российское онлайн-издание, посвящённое цифровым технологиям. 3DNews Daily Digital Digest.",
            ),
        ])
    }
}

/// What [`ensure_exists`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    Created,
    AlreadyExists,
}

/// Writes `seed` to `path` unless a file is already there.
///
/// An existing file is left byte-for-byte untouched.
pub async fn ensure_exists(path: &Path, seed: &FeedListSeed) -> Result<Bootstrap, FeedListError> {
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::info!(path = %path.display(), "File already exists.");
            return Ok(Bootstrap::AlreadyExists);
        }
        Err(source) => {
            return Err(FeedListError::Create {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let write = async {
        file.write_all(seed.render().as_bytes()).await?;
        file.flush().await
    };
    write.await.map_err(|source| FeedListError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), feeds = seed.0.len(), "File created and written successfully.");
    Ok(Bootstrap::Created)
}

/// Lazy reader over the feed list's lines.
///
/// Lines are split on `\n` with a trailing `\r` removed. Bytes that are not
/// UTF-8 are replaced rather than failing the read, so a badly encoded
/// description never stops the lines after it.
pub struct FeedListLines {
    path: PathBuf,
    segments: Split<BufReader<File>>,
}

impl FeedListLines {
    /// Next line, or `None` at end of file.
    ///
    /// Only genuine I/O failures are errors.
    pub async fn next_line(&mut self) -> Result<Option<String>, FeedListError> {
        let segment = self
            .segments
            .next_segment()
            .await
            .map_err(|source| FeedListError::Read {
                path: self.path.clone(),
                source,
            })?;

        let Some(mut raw) = segment else {
            return Ok(None);
        };
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        match String::from_utf8(raw) {
            Ok(line) => Ok(Some(line)),
            Err(e) => {
                let line = String::from_utf8_lossy(e.as_bytes()).into_owned();
                tracing::warn!(path = %self.path.display(), line = %line, "Line is not valid UTF-8, decoded lossily");
                Ok(Some(line))
            }
        }
    }
}

/// Opens the feed list for line-by-line reading.
pub async fn load(path: &Path) -> Result<FeedListLines, FeedListError> {
    let file = File::open(path)
        .await
        .map_err(|source| FeedListError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(FeedListLines {
        path: path.to_path_buf(),
        segments: BufReader::new(file).split(b'\n'),
    })
}
