use crate::feed::parser::{parse_feed, ParsedFeed};
use thiserror::Error;
use url::Url;

/// Errors that can occur while fetching and parsing one feed.
///
/// All of them are scoped to a single feed-list entry: the driver logs the
/// error together with the URL and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed list held something that is not a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Body could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Fetches `url` once and parses the body.
///
/// No retries and no timeout beyond what `client` was built with. Items keep
/// the order the feed lists them in.
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] - `url` does not parse
/// - [`FetchError::Network`] - Connection, TLS or body read errors
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::Parse`] - Body is not a feed (HTML, malformed XML, ...)
pub async fn fetch_and_parse(client: &reqwest::Client, url: &str) -> Result<ParsedFeed, FetchError> {
    let url = Url::parse(url)?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = response.bytes().await?;
    parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Test</title>
    <item><guid>1</guid><title>One</title><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate></item>
    <item><guid>2</guid><title>Two</title></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/xml"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let feed = fetch_and_parse(&client, &format!("{}/feed", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(feed.title, "Test");
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].title, "One");
        assert_eq!(feed.items[0].published, "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(feed.items[1].title, "Two");
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_and_parse(&client, &format!("{}/feed", mock_server.uri())).await;
        match result.unwrap_err() {
            FetchError::HttpStatus(404) => {}
            e => panic!("Expected HttpStatus(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_and_parse(&client, &format!("{}/feed", mock_server.uri())).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_html_body_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<!DOCTYPE html><html><body>hello</body></html>")
                    .insert_header("Content-Type", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_and_parse(&client, &format!("{}/feed", mock_server.uri())).await;
        match result.unwrap_err() {
            FetchError::Parse(_) => {}
            e => panic!("Expected Parse error, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = reqwest::Client::new();
        let result = fetch_and_parse(&client, "not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Grab a free port, then release it so nothing is listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = reqwest::Client::new();
        let result = fetch_and_parse(&client, &format!("http://127.0.0.1:{}/feed", port)).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
