// This file is part of paste-url-lsp.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0

//! Title fetcher: GET a page, decode it, pull out its `<title>`.
//!
//! # How it works
//!
//! 1. GET the URL with a desktop browser `User-Agent`
//! 2. Read the charset from `content-type` (default `utf8`)
//! 3. Read the body until `</title` shows up (or the size cap is hit)
//! 4. Decode from the page charset to UTF-8
//! 5. Parse the HTML and take the first `<title>` text

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response};
use scraper::{Html, Selector};

use crate::error::FetchError;
use crate::http_config::{build_client, HttpSettings};

/// Sent with every request; some sites serve a stripped page to unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13) \
    AppleWebKit/604.1.38 (KHTML, like Gecko) Version/11.0 Safari/604.1.38";

/// Charset used when the response does not declare one.
pub const DEFAULT_CHARSET: &str = "utf8";

const CHARSET_TOKEN: &str = "charset=";

const TITLE_END: &[u8] = b"</title";

/// Stop reading the body after this many bytes.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Fetches page titles through the currently configured HTTP client.
///
/// Built once per configuration and shared behind an `Arc`; a configuration
/// change builds a new one instead of mutating this.
#[derive(Debug, Clone)]
pub struct TitleFetcher {
    client: Client,
}

impl TitleFetcher {
    /// Build a fetcher for the given settings.
    ///
    /// An unusable proxy is logged and replaced by a direct connection.
    pub fn new(settings: &HttpSettings) -> Self {
        match build_client(settings) {
            Ok(client) => Self { client },
            Err(e) => {
                tracing::warn!("{} - falling back to direct connection", e);
                Self::direct()
            }
        }
    }

    /// A fetcher that never uses a proxy.
    pub fn direct() -> Self {
        let client = build_client(&HttpSettings::default()).unwrap_or_else(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Client::new()
        });
        Self { client }
    }

    /// Fetch `url` and return the page title, if it has one.
    ///
    /// Only request-level failures are errors; HTTP error statuses are parsed
    /// like any other page.
    pub async fn fetch_title(&self, url: &str) -> Result<Option<String>, FetchError> {
        tracing::debug!("Fetching title for {}", url);

        let mut response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let charset = charset_from_content_type(content_type.as_deref());

        tracing::debug!(
            "Response {} for {} (charset: {})",
            response.status(),
            url,
            charset
        );

        let body = read_head(&mut response).await?;
        let text = decode_body(&body, &charset);

        Ok(extract_title(&text))
    }

    /// Fetch the title and turn every outcome into replacement text.
    ///
    /// Found title → trimmed title; no title → the URL; request error → its message.
    pub async fn resolve_title(&self, url: &str) -> String {
        match self.fetch_title(url).await {
            Ok(title) => process_title(title, url),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                e.to_string()
            }
        }
    }
}

/// Read the body until the end of the title tag is in the buffer.
async fn read_head(response: &mut Response) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        // Re-scan the tail of the previous chunk so a tag split across chunks is found
        let scan_from = body.len().saturating_sub(TITLE_END.len() - 1);
        body.extend_from_slice(&chunk);

        if contains_title_end(&body[scan_from..]) {
            break;
        }
        if body.len() >= MAX_BODY_BYTES {
            tracing::debug!("Body exceeded {} bytes, stopped reading", MAX_BODY_BYTES);
            break;
        }
    }

    Ok(body)
}

fn contains_title_end(bytes: &[u8]) -> bool {
    bytes
        .windows(TITLE_END.len())
        .any(|window| window.eq_ignore_ascii_case(TITLE_END))
}

/// Extract the charset label from a `content-type` header value.
///
/// Takes what follows `charset=` up to the next parameter, without quotes.
/// Missing header or missing parameter gives [`DEFAULT_CHARSET`].
pub fn charset_from_content_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|content_type| {
            // ASCII lowercasing keeps byte offsets intact
            let start = content_type.to_ascii_lowercase().find(CHARSET_TOKEN)? + CHARSET_TOKEN.len();
            let value = content_type[start..]
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'');
            (!value.is_empty()).then(|| value.to_string())
        })
        .unwrap_or_else(|| DEFAULT_CHARSET.to_string())
}

/// Decode `bytes` from `charset` into a UTF-8 string.
///
/// Unknown labels are decoded as UTF-8; malformed sequences become U+FFFD.
pub fn decode_body(bytes: &[u8], charset: &str) -> String {
    let encoding = Encoding::for_label(charset.trim().as_bytes()).unwrap_or_else(|| {
        tracing::warn!("Unknown charset '{}', decoding as UTF-8", charset);
        UTF_8
    });

    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("Body had malformed {} sequences", actual.name());
    }

    text.into_owned()
}

/// Text of the first `<title>` element, entities decoded.
pub fn extract_title(html: &str) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

/// Final link text for a fetched page.
///
/// A missing or blank title falls back to the URL.
pub fn process_title(title: Option<String>, url: &str) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type(Some("text/html; charset=iso-8859-1")),
            "iso-8859-1"
        );
        assert_eq!(
            charset_from_content_type(Some("text/html;charset=\"Shift_JIS\"; foo=bar")),
            "Shift_JIS"
        );
        assert_eq!(
            charset_from_content_type(Some("text/html; Charset=UTF-8")),
            "UTF-8"
        );
    }

    #[test]
    fn test_charset_defaults_to_utf8() {
        assert_eq!(charset_from_content_type(Some("text/html")), "utf8");
        assert_eq!(charset_from_content_type(Some("text/html; charset=")), "utf8");
        assert_eq!(charset_from_content_type(None), "utf8");
    }

    #[test]
    fn test_decode_latin1() {
        let bytes = b"<title>Caf\xe9 cr\xe8me</title>";
        assert_eq!(decode_body(bytes, "iso-8859-1"), "<title>Café crème</title>");
    }

    #[test]
    fn test_decode_default_and_unknown_charset() {
        let bytes = "<title>Grüße</title>".as_bytes();
        assert_eq!(decode_body(bytes, DEFAULT_CHARSET), "<title>Grüße</title>");
        assert_eq!(decode_body(bytes, "no-such-charset"), "<title>Grüße</title>");
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  Rust &amp; Friends\n</title></head><body></body></html>";
        assert_eq!(extract_title(html), Some("  Rust & Friends\n".to_string()));
    }

    #[test]
    fn test_extract_title_missing() {
        assert_eq!(extract_title("<html><body><h1>Hi</h1></body></html>"), None);
        assert_eq!(extract_title(""), None);
    }

    #[test]
    fn test_process_title() {
        assert_eq!(
            process_title(Some("  Example Domain \n".to_string()), "http://example.com"),
            "Example Domain"
        );
        assert_eq!(process_title(None, "http://example.com"), "http://example.com");
        assert_eq!(
            process_title(Some("   ".to_string()), "http://example.com"),
            "http://example.com"
        );
    }

    #[test]
    fn test_contains_title_end() {
        assert!(contains_title_end(b"<title>x</TITLE>"));
        assert!(!contains_title_end(b"<title>x"));
    }

    #[tokio::test]
    async fn test_resolve_title_sends_user_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><head><title> Example Domain </title></head></html>")
            .create_async()
            .await;

        let fetcher = TitleFetcher::direct();
        let title = fetcher.resolve_title(&format!("{}/page", server.url())).await;

        assert_eq!(title, "Example Domain");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_title_decodes_latin1() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html; charset=iso-8859-1")
            .with_body(&b"<html><head><title>Caf\xe9</title></head></html>"[..])
            .create_async()
            .await;

        let fetcher = TitleFetcher::direct();
        let title = fetcher.resolve_title(&format!("{}/", server.url())).await;

        assert_eq!(title, "Café");
    }

    #[tokio::test]
    async fn test_resolve_title_without_charset() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<title>Smörgåsbord</title>")
            .create_async()
            .await;

        let fetcher = TitleFetcher::direct();
        let title = fetcher.resolve_title(&format!("{}/", server.url())).await;

        assert_eq!(title, "Smörgåsbord");
    }

    #[tokio::test]
    async fn test_resolve_title_falls_back_to_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/plain")
            .with_status(404)
            .with_header("content-type", "text/plain")
            .with_body("not found")
            .create_async()
            .await;

        let url = format!("{}/plain", server.url());
        let fetcher = TitleFetcher::direct();

        assert_eq!(fetcher.resolve_title(&url).await, url);
    }

    #[tokio::test]
    async fn test_resolve_title_reports_network_error() {
        // Nothing listens on port 1
        let url = "http://127.0.0.1:1/";
        let fetcher = TitleFetcher::direct();

        assert!(fetcher.fetch_title(url).await.is_err());

        let message = fetcher.resolve_title(url).await;
        assert!(!message.is_empty());
        assert_ne!(message, url);
    }
}
