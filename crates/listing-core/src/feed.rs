//! Listing feed retrieval and parsing

use crate::error::{Error, Result};
use roxmltree::{Document, Node, ParsingOptions};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Tag of the repeated listing element
pub const LISTING_TAG: &str = "listing";

const FETCH_TIMEOUT: Duration = Duration::from_secs(180);

/// Where a feed is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    /// Classify a location: `http://` and `https://` are URLs, anything else
    /// is a local path
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            FeedSource::Url(location.to_string())
        } else {
            FeedSource::File(PathBuf::from(location))
        }
    }

    /// Fetch the raw feed text
    pub fn read(&self) -> Result<String> {
        match self {
            FeedSource::File(path) => fs::read_to_string(path).map_err(|e| Error::FileRead {
                path: path.clone(),
                source: e,
            }),
            FeedSource::Url(url) => fetch(url),
        }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Url(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn fetch(url: &str) -> Result<String> {
    let fetch_err = |message: String| Error::FeedFetch {
        url: url.to_string(),
        message,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| fetch_err(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| fetch_err(e.to_string()))?;

    let body = response.text().map_err(|e| fetch_err(e.to_string()))?;
    info!(url, bytes = body.len(), "downloaded feed");
    Ok(body)
}

/// Parse feed text into a document tree
pub fn parse_feed(xml: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(xml, options).map_err(|e| Error::FeedParse(e.to_string()))
}

/// Every `listing` element below the document root, in document order
pub fn listings<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
    let root = doc.root_element();
    root.descendants()
        .filter(|n| *n != root && n.is_element() && n.tag_name().name() == LISTING_TAG)
        .collect()
}
